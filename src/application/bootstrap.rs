//! Boot sequence: adapters from credentials, validation, registry, store,
//! settings reconciliation.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::settings::{SettingsError, SettingsService};
use crate::config::AppConfig;
use crate::infrastructure::model::{
    AnthropicAdapter, GeminiAdapter, OpenAiAdapter, ProviderAdapter, ProviderError,
    ProviderRegistry, validate_adapters,
};
use crate::infrastructure::store::{SqliteSettingsStore, StoreError};

/// Fatal startup failures. Each one stops the process; a backend that
/// cannot serve any vendor must not start.
#[derive(Debug, Error)]
pub enum BootError {
    #[error(
        "no provider credentials configured - set OPENAI_API_KEY, ANTHROPIC_API_KEY, or GEMINI_API_KEY"
    )]
    NoCredentials,
    #[error("no provider passed credential validation")]
    NoValidProviders,
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Builds the ready-to-serve settings service: construct adapters for every
/// vendor with a credential, prune the ones whose credentials fail, build
/// the registry, open the store, and reconcile persisted settings.
pub async fn bootstrap(config: &AppConfig) -> Result<Arc<SettingsService>, BootError> {
    let candidates = build_adapters(config)?;
    if candidates.is_empty() {
        return Err(BootError::NoCredentials);
    }
    info!(candidates = candidates.len(), "Validating provider credentials");

    let survivors = validate_adapters(candidates).await;
    if survivors.is_empty() {
        return Err(BootError::NoValidProviders);
    }

    let registry = ProviderRegistry::new(survivors, config.default_provider.as_deref())
        .map_err(|_| BootError::NoValidProviders)?;

    if let Some(preferred) = &config.default_provider {
        if registry.get(preferred).is_err() {
            warn!(
                provider = preferred.as_str(),
                "Preferred default provider is not available; using first validated vendor"
            );
        }
    }

    let store = SqliteSettingsStore::open(&config.database_path)?;
    let service = Arc::new(SettingsService::new(Arc::new(registry), Arc::new(store)));
    service.reconcile_at_boot().await?;
    info!("Boot reconciliation complete");
    Ok(service)
}

fn build_adapters(config: &AppConfig) -> Result<Vec<Arc<dyn ProviderAdapter>>, ProviderError> {
    let mut adapters: Vec<Arc<dyn ProviderAdapter>> = Vec::new();
    if let Some(key) = &config.openai_api_key {
        adapters.push(Arc::new(OpenAiAdapter::new(key.clone())?));
    }
    if let Some(key) = &config.anthropic_api_key {
        adapters.push(Arc::new(AnthropicAdapter::new(key.clone())?));
    }
    if let Some(key) = &config.gemini_api_key {
        adapters.push(Arc::new(GeminiAdapter::new(key.clone())?));
    }
    for adapter in &adapters {
        info!(provider = adapter.name(), "Constructed provider adapter");
    }
    Ok(adapters)
}
