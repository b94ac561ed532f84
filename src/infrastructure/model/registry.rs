//! Process-wide provider registry

use std::sync::{Arc, RwLock};
use thiserror::Error;
use tracing::info;

use super::traits::ProviderAdapter;
use super::types::ProviderError;

/// Error returned when a registry would be constructed with no adapters.
#[derive(Debug, Error)]
#[error("no providers available to register")]
pub struct EmptyRegistry;

/// Table of validated adapters plus the single active selection.
///
/// The adapter set is fixed at construction; pruning happens in the
/// one-time credential validation pass that feeds it. The active selection
/// is an index into the set, so `get_current` cannot fail and readers
/// always observe either the old or the new vendor.
pub struct ProviderRegistry {
    adapters: Vec<Arc<dyn ProviderAdapter>>,
    active: RwLock<usize>,
}

impl ProviderRegistry {
    /// Builds a registry from the post-validation survivor set, preserving
    /// insertion order. `preferred` names the initially active vendor; when
    /// absent or not live, the first adapter is active.
    pub fn new(
        adapters: Vec<Arc<dyn ProviderAdapter>>,
        preferred: Option<&str>,
    ) -> Result<Self, EmptyRegistry> {
        if adapters.is_empty() {
            return Err(EmptyRegistry);
        }
        let active = preferred
            .and_then(|name| adapters.iter().position(|a| a.name() == name))
            .unwrap_or(0);
        info!(
            active = adapters[active].name(),
            providers = adapters.len(),
            "Provider registry constructed"
        );
        Ok(Self {
            adapters,
            active: RwLock::new(active),
        })
    }

    /// Name of the currently active vendor.
    pub fn active_vendor(&self) -> &'static str {
        self.adapters[*self.active.read().unwrap()].name()
    }

    /// Adapter serving generation requests. Infallible: the active index
    /// always refers to a registered adapter.
    pub fn get_current(&self) -> Arc<dyn ProviderAdapter> {
        Arc::clone(&self.adapters[*self.active.read().unwrap()])
    }

    /// Looks up a live vendor without switching the selection.
    pub fn get(&self, vendor: &str) -> Result<Arc<dyn ProviderAdapter>, ProviderError> {
        self.adapters
            .iter()
            .find(|a| a.name() == vendor)
            .cloned()
            .ok_or_else(|| ProviderError::unknown_provider(vendor))
    }

    /// Switches the active vendor. Unknown vendors leave the selection
    /// untouched.
    pub fn select(&self, vendor: &str) -> Result<(), ProviderError> {
        let position = self
            .adapters
            .iter()
            .position(|a| a.name() == vendor)
            .ok_or_else(|| ProviderError::unknown_provider(vendor))?;
        *self.active.write().unwrap() = position;
        info!(provider = vendor, "Active provider selected");
        Ok(())
    }

    /// Live vendor names in registration order.
    pub fn vendors(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }
}
