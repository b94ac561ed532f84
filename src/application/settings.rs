//! Settings synchronization between the provider registry and the store.
//!
//! The persisted record is the durable source of truth; the registry is the
//! volatile mirror that serves requests. Boot reconciliation seeds or
//! applies the record, and the update path writes the store first and only
//! then mirrors the committed fields onto the registry.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::infrastructure::model::{
    DEFAULT_TEMPERATURE, ProviderAdapter, ProviderError, ProviderRegistry,
};
use crate::infrastructure::store::{PersistedSettings, SettingsStore, StoreError};

pub const TEMPERATURE_MIN: f64 = 0.0;
pub const TEMPERATURE_MAX: f64 = 2.0;

/// Partial settings update; unspecified fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
}

/// Full externally observable settings state.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsView {
    pub provider: String,
    pub model: String,
    pub temperature: f64,
    pub embedding_model: Option<String>,
    pub available_models: Vec<String>,
    pub available_providers: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(
        "temperature {value} is outside the allowed range {TEMPERATURE_MIN} to {TEMPERATURE_MAX}"
    )]
    TemperatureOutOfRange { value: f64 },
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct SettingsService {
    registry: Arc<ProviderRegistry>,
    store: Arc<dyn SettingsStore>,
    /// Serializes settings mutations so concurrent updates cannot
    /// interleave a store write with another update's registry mirror.
    update_lock: Mutex<()>,
}

impl SettingsService {
    pub fn new(registry: Arc<ProviderRegistry>, store: Arc<dyn SettingsStore>) -> Self {
        Self {
            registry,
            store,
            update_lock: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Reconciles registry state with the persisted record at boot. Seeds
    /// the record from the active vendor when absent. Store errors are
    /// fatal; a persisted vendor that is no longer live falls back to the
    /// current active vendor and rewrites the record.
    pub async fn reconcile_at_boot(&self) -> Result<(), SettingsError> {
        let persisted = match self.store.load()? {
            Some(settings) => settings,
            None => self.seed_defaults().await?,
        };

        let persisted = if self.registry.select(&persisted.provider).is_ok() {
            persisted
        } else {
            warn!(
                provider = persisted.provider.as_str(),
                "Persisted provider is no longer available; reseeding from active vendor"
            );
            self.seed_defaults().await?
        };

        let adapter = self.registry.get_current();
        adapter.set_model(persisted.model.clone());
        adapter.set_temperature(persisted.temperature);
        info!(
            provider = persisted.provider.as_str(),
            model = persisted.model.as_str(),
            temperature = persisted.temperature,
            "Settings reconciled at boot"
        );
        Ok(())
    }

    /// Applies a partial update: store first, then mirror. A store failure
    /// leaves the registry untouched; a mirror failure after a successful
    /// write surfaces the error and self-heals at the next boot or update.
    pub async fn apply_update(&self, update: SettingsUpdate) -> Result<SettingsView, SettingsError> {
        if let Some(value) = update.temperature {
            if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&value) {
                return Err(SettingsError::TemperatureOutOfRange { value });
            }
        }
        let _guard = self.update_lock.lock().await;

        // Resolve the target adapter under the lock, against the latest
        // committed selection, and before writing anything so an unknown
        // provider can never reach the store or the registry.
        let target = match &update.provider {
            Some(provider) => self.registry.get(provider)?,
            None => self.registry.get_current(),
        };

        let current = self.store.load()?;
        let provider_changed = target.name() != self.registry.active_vendor();
        let model = match (&update.model, provider_changed, &current) {
            (Some(model), _, _) => model.clone(),
            // Switching vendors without naming a model keeps the target
            // adapter's own current model.
            (None, true, _) => target.model(),
            (None, false, Some(row)) => row.model.clone(),
            (None, false, None) => target.model(),
        };
        let temperature = update
            .temperature
            .or(current.as_ref().map(|row| row.temperature))
            .unwrap_or(DEFAULT_TEMPERATURE);

        let committed = PersistedSettings {
            provider: target.name().to_string(),
            model,
            temperature,
        };
        self.store.save(&committed)?;

        // Mirror only what was committed. The target adapter is configured
        // before `select` publishes it, so readers never observe a newly
        // active vendor with stale sampling state.
        target.set_model(committed.model.clone());
        target.set_temperature(committed.temperature);
        if update.provider.is_some() {
            self.registry.select(&committed.provider)?;
        }

        info!(
            provider = committed.provider.as_str(),
            model = committed.model.as_str(),
            temperature = committed.temperature,
            "Settings updated"
        );
        Ok(self.view_of(target).await)
    }

    /// Current settings as served to clients.
    pub async fn current_view(&self) -> SettingsView {
        self.view_of(self.registry.get_current()).await
    }

    /// Model list for any live vendor, without switching the selection.
    pub async fn models_for(&self, vendor: &str) -> Result<Vec<String>, SettingsError> {
        Ok(self.registry.get(vendor)?.list_models().await)
    }

    pub async fn generate_text(&self, prompt: &str) -> Result<String, SettingsError> {
        Ok(self.registry.get_current().generate_text(prompt).await?)
    }

    /// Returns the vector together with the embedding model that produced
    /// it. Vendors without the capability fail with `Unsupported`.
    pub async fn generate_embedding(
        &self,
        text: &str,
    ) -> Result<(Vec<f64>, Option<String>), SettingsError> {
        let adapter = self.registry.get_current();
        let embedding = adapter.generate_embedding(text).await?;
        Ok((embedding, adapter.embedding_model()))
    }

    async fn seed_defaults(&self) -> Result<PersistedSettings, SettingsError> {
        let adapter = self.registry.get_current();
        let model = adapter
            .list_models()
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| adapter.model());
        let seeded = PersistedSettings {
            provider: adapter.name().to_string(),
            model,
            temperature: DEFAULT_TEMPERATURE,
        };
        self.store.save(&seeded)?;
        info!(
            provider = seeded.provider.as_str(),
            model = seeded.model.as_str(),
            "Seeded persisted settings"
        );
        Ok(seeded)
    }

    async fn view_of(&self, adapter: Arc<dyn ProviderAdapter>) -> SettingsView {
        // One coherent read; separate getters could straddle an update.
        let sampling = adapter.sampling();
        SettingsView {
            provider: adapter.name().to_string(),
            model: sampling.model,
            temperature: sampling.temperature,
            embedding_model: adapter.embedding_model(),
            available_models: adapter.list_models().await,
            available_providers: self.registry.vendors(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::model::Sampling;
    use crate::infrastructure::model::mock::MockAdapter;
    use crate::infrastructure::store::SqliteSettingsStore;
    use std::sync::mpsc;

    fn service_with(
        adapters: Vec<Arc<dyn ProviderAdapter>>,
        preferred: Option<&str>,
    ) -> SettingsService {
        let registry = ProviderRegistry::new(adapters, preferred).expect("registry");
        let store = SqliteSettingsStore::open_in_memory().expect("store");
        SettingsService::new(Arc::new(registry), Arc::new(store))
    }

    fn two_vendor_service() -> SettingsService {
        service_with(
            vec![
                Arc::new(MockAdapter::new("openai").with_models(&["gpt-4o-mini", "gpt-4o"])),
                Arc::new(MockAdapter::new("gemini").with_models(&["gemini-2.5-flash"])),
            ],
            None,
        )
    }

    #[tokio::test]
    async fn boot_seeds_row_from_first_vendor_and_first_model() {
        let service = two_vendor_service();
        service.reconcile_at_boot().await.expect("reconcile");

        let row = service.store.load().expect("load").expect("seeded row");
        assert_eq!(row.provider, "openai");
        assert_eq!(row.model, "gpt-4o-mini");
        assert_eq!(row.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(service.registry.active_vendor(), "openai");
    }

    #[tokio::test]
    async fn boot_seed_uses_adapter_default_when_list_is_empty() {
        let service = service_with(
            vec![Arc::new(MockAdapter::new("openai").without_models())],
            None,
        );
        service.reconcile_at_boot().await.expect("reconcile");

        let row = service.store.load().expect("load").expect("seeded row");
        // The mock's built-in default model stands in for an empty listing.
        assert_eq!(row.model, "openai-small");
    }

    #[tokio::test]
    async fn boot_applies_persisted_settings_over_process_defaults() {
        let service = two_vendor_service();
        service
            .store
            .save(&PersistedSettings {
                provider: "gemini".to_string(),
                model: "gemini-2.5-flash".to_string(),
                temperature: 1.2,
            })
            .expect("save");

        service.reconcile_at_boot().await.expect("reconcile");

        assert_eq!(service.registry.active_vendor(), "gemini");
        let adapter = service.registry.get_current();
        assert_eq!(adapter.model(), "gemini-2.5-flash");
        assert_eq!(adapter.temperature(), 1.2);
    }

    #[tokio::test]
    async fn boot_reseeds_when_persisted_provider_is_gone() {
        let service = two_vendor_service();
        service
            .store
            .save(&PersistedSettings {
                provider: "anthropic".to_string(),
                model: "claude-3-5-haiku-latest".to_string(),
                temperature: 0.5,
            })
            .expect("save");

        service.reconcile_at_boot().await.expect("reconcile");

        assert_eq!(service.registry.active_vendor(), "openai");
        let row = service.store.load().expect("load").expect("row");
        assert_eq!(row.provider, "openai");
        assert_eq!(row.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn update_round_trip_returns_exactly_what_was_set() {
        let service = service_with(
            vec![
                Arc::new(MockAdapter::new("gemini").with_models(&["gemini-2.5-flash"])),
                Arc::new(MockAdapter::new("openai").with_models(&["gpt-4o", "gpt-4o-mini"])),
            ],
            None,
        );
        service.reconcile_at_boot().await.expect("reconcile");

        let view = service
            .apply_update(SettingsUpdate {
                provider: Some("openai".to_string()),
                model: Some("gpt-4o-mini".to_string()),
                temperature: Some(0.3),
            })
            .await
            .expect("update");

        assert_eq!(view.provider, "openai");
        assert_eq!(view.model, "gpt-4o-mini");
        assert_eq!(view.temperature, 0.3);
        assert!(view.available_models.contains(&"gpt-4o-mini".to_string()));

        let read_back = service.current_view().await;
        assert_eq!(read_back, view);
    }

    #[tokio::test]
    async fn partial_update_keeps_unspecified_fields() {
        let service = two_vendor_service();
        service.reconcile_at_boot().await.expect("reconcile");

        let view = service
            .apply_update(SettingsUpdate {
                temperature: Some(1.5),
                ..SettingsUpdate::default()
            })
            .await
            .expect("update");

        assert_eq!(view.provider, "openai");
        assert_eq!(view.model, "gpt-4o-mini");
        assert_eq!(view.temperature, 1.5);
    }

    #[tokio::test]
    async fn provider_switch_without_model_uses_target_adapter_model() {
        let service = two_vendor_service();
        service.reconcile_at_boot().await.expect("reconcile");

        let view = service
            .apply_update(SettingsUpdate {
                provider: Some("gemini".to_string()),
                ..SettingsUpdate::default()
            })
            .await
            .expect("update");

        assert_eq!(view.provider, "gemini");
        assert_eq!(view.model, "gemini-2.5-flash");
        let row = service.store.load().expect("load").expect("row");
        assert_eq!(row.provider, "gemini");
        assert_eq!(row.model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn out_of_range_temperature_is_rejected_before_any_side_effect() {
        let service = two_vendor_service();
        service.reconcile_at_boot().await.expect("reconcile");
        let before = service.store.load().expect("load");

        let result = service
            .apply_update(SettingsUpdate {
                temperature: Some(2.5),
                ..SettingsUpdate::default()
            })
            .await;

        assert!(matches!(
            result,
            Err(SettingsError::TemperatureOutOfRange { .. })
        ));
        assert_eq!(service.store.load().expect("load"), before);
        assert_eq!(
            service.registry.get_current().temperature(),
            DEFAULT_TEMPERATURE
        );
    }

    #[tokio::test]
    async fn unknown_provider_update_leaves_everything_unchanged() {
        let service = two_vendor_service();
        service.reconcile_at_boot().await.expect("reconcile");
        let before = service.store.load().expect("load");

        let result = service
            .apply_update(SettingsUpdate {
                provider: Some("mistral".to_string()),
                ..SettingsUpdate::default()
            })
            .await;

        assert!(matches!(
            result,
            Err(SettingsError::Provider(ProviderError::UnknownProvider { .. }))
        ));
        assert_eq!(service.registry.active_vendor(), "openai");
        assert_eq!(service.store.load().expect("load"), before);
    }

    #[tokio::test]
    async fn store_failure_refuses_to_mutate_the_registry() {
        struct FailingStore;
        impl SettingsStore for FailingStore {
            fn load(&self) -> Result<Option<PersistedSettings>, StoreError> {
                Ok(None)
            }
            fn save(&self, _settings: &PersistedSettings) -> Result<(), StoreError> {
                Err(StoreError::Query(
                    rusqlite::Error::ExecuteReturnedResults,
                ))
            }
        }

        let registry = ProviderRegistry::new(
            vec![
                Arc::new(MockAdapter::new("openai").with_models(&["gpt-4o-mini"]))
                    as Arc<dyn ProviderAdapter>,
                Arc::new(MockAdapter::new("gemini").with_models(&["gemini-2.5-flash"])),
            ],
            None,
        )
        .expect("registry");
        let service = SettingsService::new(Arc::new(registry), Arc::new(FailingStore));

        let result = service
            .apply_update(SettingsUpdate {
                provider: Some("gemini".to_string()),
                model: Some("gemini-2.5-flash".to_string()),
                ..SettingsUpdate::default()
            })
            .await;

        assert!(matches!(result, Err(SettingsError::Store(_))));
        assert_eq!(service.registry.active_vendor(), "openai");
        assert_eq!(service.registry.get_current().model(), "gpt-4o-mini");
    }

    #[tokio::test]
    async fn embedding_on_vendor_without_capability_is_unsupported() {
        let service = service_with(
            vec![Arc::new(MockAdapter::new("anthropic"))],
            None,
        );
        service.reconcile_at_boot().await.expect("reconcile");

        let result = service.generate_embedding("hello").await;
        assert!(matches!(
            result,
            Err(SettingsError::Provider(ProviderError::Unsupported { .. }))
        ));
    }

    #[tokio::test]
    async fn embedding_capable_vendor_returns_vector_and_model_name() {
        let service = service_with(
            vec![Arc::new(
                MockAdapter::new("gemini").with_embedding_model("gemini-embedding-001"),
            )],
            None,
        );
        service.reconcile_at_boot().await.expect("reconcile");

        let (vector, model) = service.generate_embedding("hello").await.expect("embed");
        assert!(!vector.is_empty());
        assert_eq!(model.as_deref(), Some("gemini-embedding-001"));
    }

    #[tokio::test]
    async fn models_for_does_not_switch_active_vendor() {
        let service = two_vendor_service();
        service.reconcile_at_boot().await.expect("reconcile");

        let models = service.models_for("gemini").await.expect("models");
        assert_eq!(models, vec!["gemini-2.5-flash"]);
        assert_eq!(service.registry.active_vendor(), "openai");

        let missing = service.models_for("mistral").await;
        assert!(matches!(
            missing,
            Err(SettingsError::Provider(ProviderError::UnknownProvider { .. }))
        ));
    }

    #[tokio::test]
    async fn default_preference_applies_only_until_something_is_persisted() {
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![
            Arc::new(MockAdapter::new("openai").with_models(&["gpt-4o-mini"])),
            Arc::new(MockAdapter::new("gemini").with_models(&["gemini-2.5-flash"])),
        ];
        let registry = ProviderRegistry::new(adapters, Some("gemini")).expect("registry");
        let store = Arc::new(SqliteSettingsStore::open_in_memory().expect("store"));
        store
            .save(&PersistedSettings {
                provider: "openai".to_string(),
                model: "gpt-4o-mini".to_string(),
                temperature: 0.7,
            })
            .expect("save");

        let service = SettingsService::new(Arc::new(registry), store);
        service.reconcile_at_boot().await.expect("reconcile");

        // Persisted state wins over the environment preference.
        assert_eq!(service.registry.active_vendor(), "openai");
    }

    /// Store wrapper whose next `save` parks on a rendezvous, holding one
    /// update mid-commit while a second update queues behind it.
    struct GateStore {
        inner: SqliteSettingsStore,
        gate: std::sync::Mutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
    }

    impl GateStore {
        fn arm(&self, entered: mpsc::Sender<()>, release: mpsc::Receiver<()>) {
            *self.gate.lock().unwrap() = Some((entered, release));
        }
    }

    impl SettingsStore for GateStore {
        fn load(&self) -> Result<Option<PersistedSettings>, StoreError> {
            self.inner.load()
        }

        fn save(&self, settings: &PersistedSettings) -> Result<(), StoreError> {
            let gate = self.gate.lock().unwrap().take();
            if let Some((entered, release)) = gate {
                entered.send(()).ok();
                release.recv().ok();
            }
            self.inner.save(settings)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn queued_update_acts_on_the_selection_the_first_update_committed() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let registry = ProviderRegistry::new(
            vec![
                Arc::new(MockAdapter::new("openai").with_models(&["gpt-4o-mini"]))
                    as Arc<dyn ProviderAdapter>,
                Arc::new(MockAdapter::new("gemini").with_models(&["gemini-2.5-flash"])),
            ],
            None,
        )
        .expect("registry");
        let store = Arc::new(GateStore {
            inner: SqliteSettingsStore::open_in_memory().expect("store"),
            gate: std::sync::Mutex::new(None),
        });
        let service = Arc::new(SettingsService::new(Arc::new(registry), store.clone()));
        service.reconcile_at_boot().await.expect("reconcile");
        store.arm(entered_tx, release_rx);

        let switch = tokio::spawn({
            let service = service.clone();
            async move {
                service
                    .apply_update(SettingsUpdate {
                        provider: Some("gemini".to_string()),
                        ..SettingsUpdate::default()
                    })
                    .await
            }
        });
        entered_rx.recv().expect("switch reached the store");

        let adjust = tokio::spawn({
            let service = service.clone();
            async move {
                service
                    .apply_update(SettingsUpdate {
                        temperature: Some(1.0),
                        ..SettingsUpdate::default()
                    })
                    .await
            }
        });
        // Let the temperature update queue behind the in-flight switch
        // before releasing it.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        release_tx.send(()).expect("release");

        switch.await.expect("join").expect("switch");
        adjust.await.expect("join").expect("temperature update");

        // Both sides agree after two valid serialized updates.
        let row = store.load().expect("load").expect("row");
        assert_eq!(row.provider, "gemini");
        assert_eq!(row.provider, service.registry.active_vendor());
        assert_eq!(row.temperature, 1.0);
        assert_eq!(service.registry.get_current().temperature(), 1.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn provider_switch_is_published_only_after_target_is_configured() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let service = Arc::new(service_with(
            vec![
                Arc::new(MockAdapter::new("openai").with_models(&["gpt-4o-mini"])),
                Arc::new(
                    MockAdapter::new("gemini")
                        .with_models(&["gemini-2.5-flash"])
                        .with_gated_set_model(entered_tx, release_rx),
                ),
            ],
            None,
        ));
        service.reconcile_at_boot().await.expect("reconcile");

        let switch = tokio::spawn({
            let service = service.clone();
            async move {
                service
                    .apply_update(SettingsUpdate {
                        provider: Some("gemini".to_string()),
                        temperature: Some(0.9),
                        ..SettingsUpdate::default()
                    })
                    .await
            }
        });

        entered_rx.recv().expect("switch reached the target adapter");
        // The target is still being configured, so the switch must not be
        // visible to readers yet.
        assert_eq!(service.registry.active_vendor(), "openai");
        release_tx.send(()).expect("release");

        switch.await.expect("join").expect("switch");
        assert_eq!(service.registry.active_vendor(), "gemini");
        let adapter = service.registry.get_current();
        assert_eq!(adapter.model(), "gemini-2.5-flash");
        assert_eq!(adapter.temperature(), 0.9);
    }

    #[tokio::test]
    async fn view_is_built_from_one_sampling_snapshot() {
        // An adapter whose separate getters disagree with its snapshot,
        // the way a writer racing two getter calls would.
        struct TornAdapter;

        #[async_trait::async_trait]
        impl ProviderAdapter for TornAdapter {
            fn name(&self) -> &'static str {
                "openai"
            }
            fn sampling(&self) -> Sampling {
                Sampling {
                    model: "gpt-4o-mini".to_string(),
                    temperature: 0.4,
                }
            }
            fn model(&self) -> String {
                "gpt-4o".to_string()
            }
            fn temperature(&self) -> f64 {
                1.9
            }
            fn embedding_model(&self) -> Option<String> {
                None
            }
            fn set_model(&self, _model: String) {}
            fn set_temperature(&self, _temperature: f64) {}
            async fn generate_text(&self, _prompt: &str) -> Result<String, ProviderError> {
                Ok(String::new())
            }
            async fn generate_embedding(&self, _text: &str) -> Result<Vec<f64>, ProviderError> {
                Err(ProviderError::unsupported("openai", "embeddings"))
            }
            async fn list_models(&self) -> Vec<String> {
                vec!["gpt-4o-mini".to_string()]
            }
            async fn validate_credentials(&self) -> Result<(), ProviderError> {
                Ok(())
            }
        }

        let service = service_with(vec![Arc::new(TornAdapter)], None);
        let view = service.current_view().await;
        assert_eq!(view.model, "gpt-4o-mini");
        assert_eq!(view.temperature, 0.4);
    }
}
