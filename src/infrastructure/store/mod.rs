//! Durable settings record

mod sqlite;

pub use sqlite::SqliteSettingsStore;

use thiserror::Error;

/// The single durable `{provider, model, temperature}` record surviving
/// process restarts. Fixed row id 1; at most one row ever exists.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSettings {
    pub provider: String,
    pub model: String,
    pub temperature: f64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open settings database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("settings query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

/// Persistence seam for the settings record. The store is authoritative:
/// the registry mirrors it, never the other way around.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Option<PersistedSettings>, StoreError>;

    /// Creates or overwrites the singleton row.
    fn save(&self, settings: &PersistedSettings) -> Result<(), StoreError>;
}
