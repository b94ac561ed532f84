//! SQLite-backed settings store

use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use super::{PersistedSettings, SettingsStore, StoreError};

const SETTINGS_ROW_ID: i64 = 1;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS settings (
    id INTEGER PRIMARY KEY,
    provider TEXT NOT NULL,
    model TEXT NOT NULL,
    temperature REAL NOT NULL DEFAULT 0.7
)";

const SELECT_ROW: &str = "SELECT provider, model, temperature FROM settings WHERE id = ?1";

const UPSERT_ROW: &str = "INSERT INTO settings (id, provider, model, temperature)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(id) DO UPDATE SET
    provider = excluded.provider,
    model = excluded.model,
    temperature = excluded.temperature";

pub struct SqliteSettingsStore {
    conn: Mutex<Connection>,
}

impl SqliteSettingsStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "Opened settings database");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: ":memory:".to_string(),
            source,
        })?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(CREATE_TABLE, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn load(&self) -> Result<Option<PersistedSettings>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(SELECT_ROW, params![SETTINGS_ROW_ID], |row| {
                Ok(PersistedSettings {
                    provider: row.get(0)?,
                    model: row.get(1)?,
                    temperature: row.get(2)?,
                })
            })
            .optional()?;
        Ok(row)
    }

    fn save(&self, settings: &PersistedSettings) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            UPSERT_ROW,
            params![
                SETTINGS_ROW_ID,
                settings.provider,
                settings.model,
                settings.temperature
            ],
        )?;
        Ok(())
    }
}
