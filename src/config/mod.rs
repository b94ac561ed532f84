use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_DATABASE_PATH: &str = "playground.db";

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const DEFAULT_PROVIDER_VAR: &str = "DEFAULT_PROVIDER";
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";
pub const DATABASE_PATH_VAR: &str = "DATABASE_PATH";

/// Runtime configuration read from the process environment.
///
/// A vendor credential that is absent or blank means that vendor is simply
/// not constructed; it is not an error on its own.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    /// Preferred vendor when nothing has been persisted yet.
    pub default_provider: Option<String>,
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {BIND_ADDR_VAR} value '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup, so tests
    /// can inject an environment without mutating the process one.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_value =
            non_blank(lookup(BIND_ADDR_VAR)).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_value
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind_value,
                source,
            })?;

        let database_path = non_blank(lookup(DATABASE_PATH_VAR))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        Ok(Self {
            openai_api_key: credential(&lookup, OPENAI_API_KEY_VAR),
            anthropic_api_key: credential(&lookup, ANTHROPIC_API_KEY_VAR),
            gemini_api_key: credential(&lookup, GEMINI_API_KEY_VAR),
            default_provider: non_blank(lookup(DEFAULT_PROVIDER_VAR)),
            bind_addr,
            database_path,
        })
    }
}

fn credential(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    let value = non_blank(lookup(var));
    if value.is_none() {
        debug!(env_var = var, "Credential not set; vendor will be skipped");
    }
    value
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
