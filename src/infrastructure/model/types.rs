//! Provider types - sampling state and the provider error taxonomy

use std::sync::RwLock;
use thiserror::Error;

/// Sampling parameters shared by every vendor adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampling {
    pub model: String,
    pub temperature: f64,
}

pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Interior-mutable sampling state. Vendor calls take one snapshot up front
/// and never write, so a cancelled call leaves the state untouched.
pub struct SamplingState(RwLock<Sampling>);

impl SamplingState {
    pub fn new(default_model: &str) -> Self {
        Self(RwLock::new(Sampling {
            model: default_model.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }))
    }

    pub fn snapshot(&self) -> Sampling {
        self.0.read().unwrap().clone()
    }

    pub fn model(&self) -> String {
        self.0.read().unwrap().model.clone()
    }

    pub fn temperature(&self) -> f64 {
        self.0.read().unwrap().temperature
    }

    pub fn set_model(&self, model: String) {
        self.0.write().unwrap().model = model;
    }

    pub fn set_temperature(&self, temperature: f64) {
        self.0.write().unwrap().temperature = temperature;
    }
}

/// Provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider '{provider}' requires a non-empty API key")]
    MissingApiKey { provider: String },
    #[error("provider '{provider}' rejected its credentials: {reason}")]
    Credential { provider: String, reason: String },
    #[error("provider '{provider}' is not available")]
    UnknownProvider { provider: String },
    #[error("provider '{provider}' does not support {capability}")]
    Unsupported {
        provider: String,
        capability: &'static str,
    },
    #[error("provider '{provider}' returned an invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ProviderError {
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn credential(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Credential {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_provider(provider: impl Into<String>) -> Self {
        Self::UnknownProvider {
            provider: provider.into(),
        }
    }

    pub fn unsupported(provider: impl Into<String>, capability: &'static str) -> Self {
        Self::Unsupported {
            provider: provider.into(),
            capability,
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }
}
