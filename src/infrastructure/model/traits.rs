//! Provider contract

use super::types::{ProviderError, Sampling};
use async_trait::async_trait;

/// Uniform capability contract implemented once per vendor.
///
/// Sampling setters replace the adapter's state atomically and take effect
/// on the very next generation call; vendor calls never mutate it.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable vendor key used for selection and persistence.
    fn name(&self) -> &'static str;

    /// One coherent read of model and temperature. Callers that need both
    /// fields must use this rather than the individual getters, which can
    /// straddle a concurrent update.
    fn sampling(&self) -> Sampling;

    fn model(&self) -> String {
        self.sampling().model
    }

    fn temperature(&self) -> f64 {
        self.sampling().temperature
    }

    /// `None` when the vendor offers no embedding capability. Never fails.
    fn embedding_model(&self) -> Option<String>;

    fn set_model(&self, model: String);

    fn set_temperature(&self, temperature: f64);

    /// Single-turn completion. A payload the adapter cannot flatten to one
    /// string is an `InvalidResponse`, distinct from transport failures.
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Fails with `Unsupported` before any network call when the vendor has
    /// no embedding capability.
    async fn generate_embedding(&self, text: &str) -> Result<Vec<f64>, ProviderError>;

    /// Advisory model listing: deterministically sorted and filtered to
    /// general chat models. A vendor listing failure degrades to the
    /// adapter's hard-coded fallback list instead of propagating.
    async fn list_models(&self) -> Vec<String>;

    /// One cheap, side-effect-free probe confirming the key is usable.
    async fn validate_credentials(&self) -> Result<(), ProviderError>;
}
