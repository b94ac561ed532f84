//! Provider abstraction: the adapter contract, vendor clients, the
//! process-wide registry, and the boot-time credential validation pass.

mod clients;
mod registry;
mod traits;
mod types;
mod validation;

#[cfg(test)]
pub(crate) mod mock;

pub use clients::{ANTHROPIC, AnthropicAdapter, GEMINI, GeminiAdapter, OPENAI, OpenAiAdapter};
pub use registry::{EmptyRegistry, ProviderRegistry};
pub use traits::ProviderAdapter;
pub use types::{DEFAULT_TEMPERATURE, ProviderError, Sampling, SamplingState};
pub use validation::validate_adapters;
