//! Vendor adapter implementations

mod anthropic;
mod base;
mod gemini;
mod openai;

pub use anthropic::{ANTHROPIC, AnthropicAdapter};
pub use gemini::{GEMINI, GeminiAdapter};
pub use openai::{OPENAI, OpenAiAdapter};
