//! OpenAI adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::base::HttpClientBase;
use crate::infrastructure::model::traits::ProviderAdapter;
use crate::infrastructure::model::types::{ProviderError, Sampling, SamplingState};

pub const OPENAI: &str = "openai";
const ENDPOINT: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const EMBEDDING_MODEL: &str = "text-embedding-3-small";
const VALIDATION_MODEL: &str = "gpt-4o-mini";
const FALLBACK_MODELS: &[&str] = &["gpt-3.5-turbo", "gpt-4o", "gpt-4o-mini"];

/// Substrings marking modality or snapshot variants that are not general
/// chat models.
const EXCLUDED_MARKERS: &[&str] = &[
    "vision",
    "audio",
    "image",
    "instruct",
    "preview",
    "realtime",
    "transcribe",
    "tts",
    "search",
];

pub struct OpenAiAdapter {
    base: HttpClientBase,
    sampling: SamplingState,
}

impl OpenAiAdapter {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        Self::with_endpoint(api_key, ENDPOINT.to_string())
    }

    /// Builds an adapter against a custom base URL.
    pub fn with_endpoint(api_key: String, endpoint: String) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::missing_api_key(OPENAI));
        }
        Ok(Self {
            base: HttpClientBase::new(OPENAI, endpoint, api_key),
            sampling: SamplingState::new(DEFAULT_MODEL),
        })
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &'static str {
        OPENAI
    }

    fn sampling(&self) -> Sampling {
        self.sampling.snapshot()
    }

    fn embedding_model(&self) -> Option<String> {
        Some(EMBEDDING_MODEL.to_string())
    }

    fn set_model(&self, model: String) {
        self.sampling.set_model(model);
    }

    fn set_temperature(&self, temperature: f64) {
        self.sampling.set_temperature(temperature);
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let sampling = self.sampling.snapshot();
        let url = self.base.build_url("/v1/chat/completions");
        let payload = ChatRequest {
            model: sampling.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: sampling.temperature,
        };

        info!(
            provider = OPENAI,
            model = sampling.model.as_str(),
            "Sending completion request to OpenAI"
        );

        let response: ChatResponse = self.base.post_with_bearer(&url, &payload).await?;
        debug!("Received completion response from OpenAI");

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| ProviderError::invalid_response(OPENAI, "missing message content"))
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f64>, ProviderError> {
        let url = self.base.build_url("/v1/embeddings");
        let payload = EmbeddingsRequest {
            model: EMBEDDING_MODEL,
            input: text.to_string(),
        };

        info!(provider = OPENAI, "Sending embedding request to OpenAI");
        let response: EmbeddingsResponse = self.base.post_with_bearer(&url, &payload).await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::invalid_response(OPENAI, "no embeddings returned"))
    }

    async fn list_models(&self) -> Vec<String> {
        let url = self.base.build_url("/v1/models");
        match self.base.get_with_bearer::<ModelsResponse>(&url).await {
            Ok(response) => {
                filter_chat_models(response.data.into_iter().map(|m| m.id).collect())
            }
            Err(error) => {
                warn!(provider = OPENAI, %error, "Model listing failed; using fallback list");
                FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
            }
        }
    }

    async fn validate_credentials(&self) -> Result<(), ProviderError> {
        let url = self.base.build_url(&format!("/v1/models/{VALIDATION_MODEL}"));
        self.base
            .get_with_bearer::<serde_json::Value>(&url)
            .await
            .map_err(|error| ProviderError::credential(OPENAI, error.to_string()))?;
        Ok(())
    }
}

/// Keeps general `gpt-` chat models: fine-tuned ids, dated snapshots, and
/// modality variants are dropped. Output is sorted and deduplicated.
fn filter_chat_models(ids: Vec<String>) -> Vec<String> {
    let mut models: Vec<String> = ids
        .into_iter()
        .filter(|id| id.contains("gpt-"))
        .filter(|id| !id.contains("ft:"))
        .filter(|id| !EXCLUDED_MARKERS.iter().any(|marker| id.contains(marker)))
        .filter(|id| !has_snapshot_suffix(id))
        .collect();
    models.sort();
    models.dedup();
    models
}

/// A dash-separated segment of four or more digits marks a dated snapshot,
/// e.g. `gpt-4-0613` or `gpt-4o-2024-05-13`.
fn has_snapshot_suffix(id: &str) -> bool {
    id.split('-')
        .any(|segment| segment.len() >= 4 && segment.chars().all(|c| c.is_ascii_digit()))
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingsRequest {
    model: &'static str,
    input: String,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    embedding: Vec<f64>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}
