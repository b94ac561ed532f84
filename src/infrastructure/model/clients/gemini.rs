//! Gemini adapter

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use super::base::HttpClientBase;
use crate::infrastructure::model::traits::ProviderAdapter;
use crate::infrastructure::model::types::{ProviderError, Sampling, SamplingState};

pub const GEMINI: &str = "gemini";
const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const EMBEDDING_MODEL: &str = "gemini-embedding-001";
const FALLBACK_MODELS: &[&str] = &["gemini-2.0-flash", "gemini-2.5-flash", "gemini-2.5-pro"];

/// Variants that are not general chat models.
const EXCLUDED_MARKERS: &[&str] = &[
    "preview",
    "exp",
    "lite",
    "live",
    "robotics",
    "tts",
    "image",
    "audio",
    "aqa",
    "computer-use",
];

pub struct GeminiAdapter {
    base: HttpClientBase,
    sampling: SamplingState,
}

impl GeminiAdapter {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        Self::with_endpoint(api_key, ENDPOINT.to_string())
    }

    /// Builds an adapter against a custom base URL.
    pub fn with_endpoint(api_key: String, endpoint: String) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::missing_api_key(GEMINI));
        }
        Ok(Self {
            base: HttpClientBase::new(GEMINI, endpoint, api_key),
            sampling: SamplingState::new(DEFAULT_MODEL),
        })
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> &'static str {
        GEMINI
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
        let url = self
            .base
            .build_url(&format!("models/{}:generateContent", sampling.model));
        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "temperature": sampling.temperature
            }
        });

        info!(
            provider = GEMINI,
            model = sampling.model.as_str(),
            "Sending completion request to Gemini"
        );

        let response: GenerateResponse = self.base.post_with_query_key(&url, &payload).await?;
        debug!("Received completion response from Gemini");

        response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .flat_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| ProviderError::invalid_response(GEMINI, "missing text"))
    }

    async fn generate_embedding(&self, text: &str) -> Result<Vec<f64>, ProviderError> {
        let url = self
            .base
            .build_url(&format!("models/{EMBEDDING_MODEL}:embedContent"));
        let payload = json!({
            "content": {
                "parts": [{"text": text}]
            }
        });

        info!(provider = GEMINI, "Sending embedding request to Gemini");
        let response: EmbedResponse = self.base.post_with_query_key(&url, &payload).await?;

        let values = response.embedding.map(|e| e.values).unwrap_or_default();
        if values.is_empty() {
            return Err(ProviderError::invalid_response(
                GEMINI,
                "no embeddings returned",
            ));
        }
        Ok(values)
    }

    async fn list_models(&self) -> Vec<String> {
        let url = self.base.build_url("models");
        match self.base.get_with_query_key::<ModelsResponse>(&url).await {
            Ok(response) => {
                filter_chat_models(response.models.into_iter().map(|m| m.name).collect())
            }
            Err(error) => {
                warn!(provider = GEMINI, %error, "Model listing failed; using fallback list");
                FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
            }
        }
    }

    async fn validate_credentials(&self) -> Result<(), ProviderError> {
        let url = self.base.build_url("models");
        self.base
            .get_with_query_key::<serde_json::Value>(&url)
            .await
            .map_err(|error| ProviderError::credential(GEMINI, error.to_string()))?;
        Ok(())
    }
}

/// Keeps general `gemini` chat models and strips the `models/` prefix the
/// listing API uses. Output is sorted and deduplicated.
fn filter_chat_models(names: Vec<String>) -> Vec<String> {
    let mut models: Vec<String> = names
        .into_iter()
        .filter(|name| name.contains("gemini"))
        .filter(|name| !name.contains("embedding"))
        .filter(|name| !EXCLUDED_MARKERS.iter().any(|marker| name.contains(marker)))
        .map(|name| name.trim_start_matches("models/").to_string())
        .collect();
    models.sort();
    models.dedup();
    models
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Option<Embedding>,
}

#[derive(Deserialize)]
struct Embedding {
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}
