//! Anthropic adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::base::HttpClientBase;
use crate::infrastructure::model::traits::ProviderAdapter;
use crate::infrastructure::model::types::{ProviderError, Sampling, SamplingState};

pub const ANTHROPIC: &str = "anthropic";
const ENDPOINT: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
const VALIDATION_MODEL: &str = "claude-3-haiku-20240307";
const MAX_TOKENS: u32 = 1024;
const FALLBACK_MODELS: &[&str] = &[
    "claude-3-5-haiku-latest",
    "claude-3-5-sonnet-latest",
    "claude-3-7-sonnet-latest",
];

pub struct AnthropicAdapter {
    base: HttpClientBase,
    sampling: SamplingState,
}

impl AnthropicAdapter {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        Self::with_endpoint(api_key, ENDPOINT.to_string())
    }

    /// Builds an adapter against a custom base URL.
    pub fn with_endpoint(api_key: String, endpoint: String) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::missing_api_key(ANTHROPIC));
        }
        Ok(Self {
            base: HttpClientBase::new(ANTHROPIC, endpoint, api_key),
            sampling: SamplingState::new(DEFAULT_MODEL),
        })
    }

    async fn get_json<Res>(&self, url: &str) -> Result<Res, ProviderError>
    where
        Res: serde::de::DeserializeOwned,
    {
        let request = self
            .base
            .http
            .get(url)
            .header("x-api-key", self.base.api_key.clone())
            .header("anthropic-version", API_VERSION);
        self.base.execute(request).await
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn name(&self) -> &'static str {
        ANTHROPIC
    }

    fn sampling(&self) -> Sampling {
        self.sampling.snapshot()
    }

    fn embedding_model(&self) -> Option<String> {
        None
    }

    fn set_model(&self, model: String) {
        self.sampling.set_model(model);
    }

    fn set_temperature(&self, temperature: f64) {
        self.sampling.set_temperature(temperature);
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let sampling = self.sampling.snapshot();
        let url = self.base.build_url("/v1/messages");
        let payload = MessagesRequest {
            model: sampling.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: sampling.temperature,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt.to_string(),
            }],
        };

        info!(
            provider = ANTHROPIC,
            model = sampling.model.as_str(),
            "Sending completion request to Anthropic"
        );

        let request = self
            .base
            .http
            .post(&url)
            .header("x-api-key", self.base.api_key.clone())
            .header("anthropic-version", API_VERSION)
            .json(&payload);
        let response: MessagesResponse = self.base.execute(request).await?;
        debug!("Received completion response from Anthropic");

        let text: Vec<String> = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.is_empty() {
            return Err(ProviderError::invalid_response(
                ANTHROPIC,
                "no text content blocks",
            ));
        }
        Ok(text.join(""))
    }

    async fn generate_embedding(&self, _text: &str) -> Result<Vec<f64>, ProviderError> {
        Err(ProviderError::unsupported(ANTHROPIC, "embeddings"))
    }

    async fn list_models(&self) -> Vec<String> {
        let url = self.base.build_url("/v1/models");
        match self.get_json::<ModelsResponse>(&url).await {
            Ok(response) => {
                let mut models: Vec<String> = response
                    .data
                    .into_iter()
                    .map(|m| m.id)
                    .filter(|id| id.contains("claude"))
                    .collect();
                models.sort();
                models.dedup();
                models
            }
            Err(error) => {
                warn!(provider = ANTHROPIC, %error, "Model listing failed; using fallback list");
                FALLBACK_MODELS.iter().map(|m| m.to_string()).collect()
            }
        }
    }

    async fn validate_credentials(&self) -> Result<(), ProviderError> {
        let url = self.base.build_url(&format!("/v1/models/{VALIDATION_MODEL}"));
        self.get_json::<serde_json::Value>(&url)
            .await
            .map_err(|error| ProviderError::credential(ANTHROPIC, error.to_string()))?;
        Ok(())
    }
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<RequestMessage>,
}

#[derive(Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}
