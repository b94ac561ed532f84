use crate::application::settings::{SettingsUpdate, SettingsView};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, PartialEq, ToSchema)]
pub struct SettingsResponse {
    pub provider: String,
    pub model: String,
    pub embedding_model: Option<String>,
    pub temperature: f64,
    pub available_models: Vec<String>,
    pub available_providers: Vec<String>,
}

impl From<SettingsView> for SettingsResponse {
    fn from(view: SettingsView) -> Self {
        Self {
            provider: view.provider,
            model: view.model,
            embedding_model: view.embedding_model,
            temperature: view.temperature,
            available_models: view.available_models,
            available_providers: view.available_providers,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
}

impl From<UpdateSettingsRequest> for SettingsUpdate {
    fn from(request: UpdateSettingsRequest) -> Self {
        Self {
            provider: request.provider,
            model: request.model,
            temperature: request.temperature,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModelListResponse {
    pub models: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TestPromptRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TestPromptResponse {
    pub response: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmbedRequest {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmbedResponse {
    pub embedding: Vec<f64>,
    pub embedding_model: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
