use super::super::dto::{
    EmbedRequest, EmbedResponse, ErrorResponse, TestPromptRequest, TestPromptResponse,
};
use super::super::error::{bad_request, error_response};
use super::super::state::ServerState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{error, info};

const MAX_PROMPT_CHARS: usize = 1000;

#[utoipa::path(
    post,
    path = "/api/v1/test",
    tag = "playground",
    request_body = TestPromptRequest,
    responses(
        (status = 200, description = "Generated text", body = TestPromptResponse),
        (status = 400, description = "Invalid prompt", body = ErrorResponse),
        (status = 502, description = "Provider call failed", body = ErrorResponse)
    )
)]
pub async fn test_prompt_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<TestPromptRequest>,
) -> Result<Json<TestPromptResponse>, (StatusCode, Json<ErrorResponse>)> {
    let prompt = payload.prompt.trim();
    if prompt.is_empty() {
        error!("Rejecting /test request due to empty prompt");
        return Err(bad_request("prompt cannot be empty"));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(bad_request("prompt exceeds 1000 characters"));
    }

    info!("Forwarding prompt to active provider");
    let response = state
        .service()
        .generate_text(prompt)
        .await
        .map_err(error_response)?;
    Ok(Json(TestPromptResponse { response }))
}

#[utoipa::path(
    post,
    path = "/api/v1/embed",
    tag = "playground",
    request_body = EmbedRequest,
    responses(
        (status = 200, description = "Embedding vector", body = EmbedResponse),
        (status = 400, description = "Invalid text or unsupported capability", body = ErrorResponse),
        (status = 502, description = "Provider call failed", body = ErrorResponse)
    )
)]
pub async fn embed_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<EmbedRequest>,
) -> Result<Json<EmbedResponse>, (StatusCode, Json<ErrorResponse>)> {
    if payload.text.trim().is_empty() {
        error!("Rejecting /embed request due to empty text");
        return Err(bad_request("text cannot be empty"));
    }

    let (embedding, embedding_model) = state
        .service()
        .generate_embedding(&payload.text)
        .await
        .map_err(error_response)?;
    Ok(Json(EmbedResponse {
        embedding,
        embedding_model,
    }))
}
