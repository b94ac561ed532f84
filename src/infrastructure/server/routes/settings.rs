use super::super::dto::{
    ErrorResponse, ModelListResponse, SettingsResponse, UpdateSettingsRequest,
};
use super::super::error::error_response;
use super::super::state::ServerState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::info;

#[utoipa::path(
    get,
    path = "/api/v1/settings",
    tag = "settings",
    responses(
        (status = 200, description = "Current provider settings", body = SettingsResponse)
    )
)]
pub async fn settings_get_handler(State(state): State<Arc<ServerState>>) -> Json<SettingsResponse> {
    let view = state.service().current_view().await;
    Json(view.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/settings",
    tag = "settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = SettingsResponse),
        (status = 400, description = "Invalid settings value", body = ErrorResponse),
        (status = 404, description = "Unknown provider", body = ErrorResponse),
        (status = 500, description = "Settings could not be persisted", body = ErrorResponse)
    )
)]
pub async fn settings_put_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(
        provider = payload.provider.as_deref(),
        model = payload.model.as_deref(),
        temperature = payload.temperature,
        "Received settings update"
    );
    let view = state
        .service()
        .apply_update(payload.into())
        .await
        .map_err(error_response)?;
    Ok(Json(view.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/providers/{provider}/models",
    tag = "providers",
    params(
        ("provider" = String, Path, description = "Live vendor name")
    ),
    responses(
        (status = 200, description = "Models for the given provider", body = ModelListResponse),
        (status = 404, description = "Unknown provider", body = ErrorResponse)
    )
)]
pub async fn provider_models_handler(
    State(state): State<Arc<ServerState>>,
    Path(provider): Path<String>,
) -> Result<Json<ModelListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let models = state
        .service()
        .models_for(&provider)
        .await
        .map_err(error_response)?;
    Ok(Json(ModelListResponse { models }))
}
