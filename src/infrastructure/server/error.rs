use super::dto::ErrorResponse;
use crate::application::settings::SettingsError;
use crate::infrastructure::model::ProviderError;
use axum::Json;
use axum::http::StatusCode;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind HTTP listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Maps core errors onto HTTP responses: caller mistakes are 4xx, vendor
/// failures 502, persistence failures 500.
pub(super) fn error_response(error: SettingsError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &error {
        SettingsError::TemperatureOutOfRange { .. } => StatusCode::BAD_REQUEST,
        SettingsError::Provider(ProviderError::UnknownProvider { .. }) => StatusCode::NOT_FOUND,
        SettingsError::Provider(ProviderError::Unsupported { .. }) => StatusCode::BAD_REQUEST,
        SettingsError::Provider(_) => StatusCode::BAD_GATEWAY,
        SettingsError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

pub(super) fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}
