//! REST surface over the settings service.

mod docs;
mod dto;
mod error;
mod routes;
mod state;

pub use error::ServerError;

use crate::application::settings::SettingsService;
use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use docs::ApiDoc;
use state::ServerState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub async fn serve(service: Arc<SettingsService>, addr: SocketAddr) -> Result<(), ServerError> {
    let api = ApiDoc::openapi();
    info!(%addr, "Binding REST server");

    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any);

    let state = Arc::new(ServerState::new(service));
    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", api))
        .route(
            "/api/v1/settings",
            get(routes::settings::settings_get_handler).put(routes::settings::settings_put_handler),
        )
        .route(
            "/api/v1/providers/{provider}/models",
            get(routes::settings::provider_models_handler),
        )
        .route("/api/v1/test", post(routes::playground::test_prompt_handler))
        .route("/api/v1/embed", post(routes::playground::embed_handler))
        .layer(cors)
        .with_state(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "REST server ready to accept connections");

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(ServerError::Serve)
}
