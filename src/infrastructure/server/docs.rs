use super::dto::{
    EmbedRequest, EmbedResponse, ErrorResponse, ModelListResponse, SettingsResponse,
    TestPromptRequest, TestPromptResponse, UpdateSettingsRequest,
};
use super::routes;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::settings::settings_get_handler,
        routes::settings::settings_put_handler,
        routes::settings::provider_models_handler,
        routes::playground::test_prompt_handler,
        routes::playground::embed_handler
    ),
    components(
        schemas(
            SettingsResponse,
            UpdateSettingsRequest,
            ModelListResponse,
            TestPromptRequest,
            TestPromptResponse,
            EmbedRequest,
            EmbedResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "settings", description = "Read and update the active provider settings"),
        (name = "providers", description = "Per-vendor model listings"),
        (name = "playground", description = "Text generation and embeddings with the active provider")
    )
)]
pub(super) struct ApiDoc;
