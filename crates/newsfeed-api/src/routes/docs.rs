use axum::Json;
use utoipa::OpenApi;

use crate::{handlers, routes::health};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::reactive::reactive_emitter,
        handlers::traditional::traditional_emitter,
        health::health_check,
    ),
    components(schemas(newsfeed_types::Article, health::HealthResponse)),
    tags(
        (name = "news", description = "Timed SSE news feeds"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;

/// Serve the generated OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
