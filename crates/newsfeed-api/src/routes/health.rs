use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Reports whether the news resource is reachable and how busy the worker pool is
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Json<HealthResponse>> {
    let mut services = HashMap::new();

    let news_file = match tokio::fs::try_exists(&state.config.news.file).await {
        Ok(true) => "available",
        _ => "missing",
    };
    services.insert("news_file".to_string(), news_file.to_string());

    let workers = if state.workers.is_closed() {
        "closed".to_string()
    } else {
        format!(
            "{}/{} idle",
            state.workers.idle_workers(),
            state.workers.max_workers()
        )
    };
    services.insert("workers".to_string(), workers);

    let status = if news_file == "available" { "healthy" } else { "degraded" };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: (chrono::Utc::now() - state.started_at).num_seconds(),
        services,
    }))
}
