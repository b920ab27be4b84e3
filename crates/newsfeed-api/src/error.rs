use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use newsfeed_types::NewsError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("News error: {0}")]
    News(#[from] NewsError),

    #[error("Worker pool unavailable")]
    WorkerUnavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::News(ref e) => {
                tracing::error!("News error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "News source unavailable".to_string(),
                )
            }
            ApiError::WorkerUnavailable => {
                tracing::error!("Worker pool error: {}", self);
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
