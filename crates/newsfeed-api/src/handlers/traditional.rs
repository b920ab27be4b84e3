use axum::{extract::State, response::sse::Sse};
use std::sync::Arc;

use crate::{
    emitter::{emit_batches, supervise, EmitOutcome, EmitterStream, SseEmitter},
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Stream the bundled news from a background worker thread
///
/// Returns the SSE response immediately; a pooled worker then sends one
/// unnamed event per batch and sleeps between sends. A failed send ends the
/// stream with an error, as does a job the pool drops or one that panics.
#[utoipa::path(
    get,
    path = "/news/traditional/emitter",
    responses(
        (status = 200, description = "One event per batch of up to 3 articles", content_type = "text/event-stream"),
        (status = 500, description = "News resource missing or malformed"),
        (status = 503, description = "Worker pool shut down")
    ),
    tag = "news"
)]
pub async fn traditional_emitter(State(state): State<Arc<AppState>>) -> ApiResult<Sse<EmitterStream>> {
    if state.workers.is_closed() {
        return Err(ApiError::WorkerUnavailable);
    }

    let news = newsfeed_types::load_async(&state.config.news.file).await?;
    let batches = news.into_batches();
    let interval = state.config.news.interval();

    let (emitter, stream) = SseEmitter::new();
    let stream_id = emitter.stream_id();
    tracing::info!(
        %stream_id,
        batches = batches.len(),
        idle_workers = state.workers.idle_workers(),
        "Dispatching news emitter"
    );

    let reporter = emitter.failure_reporter();
    let job = state.workers.execute(move || {
        match emit_batches(emitter, batches, interval) {
            EmitOutcome::Completed { sent } => {
                tracing::info!(%stream_id, sent, "News emitter finished")
            }
            EmitOutcome::Failed { sent } => {
                tracing::warn!(%stream_id, sent, "News emitter stopped early")
            }
        }
    });
    tokio::spawn(supervise(job, reporter));

    Ok(Sse::new(stream))
}
