use async_stream::stream;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use newsfeed_types::Batch;

use crate::{error::ApiResult, state::AppState};

/// SSE event type carried by every reactive batch
pub const NEWS_EVENT: &str = "news";

/// Stream the bundled news in batches of three, one `news` event per interval
///
/// The news resource is loaded before the response starts, so a missing or
/// malformed file fails the request instead of producing a partial stream.
#[utoipa::path(
    get,
    path = "/news/reactive/emitter",
    responses(
        (status = 200, description = "One `news` event per batch of up to 3 articles", content_type = "text/event-stream"),
        (status = 500, description = "News resource missing or malformed")
    ),
    tag = "news"
)]
pub async fn reactive_emitter(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let news = newsfeed_types::load_async(&state.config.news.file).await?;

    let stream_id = Uuid::new_v4();
    tracing::info!(%stream_id, articles = news.len(), "Starting reactive news stream");

    Ok(Sse::new(news_events(
        stream_id,
        news.into_batches(),
        state.config.news.interval(),
    )))
}

/// Lazily yield one named event per batch, each preceded by `interval`.
///
/// Waiting happens on a runtime timer; no thread is held between events.
/// Dropping the stream cancels the remaining batches.
pub fn news_events(
    stream_id: Uuid,
    batches: Vec<Batch>,
    interval: Duration,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream! {
        let total = batches.len();
        for (index, batch) in batches.into_iter().enumerate() {
            tokio::time::sleep(interval).await;
            tracing::debug!(%stream_id, batch = index + 1, total, size = batch.len(), "Batch emitted");
            yield Event::default().event(NEWS_EVENT).json_data(&batch);
        }
        tracing::info!(%stream_id, batches = total, "Reactive news stream completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use newsfeed_types::{batch, Article, BATCH_SIZE};

    fn batches(n: usize) -> Vec<Batch> {
        batch(vec![Article::default(); n], BATCH_SIZE)
    }

    #[tokio::test]
    async fn test_one_event_per_batch() {
        let events: Vec<_> = news_events(Uuid::new_v4(), batches(7), Duration::ZERO)
            .collect()
            .await;

        assert_eq!(events.len(), 3);
        assert!(events.iter().all(Result::is_ok));
    }

    #[tokio::test]
    async fn test_empty_news_yields_nothing() {
        let mut events = Box::pin(news_events(Uuid::new_v4(), Vec::new(), Duration::from_secs(60)));
        assert!(events.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_are_spaced_by_interval() {
        let interval = Duration::from_secs(1);
        let start = tokio::time::Instant::now();
        let mut events = Box::pin(news_events(Uuid::new_v4(), batches(6), interval));

        events.next().await.unwrap().unwrap();
        let first = start.elapsed();
        assert!(first >= interval && first < interval * 2);

        events.next().await.unwrap().unwrap();
        let second = start.elapsed();
        assert!(second >= interval * 2 && second < interval * 3);

        // No trailing delay after the last batch
        assert!(events.next().await.is_none());
        assert!(start.elapsed() < interval * 3);
    }
}
