use axum::response::sse::Event;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use newsfeed_types::Batch;

use crate::worker::WorkerError;

/// Events buffered between the worker and the response body
const EMITTER_BUFFER: usize = 16;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("SSE connection closed by client")]
    Closed,

    #[error("Failed to encode batch: {0}")]
    Serialize(#[source] axum::Error),

    #[error("Emitter worker failed: {0}")]
    Worker(String),
}

/// Body stream handed to axum for an [`SseEmitter`]
pub type EmitterStream = ReceiverStream<Result<Event, EmitError>>;

/// Destination for batches produced by a background emitter job
pub trait BatchSink {
    fn send(&mut self, batch: &Batch) -> Result<(), EmitError>;

    /// Close the stream normally
    fn complete(self);

    /// Close the stream with `error`; the client sees a broken stream
    fn complete_with_error(self, error: EmitError);
}

/// Long-lived SSE handle fed from a blocking worker thread.
///
/// Dropping the handle ends the stream normally. Sends block while the
/// client is behind and fail with [`EmitError::Closed`] once it has gone.
pub struct SseEmitter {
    tx: mpsc::Sender<Result<Event, EmitError>>,
    stream_id: Uuid,
}

impl SseEmitter {
    pub fn new() -> (Self, EmitterStream) {
        let (tx, rx) = mpsc::channel(EMITTER_BUFFER);
        let emitter = Self {
            tx,
            stream_id: Uuid::new_v4(),
        };
        (emitter, ReceiverStream::new(rx))
    }

    pub fn stream_id(&self) -> Uuid {
        self.stream_id
    }

    /// Second handle on the same stream, kept outside the worker job
    pub fn failure_reporter(&self) -> FailureReporter {
        FailureReporter {
            tx: self.tx.clone(),
            stream_id: self.stream_id,
        }
    }

    /// Send `data` as the JSON payload of one unnamed event.
    ///
    /// Must be called from a blocking thread, never from async code.
    pub fn send_json<T: Serialize>(&self, data: &T) -> Result<(), EmitError> {
        let event = Event::default()
            .json_data(data)
            .map_err(EmitError::Serialize)?;

        self.tx
            .blocking_send(Ok(event))
            .map_err(|_| EmitError::Closed)
    }
}

impl BatchSink for SseEmitter {
    fn send(&mut self, batch: &Batch) -> Result<(), EmitError> {
        self.send_json(batch)
    }

    fn complete(self) {
        tracing::debug!(stream_id = %self.stream_id, "Emitter completed");
    }

    fn complete_with_error(self, error: EmitError) {
        tracing::debug!(stream_id = %self.stream_id, error = %error, "Emitter completed with error");
        // The client may already be gone, in which case there is nobody to tell.
        let _ = self.tx.blocking_send(Err(error));
    }
}

/// How a background emission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    Completed { sent: usize },
    Failed { sent: usize },
}

/// Ends an emitter's stream with an error when its job never ran or died.
///
/// Holding one keeps the stream open, so it must be dropped once the job
/// has finished.
pub struct FailureReporter {
    tx: mpsc::Sender<Result<Event, EmitError>>,
    stream_id: Uuid,
}

impl FailureReporter {
    pub async fn fail(self, error: EmitError) {
        tracing::warn!(stream_id = %self.stream_id, error = %error, "Emitter job failed");
        let _ = self.tx.send(Err(error)).await;
    }
}

/// Wait for a pooled emitter job and report a dropped or panicked job to the client
pub async fn supervise<R>(job: JoinHandle<Result<R, WorkerError>>, reporter: FailureReporter) {
    let failure = match job.await {
        Ok(Ok(_)) => return,
        Ok(Err(e)) => e.to_string(),
        Err(e) => e.to_string(),
    };

    reporter.fail(EmitError::Worker(failure)).await;
}

/// Send each batch to `sink`, sleeping `interval` after every send.
///
/// Blocks the calling thread for roughly `batches.len() * interval`. The first
/// failed send completes the sink with that error and stops the emission.
pub fn emit_batches<S: BatchSink>(mut sink: S, batches: Vec<Batch>, interval: Duration) -> EmitOutcome {
    let total = batches.len();

    for (index, batch) in batches.iter().enumerate() {
        if let Err(e) = sink.send(batch) {
            match &e {
                EmitError::Closed => {
                    tracing::info!(batch = index + 1, total, "Client disconnected, stopping emitter")
                }
                other => tracing::warn!(batch = index + 1, total, error = %other, "Failed to send batch"),
            }
            sink.complete_with_error(e);
            return EmitOutcome::Failed { sent: index };
        }

        tracing::debug!(batch = index + 1, total, size = batch.len(), "Batch sent");
        std::thread::sleep(interval);
    }

    sink.complete();
    EmitOutcome::Completed { sent: total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use crate::worker::WorkerPool;
    use newsfeed_types::{batch, Article, BATCH_SIZE};
    use std::sync::{Arc, Mutex};

    fn articles(n: usize) -> Vec<Batch> {
        let articles = (0..n)
            .map(|i| Article {
                title: Some(format!("article {i}")),
                ..Default::default()
            })
            .collect();
        batch(articles, BATCH_SIZE)
    }

    #[derive(Default)]
    struct Recorded {
        sent: Vec<Batch>,
        completed: bool,
        error: Option<String>,
    }

    struct RecordingSink {
        log: Arc<Mutex<Recorded>>,
        fail_at: Option<usize>,
    }

    impl BatchSink for RecordingSink {
        fn send(&mut self, batch: &Batch) -> Result<(), EmitError> {
            let mut log = self.log.lock().unwrap();
            if self.fail_at == Some(log.sent.len()) {
                return Err(EmitError::Worker("broken pipe".to_string()));
            }
            log.sent.push(batch.clone());
            Ok(())
        }

        fn complete(self) {
            self.log.lock().unwrap().completed = true;
        }

        fn complete_with_error(self, error: EmitError) {
            self.log.lock().unwrap().error = Some(error.to_string());
        }
    }

    #[test]
    fn test_emits_every_batch_in_order() {
        let log = Arc::new(Mutex::new(Recorded::default()));
        let sink = RecordingSink { log: log.clone(), fail_at: None };
        let batches = articles(7);

        let outcome = emit_batches(sink, batches.clone(), Duration::ZERO);

        assert_eq!(outcome, EmitOutcome::Completed { sent: 3 });
        let log = log.lock().unwrap();
        assert_eq!(log.sent, batches);
        assert!(log.completed);
        assert!(log.error.is_none());
    }

    #[test]
    fn test_failure_on_second_batch_stops_emission() {
        let log = Arc::new(Mutex::new(Recorded::default()));
        let sink = RecordingSink { log: log.clone(), fail_at: Some(1) };
        let batches = articles(9);

        let outcome = emit_batches(sink, batches.clone(), Duration::ZERO);

        assert_eq!(outcome, EmitOutcome::Failed { sent: 1 });
        let log = log.lock().unwrap();
        assert_eq!(log.sent, vec![batches[0].clone()]);
        assert!(!log.completed);
        assert!(log.error.as_deref().unwrap().contains("broken pipe"));
    }

    #[test]
    fn test_no_batches_completes_immediately() {
        let log = Arc::new(Mutex::new(Recorded::default()));
        let sink = RecordingSink { log: log.clone(), fail_at: None };

        let outcome = emit_batches(sink, Vec::new(), Duration::from_secs(10));

        assert_eq!(outcome, EmitOutcome::Completed { sent: 0 });
        assert!(log.lock().unwrap().completed);
    }

    #[test]
    fn test_sleeps_after_each_send() {
        let log = Arc::new(Mutex::new(Recorded::default()));
        let sink = RecordingSink { log, fail_at: None };
        let interval = Duration::from_millis(20);

        let start = std::time::Instant::now();
        emit_batches(sink, articles(6), interval);

        assert!(start.elapsed() >= interval * 2);
    }

    /// Wraps a real emitter and refuses one batch
    struct FailingEmitter {
        inner: SseEmitter,
        sent: usize,
        fail_at: usize,
    }

    impl BatchSink for FailingEmitter {
        fn send(&mut self, batch: &Batch) -> Result<(), EmitError> {
            if self.sent == self.fail_at {
                return Err(EmitError::Worker("forced failure".to_string()));
            }
            self.sent += 1;
            self.inner.send(batch)
        }

        fn complete(self) {
            self.inner.complete()
        }

        fn complete_with_error(self, error: EmitError) {
            self.inner.complete_with_error(error)
        }
    }

    #[tokio::test]
    async fn test_stream_ends_in_error_after_failed_send() {
        let (emitter, stream) = SseEmitter::new();
        let sink = FailingEmitter { inner: emitter, sent: 0, fail_at: 1 };

        let outcome = tokio::task::spawn_blocking(move || emit_batches(sink, articles(9), Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(outcome, EmitOutcome::Failed { sent: 1 });

        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(EmitError::Worker(_))));
    }

    #[tokio::test]
    async fn test_stream_closes_normally_when_all_sent() {
        let (emitter, stream) = SseEmitter::new();

        let outcome = tokio::task::spawn_blocking(move || emit_batches(emitter, articles(7), Duration::ZERO))
            .await
            .unwrap();
        assert_eq!(outcome, EmitOutcome::Completed { sent: 3 });

        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(Result::is_ok));
    }

    #[tokio::test]
    async fn test_dropped_client_is_detected() {
        let (emitter, stream) = SseEmitter::new();
        drop(stream);

        let outcome = tokio::task::spawn_blocking(move || emit_batches(emitter, articles(9), Duration::from_secs(5)))
            .await
            .unwrap();

        assert_eq!(outcome, EmitOutcome::Failed { sent: 0 });
    }

    #[tokio::test]
    async fn test_dropped_job_ends_stream_in_error() {
        let pool = WorkerPool::new(1);
        pool.close();

        let (emitter, stream) = SseEmitter::new();
        let reporter = emitter.failure_reporter();
        let job = pool.execute(move || emit_batches(emitter, articles(4), Duration::ZERO));
        supervise(job, reporter).await;

        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], Err(EmitError::Worker(msg)) if msg.contains("shut down")));
    }

    #[tokio::test]
    async fn test_panicked_job_ends_stream_in_error() {
        let pool = WorkerPool::new(1);

        let (emitter, stream) = SseEmitter::new();
        let reporter = emitter.failure_reporter();
        let job = pool.execute(move || -> EmitOutcome {
            drop(emitter);
            panic!("emitter crashed")
        });
        supervise(job, reporter).await;

        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(EmitError::Worker(_))));
    }

    #[tokio::test]
    async fn test_finished_job_closes_stream_normally() {
        let pool = WorkerPool::new(1);

        let (emitter, stream) = SseEmitter::new();
        let reporter = emitter.failure_reporter();
        let job = pool.execute(move || emit_batches(emitter, articles(4), Duration::ZERO));
        supervise(job, reporter).await;

        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(Result::is_ok));
    }
}
