use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Worker pool is shut down")]
    Closed,

    #[error("Worker job panicked: {0}")]
    Panicked(#[from] JoinError),
}

/// Bounded pool of blocking worker threads.
///
/// At most `max_workers` jobs run at once. Extra jobs wait for a free slot
/// instead of growing the thread count.
#[derive(Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    max_workers: usize,
}

impl WorkerPool {
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_workers)),
            max_workers,
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Slots not currently held by a running job
    pub fn idle_workers(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Stop accepting jobs; queued jobs are dropped without running
    pub fn close(&self) {
        self.permits.close();
    }

    /// Queue `job` and run it on a blocking thread once a slot frees up
    pub fn execute<F, R>(&self, job: F) -> JoinHandle<Result<R, WorkerError>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);

        tokio::spawn(async move {
            let permit = permits.acquire_owned().await.map_err(|_| {
                tracing::warn!("Worker pool closed, dropping job");
                WorkerError::Closed
            })?;

            let result = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                job()
            })
            .await;

            result.map_err(|e| {
                tracing::error!("Worker job failed: {}", e);
                WorkerError::from(e)
            })
        })
    }
}
