use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::Config;
use crate::worker::WorkerPool;

/// Shared application state passed to all handlers
///
/// Holds no news data: every request loads its own copy of the resource.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub workers: WorkerPool,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let workers = WorkerPool::new(config.worker.max_workers);
        Self {
            config: Arc::new(config),
            workers,
            started_at: Utc::now(),
        }
    }
}
