pub mod article;
pub mod batch;
pub mod error;
pub mod loader;

pub use article::{Article, News};
pub use batch::{batch, Batch, BATCH_SIZE};
pub use error::{NewsError, Result};
pub use loader::{load, load_async, parse};
