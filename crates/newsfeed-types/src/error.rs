use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("Failed to read news resource {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed news document: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NewsError>;
