use std::path::Path;

use crate::article::News;
use crate::error::{NewsError, Result};

/// Decode a news document. Fields the model does not know are ignored.
pub fn parse(json: &str) -> Result<News> {
    Ok(serde_json::from_str(json)?)
}

/// Read and decode the news resource at `path`
pub fn load(path: impl AsRef<Path>) -> Result<News> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| NewsError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let news = parse(&json)?;
    tracing::debug!(path = %path.display(), articles = news.len(), "News loaded");
    Ok(news)
}

/// Async variant of [`load`] for use on the runtime
pub async fn load_async(path: impl AsRef<Path>) -> Result<News> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| NewsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let news = parse(&json)?;
    tracing::debug!(path = %path.display(), articles = news.len(), "News loaded");
    Ok(news)
}
