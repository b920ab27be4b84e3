use serde::{Deserialize, Serialize};

use crate::batch::{batch, Batch, BATCH_SIZE};

/// A single news article.
///
/// Every field is optional: news sources routinely publish `null` authors or
/// descriptions, and a missing field round-trips as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Ordered collection of articles as found in the bundled resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct News {
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl News {
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Consume the collection and split it into emission batches
    pub fn into_batches(self) -> Vec<Batch> {
        batch(self.articles, BATCH_SIZE)
    }
}
