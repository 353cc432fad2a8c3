//! Retriever trait — similarity lookup over the game catalog.
//!
//! The catalog holds one document per game. A retriever returns the
//! documents most relevant to a question, best first; the position in the
//! returned list is the relevance rank.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::RetrievalError;

/// A single game in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDocument {
    /// Unique ID for this document
    #[serde(default)]
    pub id: String,

    /// Display title
    pub title: String,

    /// Developer or studio
    pub author: String,

    /// Release year, kept as a display string
    pub year: String,

    /// Relevance score (set by search operations)
    #[serde(default, skip_serializing)]
    pub score: f32,
}

impl GameDocument {
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            author: author.into(),
            year: year.into(),
            score: 0.0,
        }
    }

    /// The text that gets embedded and keyword-matched.
    pub fn page_content(&self) -> String {
        format!("{} {}", self.title, self.author)
    }
}

/// The core Retriever trait.
///
/// Implementations: keyword overlap, embedding similarity, fixed lists (tests).
#[async_trait]
pub trait Retriever: Send + Sync {
    /// The retriever name (e.g., "keyword", "embedding").
    fn name(&self) -> &str;

    /// Return the documents most relevant to `query`, best first. May be empty.
    async fn retrieve(&self, query: &str) -> std::result::Result<Vec<GameDocument>, RetrievalError>;
}
