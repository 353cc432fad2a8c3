//! Keyword retriever — term overlap between the question and each game.
//!
//! Needs no embedding model. Like a k-nearest-neighbour search it always
//! returns `top_k` documents when the catalog has that many; documents that
//! share no terms with the question keep their catalog order.

use async_trait::async_trait;
use gamewise_core::catalog::{GameDocument, Retriever};
use gamewise_core::error::RetrievalError;
use std::collections::HashSet;

use crate::catalog::GameCatalog;

/// Shortest term considered meaningful.
const MIN_TERM_LEN: usize = 3;

pub struct KeywordRetriever {
    catalog: GameCatalog,
    top_k: usize,
}

impl KeywordRetriever {
    pub fn new(catalog: GameCatalog, top_k: usize) -> Self {
        Self {
            catalog,
            top_k: top_k.max(1),
        }
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TERM_LEN)
        .map(String::from)
        .collect()
}

#[async_trait]
impl Retriever for KeywordRetriever {
    fn name(&self) -> &str { "keyword" }

    async fn retrieve(&self, query: &str) -> Result<Vec<GameDocument>, RetrievalError> {
        let query_terms = terms(query);

        let mut results: Vec<GameDocument> = self
            .catalog
            .documents()
            .iter()
            .cloned()
            .map(|mut doc| {
                let doc_terms = terms(&doc.page_content());
                let overlap = query_terms.intersection(&doc_terms).count();
                doc.score = overlap as f32 / query_terms.len().max(1) as f32;
                doc
            })
            .collect();

        // sort_by is stable: ties keep catalog order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(self.top_k);

        Ok(results)
    }
}
