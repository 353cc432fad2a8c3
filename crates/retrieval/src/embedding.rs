//! Embedding retriever — semantic similarity over the catalog.
//!
//! Every document's `"{title} {author}"` text is embedded once when the
//! retriever is built. Each question is embedded at query time and the
//! catalog is ranked by cosine similarity.

use async_trait::async_trait;
use gamewise_core::catalog::{GameDocument, Retriever};
use gamewise_core::error::RetrievalError;
use gamewise_core::provider::{EmbeddingRequest, Provider};
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::GameCatalog;
use crate::vector::{vector_search, IndexedDocument};

pub struct EmbeddingRetriever {
    provider: Arc<dyn Provider>,
    model: String,
    index: Vec<IndexedDocument>,
    top_k: usize,
}

impl EmbeddingRetriever {
    /// Embed the whole catalog and build the index.
    pub async fn build(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        catalog: &GameCatalog,
        top_k: usize,
    ) -> Result<Self, RetrievalError> {
        let model = model.into();
        let documents = catalog.documents().to_vec();

        let embeddings = if documents.is_empty() {
            Vec::new()
        } else {
            let inputs = documents.iter().map(|d| d.page_content()).collect();
            embed(provider.as_ref(), &model, inputs).await?
        };

        if embeddings.len() != documents.len() {
            return Err(RetrievalError::EmbeddingFailed(format!(
                "expected {} embeddings, provider returned {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let index = documents
            .into_iter()
            .zip(embeddings)
            .map(|(document, embedding)| IndexedDocument { document, embedding })
            .collect::<Vec<_>>();

        info!(model = %model, documents = index.len(), "Embedding index built");

        Ok(Self {
            provider,
            model,
            index,
            top_k: top_k.max(1),
        })
    }
}

async fn embed(
    provider: &dyn Provider,
    model: &str,
    inputs: Vec<String>,
) -> Result<Vec<Vec<f32>>, RetrievalError> {
    provider
        .embed(EmbeddingRequest {
            model: model.to_string(),
            inputs,
        })
        .await
        .map(|r| r.embeddings)
        .map_err(|e| RetrievalError::EmbeddingFailed(e.to_string()))
}

#[async_trait]
impl Retriever for EmbeddingRetriever {
    fn name(&self) -> &str { "embedding" }

    async fn retrieve(&self, query: &str) -> Result<Vec<GameDocument>, RetrievalError> {
        if self.index.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = embed(self.provider.as_ref(), &self.model, vec![query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::EmbeddingFailed("empty embedding response".into()))?;

        let results = vector_search(&self.index, &query_embedding, self.top_k, f32::MIN);
        debug!(count = results.len(), "Embedding retrieval complete");
        Ok(results)
    }
}
