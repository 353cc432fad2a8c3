//! Game catalog and retrieval for gamewise.
//!
//! The catalog is a JSONL file of games. Two retrievers sit on top of it:
//! a keyword retriever that needs nothing but the catalog, and an
//! embedding retriever that ranks by cosine similarity of provider
//! embeddings.

pub mod catalog;
pub mod embedding;
pub mod keyword;
pub mod vector;

pub use catalog::GameCatalog;
pub use embedding::EmbeddingRetriever;
pub use keyword::KeywordRetriever;
pub use vector::{cosine_similarity, vector_search, IndexedDocument};
