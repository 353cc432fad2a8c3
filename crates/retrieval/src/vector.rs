//! Vector similarity utilities.
//!
//! Pure-Rust cosine similarity and top-k ranking over embedded documents.

use gamewise_core::catalog::GameDocument;

/// A catalog document paired with its embedding.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    pub document: GameDocument,
    pub embedding: Vec<f32>,
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank documents by cosine similarity to a query embedding.
///
/// Returns documents sorted by descending similarity, with `score` set to
/// the cosine similarity value. Only documents meeting the minimum score
/// threshold are included.
pub fn vector_search(
    index: &[IndexedDocument],
    query_embedding: &[f32],
    limit: usize,
    min_score: f32,
) -> Vec<GameDocument> {
    let mut scored: Vec<(f32, GameDocument)> = index
        .iter()
        .filter_map(|entry| {
            let sim = cosine_similarity(&entry.embedding, query_embedding);
            if sim >= min_score {
                let mut doc = entry.document.clone();
                doc.score = sim;
                Some((sim, doc))
            } else {
                None
            }
        })
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored.into_iter().map(|(_, d)| d).collect()
}
