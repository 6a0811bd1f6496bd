use thiserror::Error;

/// Embedding vector (384-dimensional for the default provider)
pub type EmbeddingVector = Vec<f32>;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding provider failed: {0}")]
    Provider(String),
}

/// Narrow "text -> vector" contract so providers can be swapped without
/// touching extraction or chunking.
pub trait Embedder {
    fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;
}

/// Hash-based offline embedder. Deterministic and dependency-free; stands in
/// for a real model in tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct HashEmbedder;

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let hash = seahash::hash(text.as_bytes());
        let mut vec = vec![0.0; 384];
        vec[0] = (hash & 0xFFFF) as f32;
        vec[1] = ((hash >> 16) & 0xFFFF) as f32;
        vec[2] = ((hash >> 32) & 0xFFFF) as f32;
        Ok(vec)
    }
}

/// Cosine similarity between two vectors. Empty or zero-magnitude vectors
/// score 0.0. Ranking over a whole store lives in
/// [`crate::store::VectorStore::similarity_search`].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
