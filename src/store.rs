use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::embedder::{cosine_similarity, Embedder, EmbeddingError, EmbeddingVector};

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to write vector store '{path}': {reason}")]
    Write { path: String, reason: String },
    #[error("Failed to read vector store '{path}': {reason}")]
    Read { path: String, reason: String },
    #[error("Failed to serialize vector store: {0}")]
    Serialization(String),
}

/// One chunk and its embedding, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRecord {
    pub text: String,
    pub embedding: EmbeddingVector,
}

/// A chunk text ranked by similarity to a query vector.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub text: String,
    pub score: f32,
}

/// File-backed vector store: chunk texts and their embeddings, persisted as
/// a single JSON document named `<index_name>vctrstr.json`.
///
/// The file is fully replaced on every persist; there is no merge with a
/// pre-existing store of the same name, and the write is a single
/// non-atomic `fs::write`.
#[derive(Debug, Clone)]
pub struct VectorStore {
    index_name: String,
    records: Vec<StoreRecord>,
}

impl VectorStore {
    /// Embed every chunk (order preserved, one record per chunk) and build
    /// the in-memory store. Any embedding failure aborts the whole build.
    pub fn from_texts<E: Embedder>(
        texts: &[String],
        embedder: &E,
        index_name: &str,
    ) -> Result<Self, EmbeddingError> {
        let mut records = Vec::with_capacity(texts.len());
        for text in texts {
            let embedding = embedder.embed(text)?;
            records.push(StoreRecord {
                text: text.clone(),
                embedding,
            });
        }
        debug!(
            index_name = %index_name,
            records = records.len(),
            "Built in-memory vector store"
        );
        Ok(Self {
            index_name: index_name.to_string(),
            records,
        })
    }

    /// Path of the persisted store for `index_name` inside `dir`. The index
    /// name is used verbatim; sanitizing untrusted input is the caller's
    /// responsibility.
    pub fn path_for<P: AsRef<Path>>(dir: P, index_name: &str) -> PathBuf {
        dir.as_ref().join(format!("{}vctrstr.json", index_name))
    }

    /// Serialize the store to `<dir>/<index_name>vctrstr.json`, replacing
    /// any existing file. Returns the path written.
    pub fn persist<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf, PersistenceError> {
        let path = Self::path_for(dir, &self.index_name);
        let json = serde_json::to_string(&self.records)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        fs::write(&path, json).map_err(|e| PersistenceError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        info!(
            path = %path.display(),
            records = self.records.len(),
            "Vector store persisted"
        );
        Ok(path)
    }

    /// Reopen a previously persisted store.
    pub fn load<P: AsRef<Path>>(dir: P, index_name: &str) -> Result<Self, PersistenceError> {
        let path = Self::path_for(dir, index_name);
        let contents = fs::read_to_string(&path).map_err(|e| PersistenceError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let records: Vec<StoreRecord> = serde_json::from_str(&contents)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        debug!(path = %path.display(), records = records.len(), "Vector store loaded");
        Ok(Self {
            index_name: index_name.to_string(),
            records,
        })
    }

    /// Cosine-ranked chunk texts for a query vector, best first.
    pub fn similarity_search(
        &self,
        query_vector: &EmbeddingVector,
        top_k: usize,
    ) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = self
            .records
            .iter()
            .map(|record| SearchResult {
                text: record.text.clone(),
                score: cosine_similarity(query_vector, &record.embedding),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);
        results
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn records(&self) -> &[StoreRecord] {
        &self.records
    }

    /// Chunk texts in insertion order.
    pub fn texts(&self) -> Vec<String> {
        self.records.iter().map(|r| r.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashEmbedder;

    fn sample_texts() -> Vec<String> {
        vec![
            "first chunk".to_string(),
            "second chunk".to_string(),
            "third chunk".to_string(),
        ]
    }

    #[test]
    fn test_from_texts_preserves_order() {
        let store = VectorStore::from_texts(&sample_texts(), &HashEmbedder, "t").unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.texts(), sample_texts());
        assert!(store.records().iter().all(|r| r.embedding.len() == 384));
    }

    #[test]
    fn test_failing_embedder_aborts_build() {
        struct FailingEmbedder;
        impl Embedder for FailingEmbedder {
            fn embed(&self, _text: &str) -> Result<EmbeddingVector, EmbeddingError> {
                Err(EmbeddingError::Provider("provider down".to_string()))
            }
        }

        let result = VectorStore::from_texts(&sample_texts(), &FailingEmbedder, "t");
        assert!(result.is_err());
    }

    #[test]
    fn test_persist_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::from_texts(&sample_texts(), &HashEmbedder, "foo").unwrap();

        let path = store.persist(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("foovctrstr.json"));
        assert!(path.exists());

        let loaded = VectorStore::load(dir.path(), "foo").unwrap();
        assert_eq!(loaded.texts(), store.texts());
    }

    #[test]
    fn test_persist_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();

        let first = VectorStore::from_texts(&sample_texts(), &HashEmbedder, "foo").unwrap();
        first.persist(dir.path()).unwrap();

        let second =
            VectorStore::from_texts(&["only chunk".to_string()], &HashEmbedder, "foo").unwrap();
        second.persist(dir.path()).unwrap();

        let loaded = VectorStore::load(dir.path(), "foo").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.texts(), vec!["only chunk".to_string()]);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            VectorStore::load(dir.path(), "nope"),
            Err(PersistenceError::Read { .. })
        ));
    }

    #[test]
    fn test_similarity_search_ranks_identical_text_first() {
        let store = VectorStore::from_texts(&sample_texts(), &HashEmbedder, "t").unwrap();
        let query = HashEmbedder.embed("second chunk").unwrap();

        let results = store.similarity_search(&query, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "second chunk");
        assert!(results[0].score >= results[1].score);
    }
}
