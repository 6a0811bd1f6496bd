use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::chunker::{ChunkerConfig, ConfigurationError, TextChunker};
use crate::embedder::{Embedder, EmbeddingError};
use crate::extractor::{self, ExtractionError};
use crate::store::{PersistenceError, VectorStore};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Run the full ingestion pipeline with chunker settings taken from the
/// environment (`RAGPREP_CHUNK_SIZE`, `RAGPREP_CHUNK_OVERLAP`), falling
/// back to 2000-character chunks with a 100-character overlap.
///
/// See [`load_files_with_config`].
pub fn load_files<E, P, D>(
    embedder: &E,
    pdfs: &[P],
    index_name: &str,
    output_dir: D,
) -> Result<(Vec<String>, VectorStore), LoaderError>
where
    E: Embedder,
    P: AsRef<Path>,
    D: AsRef<Path>,
{
    load_files_with_config(embedder, pdfs, index_name, output_dir, ChunkerConfig::from_env())
}

/// Extract text from `pdfs`, split it into overlapping chunks, embed each
/// chunk, and persist the resulting index to
/// `<output_dir>/<index_name>vctrstr.json`.
///
/// Strictly sequential: extraction, chunking, embedding and persistence run
/// in order and any failure aborts the whole call. The persisted file fully
/// replaces any prior index of the same name. Returns the chunk sequence and
/// the in-memory store handle so callers can query without reopening the
/// file.
pub fn load_files_with_config<E, P, D>(
    embedder: &E,
    pdfs: &[P],
    index_name: &str,
    output_dir: D,
    config: ChunkerConfig,
) -> Result<(Vec<String>, VectorStore), LoaderError>
where
    E: Embedder,
    P: AsRef<Path>,
    D: AsRef<Path>,
{
    let chunker = TextChunker::new(config)?;

    let combined_text = extractor::combine_documents(pdfs)?;
    let chunks = chunker.split_text(&combined_text);

    let store = VectorStore::from_texts(&chunks, embedder, index_name)?;
    store.persist(output_dir)?;

    info!(
        index_name = %index_name,
        sources = pdfs.len(),
        combined_chars = combined_text.chars().count(),
        chunks = chunks.len(),
        "Ingestion pipeline completed"
    );
    Ok((chunks, store))
}
