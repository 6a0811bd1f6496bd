pub mod chunker;
pub mod embedder;
pub mod extractor;
pub mod loader;
pub mod store;

pub use chunker::{ChunkerConfig, TextChunker};
pub use embedder::{Embedder, EmbeddingVector, HashEmbedder};
pub use loader::{load_files, load_files_with_config, LoaderError};
pub use store::VectorStore;
