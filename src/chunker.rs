use std::collections::VecDeque;
use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default max characters per chunk.
/// Can be overridden with the RAGPREP_CHUNK_SIZE environment variable.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Default characters of trailing context carried into the next chunk.
/// Can be overridden with the RAGPREP_CHUNK_OVERLAP environment variable.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,
    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({chunk_size})")]
    OverlapExceedsChunkSize { overlap: usize, chunk_size: usize },
}

/// Settings for [`TextChunker`].
///
/// Lengths are measured in characters, not bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Separators tried in order when looking for a split point. The empty
    /// string means "split between every character" and must come last.
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

fn default_separators() -> Vec<String> {
    vec![
        "\n\n".to_string(),
        "\n".to_string(),
        " ".to_string(),
        String::new(),
    ]
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            separators: default_separators(),
        }
    }
}

impl ChunkerConfig {
    /// Build a config from the environment, falling back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(size) = env::var("RAGPREP_CHUNK_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.chunk_size = size;
        }
        if let Some(overlap) = env::var("RAGPREP_CHUNK_OVERLAP")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.chunk_overlap = overlap;
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.chunk_size == 0 {
            return Err(ConfigurationError::ZeroChunkSize);
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigurationError::OverlapExceedsChunkSize {
                overlap: self.chunk_overlap,
                chunk_size: self.chunk_size,
            });
        }
        Ok(())
    }
}

/// Splits text into overlapping chunks, preferring semantic boundaries.
///
/// Separators are tried in configured order (paragraph, line, word, then raw
/// character cuts by default); fragments still larger than `chunk_size` are
/// recursively re-split with the remaining separators, and the resulting
/// fragments are greedily merged back into chunks of at most `chunk_size`
/// characters, retaining up to `chunk_overlap` characters of trailing
/// context at each boundary.
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkerConfig,
}

impl TextChunker {
    /// Fails fast on an invalid configuration.
    pub fn new(config: ChunkerConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split `text` into an ordered sequence of chunks.
    ///
    /// Empty input produces an empty sequence; input shorter than
    /// `chunk_size` produces a single chunk equal to the (trimmed) input.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let chunks = self.split_with(text, &self.config.separators);
        debug!(
            input_chars = text.chars().count(),
            chunks = chunks.len(),
            chunk_size = self.config.chunk_size,
            chunk_overlap = self.config.chunk_overlap,
            "Text split into chunks"
        );
        chunks
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        // First separator present in the text wins; the empty string always
        // matches and falls back to per-character splits.
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() || text.contains(candidate.as_str()) {
                separator = candidate;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let splits: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).collect()
        };

        let mut final_chunks = Vec::new();
        let mut good_splits: Vec<&str> = Vec::new();
        for split in splits {
            // Per-character splits are always mergeable, even when
            // chunk_size is 1.
            if char_len(split) < self.config.chunk_size || separator.is_empty() {
                good_splits.push(split);
            } else {
                if !good_splits.is_empty() {
                    final_chunks.extend(self.merge_splits(&good_splits, separator));
                    good_splits.clear();
                }
                final_chunks.extend(self.split_with(split, remaining));
            }
        }
        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits, separator));
        }
        final_chunks
    }

    /// Greedily merge fragments into chunks of at most `chunk_size`
    /// characters. When a chunk is emitted, fragments are dropped from its
    /// front until the retained tail is within the overlap budget; the tail
    /// seeds the next chunk.
    fn merge_splits(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let chunk_size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;
        let sep_len = char_len(separator);

        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &split in splits {
            let split_len = char_len(split);
            let joined_len = total + split_len + if current.is_empty() { 0 } else { sep_len };
            if joined_len > chunk_size && !current.is_empty() {
                if let Some(doc) = join_splits(&current, separator) {
                    docs.push(doc);
                }
                while total > overlap
                    || (total + split_len + if current.is_empty() { 0 } else { sep_len }
                        > chunk_size
                        && total > 0)
                {
                    let front = current.pop_front().expect("total > 0 implies non-empty");
                    total -= char_len(front) + if current.is_empty() { 0 } else { sep_len };
                }
            }
            current.push_back(split);
            total += split_len + if current.len() > 1 { sep_len } else { 0 };
        }

        if let Some(doc) = join_splits(&current, separator) {
            docs.push(doc);
        }
        docs
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join_splits(splits: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = splits
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_string();
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
