//! Core domain types for the knowledge corpus.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A passage of the corpus.
///
/// Chunks are identified only by their position in the corpus; the index
/// keeps vectors in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Passage text (ingestion output may call this `content`)
    #[serde(alias = "content")]
    pub text: String,

    /// Free-form provenance (source file, page, section...)
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Chunk {
    /// Create a chunk without metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A chunk returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub text: String,
    pub metadata: BTreeMap<String, String>,
    /// Cosine similarity to the query, in -1..=1
    pub score: f32,
}

impl RetrievalResult {
    pub fn from_chunk(chunk: &Chunk, score: f32) -> Self {
        Self {
            text: chunk.text.clone(),
            metadata: chunk.metadata.clone(),
            score,
        }
    }
}
