//! Persisted embedding index and the read-only store that serves searches.
//!
//! An index directory holds two artifacts that are only meaningful together:
//! `vectors.bin` (see [`crate::index`] for the layout) and `chunks.json`,
//! the chunk list in the same order as the vectors.

use crate::embeddings::EmbeddingProvider;
use crate::index::FlatIndex;
use crate::types::{Chunk, RetrievalResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use vidya_core::{AppError, AppResult};

/// Vector artifact file name.
pub const VECTORS_FILE: &str = "vectors.bin";

/// Chunk list artifact file name.
pub const CHUNKS_FILE: &str = "chunks.json";

/// Texts embedded per provider call while building.
const BUILD_BATCH_SIZE: usize = 64;

/// Vectors aligned 1:1 with the chunks they were computed from.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    vectors: FlatIndex,
    chunks: Vec<Chunk>,
    built_at: Option<DateTime<Utc>>,
}

impl EmbeddingIndex {
    /// Embed every chunk and build an exact search index.
    ///
    /// Fails with `AppError::Data` for an empty corpus.
    pub async fn build(chunks: Vec<Chunk>, provider: &dyn EmbeddingProvider) -> AppResult<Self> {
        if chunks.is_empty() {
            return Err(AppError::Data(
                "Cannot build an index from an empty corpus".to_string(),
            ));
        }

        let start = Instant::now();
        let mut embeddings = Vec::with_capacity(chunks.len());

        for (batch_no, batch) in chunks.chunks(BUILD_BATCH_SIZE).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let batch_embeddings = provider.embed_batch(&texts).await?;

            if batch_embeddings.len() != texts.len() {
                return Err(AppError::Embedding(format!(
                    "Provider returned {} embeddings for {} texts",
                    batch_embeddings.len(),
                    texts.len()
                )));
            }

            embeddings.extend(batch_embeddings);
            tracing::debug!(
                batch = batch_no + 1,
                embedded = embeddings.len(),
                total = chunks.len(),
                "Embedded batch"
            );
        }

        let vectors =
            FlatIndex::from_embeddings(provider.dimensions(), provider.model_name(), embeddings)?;

        tracing::info!(
            chunks = chunks.len(),
            dimension = vectors.dimension(),
            model = vectors.model(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built embedding index"
        );

        Ok(Self {
            vectors,
            chunks,
            built_at: Some(Utc::now()),
        })
    }

    /// Write both artifacts under `dir`.
    ///
    /// Each artifact is written to a `.tmp` sibling, synced, then renamed into
    /// place, so a reader never sees a half-written file under the final name.
    pub fn persist(&self, dir: &Path) -> AppResult<()> {
        std::fs::create_dir_all(dir)?;

        write_staged(&dir.join(CHUNKS_FILE), &serde_json::to_vec(&self.chunks)?)?;
        write_staged(&dir.join(VECTORS_FILE), &self.vectors.to_bytes())?;

        tracing::info!(
            dir = %dir.display(),
            chunks = self.chunks.len(),
            "Persisted embedding index"
        );
        Ok(())
    }

    /// Read both artifacts from `dir` and check them against `provider`.
    ///
    /// Either artifact missing is `NotFound`. Misaligned artifacts, an
    /// unreadable file or a dimension that differs from the provider's is
    /// `Corruption`. A different model id with the same dimension only warns.
    pub fn load(dir: &Path, provider: &dyn EmbeddingProvider) -> AppResult<Self> {
        let vectors_path = dir.join(VECTORS_FILE);
        let chunks_path = dir.join(CHUNKS_FILE);

        for path in [&vectors_path, &chunks_path] {
            if !path.is_file() {
                return Err(AppError::NotFound(format!(
                    "Index artifact not found: {}",
                    path.display()
                )));
            }
        }

        let vectors = FlatIndex::from_bytes(&std::fs::read(&vectors_path)?)?;

        let chunks: Vec<Chunk> = serde_json::from_slice(&std::fs::read(&chunks_path)?)
            .map_err(|e| {
                AppError::Corruption(format!(
                    "Unreadable chunk list {}: {}",
                    chunks_path.display(),
                    e
                ))
            })?;

        if vectors.len() != chunks.len() {
            return Err(AppError::Corruption(format!(
                "Index has {} vectors but {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        if vectors.dimension() != provider.dimensions() {
            return Err(AppError::Corruption(format!(
                "Index dimension {} does not match embedding provider dimension {}",
                vectors.dimension(),
                provider.dimensions()
            )));
        }

        if vectors.model() != provider.model_name() {
            tracing::warn!(
                index_model = vectors.model(),
                provider_model = provider.model_name(),
                "Index was built with a different embedding model"
            );
        }

        let built_at = std::fs::metadata(&vectors_path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);

        tracing::info!(
            dir = %dir.display(),
            chunks = chunks.len(),
            dimension = vectors.dimension(),
            "Loaded embedding index"
        );

        Ok(Self {
            vectors,
            chunks,
            built_at,
        })
    }

    /// Rank chunks against an already-embedded query.
    pub fn search_vector(&self, query: &[f32], top_k: usize) -> AppResult<Vec<RetrievalResult>> {
        let hits = self.vectors.search(query, top_k)?;

        Ok(hits
            .into_iter()
            .filter_map(|(position, score)| {
                self.chunks
                    .get(position)
                    .map(|chunk| RetrievalResult::from_chunk(chunk, score))
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn dimension(&self) -> usize {
        self.vectors.dimension()
    }

    pub fn model(&self) -> &str {
        self.vectors.model()
    }
}

fn write_staged(path: &Path, bytes: &[u8]) -> AppResult<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::Other(format!("Invalid artifact path: {}", path.display())))?;
    let staging = path.with_file_name(format!("{}.tmp", file_name));

    let mut file = std::fs::File::create(&staging)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&staging, path)?;
    Ok(())
}

/// Summary of the serving index.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub loaded: bool,
    pub index_dir: Option<PathBuf>,
    pub chunk_count: usize,
    pub dimension: usize,
    pub model: Option<String>,
    pub built_at: Option<DateTime<Utc>>,
}

/// Read-only search handle shared by every request.
///
/// A store without an index answers every search with no results, so
/// serving keeps working when the corpus has not been indexed yet.
#[derive(Debug)]
pub struct VectorStore {
    provider: Arc<dyn EmbeddingProvider>,
    index: Option<EmbeddingIndex>,
    index_dir: Option<PathBuf>,
}

impl VectorStore {
    /// A store with no index.
    pub fn unloaded(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            index: None,
            index_dir: None,
        }
    }

    /// A store serving an index built in memory.
    pub fn with_index(provider: Arc<dyn EmbeddingProvider>, index: EmbeddingIndex) -> Self {
        Self {
            provider,
            index: Some(index),
            index_dir: None,
        }
    }

    /// Load the index under `dir`.
    ///
    /// A missing index is logged and yields an unloaded store. Corruption is
    /// returned: serving from a damaged index would give wrong answers.
    pub fn open(dir: &Path, provider: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        match EmbeddingIndex::load(dir, provider.as_ref()) {
            Ok(index) => Ok(Self {
                provider,
                index: Some(index),
                index_dir: Some(dir.to_path_buf()),
            }),
            Err(AppError::NotFound(msg)) => {
                tracing::warn!(
                    dir = %dir.display(),
                    "Vector index not found ({}), answers will not be grounded",
                    msg
                );
                Ok(Self {
                    provider,
                    index: None,
                    index_dir: Some(dir.to_path_buf()),
                })
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    /// Top `top_k` chunks for `query`, best first.
    ///
    /// Returns no results when no index is loaded. Embedding failures are
    /// returned as errors.
    pub async fn search(&self, query: &str, top_k: usize) -> AppResult<Vec<RetrievalResult>> {
        let Some(index) = &self.index else {
            tracing::debug!("Search on unloaded index, returning no results");
            return Ok(Vec::new());
        };

        let query_vector = self.provider.embed(query).await?;
        let results = index.search_vector(&query_vector, top_k)?;

        tracing::debug!(
            top_k,
            returned = results.len(),
            top_score = results.first().map(|r| r.score),
            "Searched index"
        );

        Ok(results)
    }

    pub fn stats(&self) -> IndexStats {
        match &self.index {
            Some(index) => IndexStats {
                loaded: true,
                index_dir: self.index_dir.clone(),
                chunk_count: index.len(),
                dimension: index.dimension(),
                model: Some(index.model().to_string()),
                built_at: index.built_at,
            },
            None => IndexStats {
                loaded: false,
                index_dir: self.index_dir.clone(),
                chunk_count: 0,
                dimension: self.provider.dimensions(),
                model: None,
                built_at: None,
            },
        }
    }
}
