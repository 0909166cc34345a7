//! Exact inner-product vector index and its binary encoding.
//!
//! Vectors are stored row-major in one contiguous buffer. Every stored row
//! is L2-normalized, so the inner product with a normalized query is the
//! cosine similarity.
//!
//! Binary layout (all integers little-endian):
//!
//! ```text
//! magic      4 bytes  "VDXV"
//! version    u32      1
//! dimension  u32
//! count      u64
//! model_len  u32
//! model      model_len bytes of UTF-8
//! vectors    count * dimension f32
//! ```

use crate::embeddings::{dot, normalize};
use vidya_core::{AppError, AppResult};

const MAGIC: &[u8; 4] = b"VDXV";
const FORMAT_VERSION: u32 = 1;

/// Flat (brute-force) index over normalized vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    model: String,
    vectors: Vec<f32>,
}

impl FlatIndex {
    /// Build an index from raw embeddings, normalizing each one.
    ///
    /// Every embedding must have `dimension` components.
    pub fn from_embeddings(
        dimension: usize,
        model: impl Into<String>,
        embeddings: Vec<Vec<f32>>,
    ) -> AppResult<Self> {
        let mut vectors = Vec::with_capacity(embeddings.len() * dimension);

        for (i, mut embedding) in embeddings.into_iter().enumerate() {
            if embedding.len() != dimension {
                return Err(AppError::Embedding(format!(
                    "Embedding {} has {} dimensions, expected {}",
                    i,
                    embedding.len(),
                    dimension
                )));
            }
            normalize(&mut embedding);
            vectors.extend_from_slice(&embedding);
        }

        Ok(Self {
            dimension,
            model: model.into(),
            vectors,
        })
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.vectors.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embedding model the vectors were produced with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The stored (normalized) vector at `position`.
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimension)?;
        self.vectors.get(start..start + self.dimension)
    }

    /// Score every stored vector against `query` and keep the best `top_k`.
    ///
    /// Returns `(position, score)` pairs by descending score. Equal scores
    /// keep position order. The query is normalized here.
    pub fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(AppError::Embedding(format!(
                "Query has {} dimensions, index has {}",
                query.len(),
                self.dimension
            )));
        }
        if top_k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = query.to_vec();
        normalize(&mut query);

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dimension)
            .map(|row| dot(row, &query))
            .enumerate()
            .collect();

        // Stable: ties stay in position order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        Ok(scored)
    }

    /// Encode to the binary layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let model = self.model.as_bytes();
        let mut bytes = Vec::with_capacity(24 + model.len() + self.vectors.len() * 4);

        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&(model.len() as u32).to_le_bytes());
        bytes.extend_from_slice(model);
        for value in &self.vectors {
            bytes.extend_from_slice(&value.to_le_bytes());
        }

        bytes
    }

    /// Decode the binary layout.
    ///
    /// Any deviation (bad magic, unknown version, truncation, trailing bytes)
    /// is `AppError::Corruption`.
    pub fn from_bytes(bytes: &[u8]) -> AppResult<Self> {
        let mut reader = ByteReader::new(bytes);

        if reader.take(4)? != MAGIC {
            return Err(AppError::Corruption("Bad vector file magic".to_string()));
        }

        let version = reader.read_u32()?;
        if version != FORMAT_VERSION {
            return Err(AppError::Corruption(format!(
                "Unsupported vector file version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }

        let dimension = reader.read_u32()? as usize;
        let count = reader.read_u64()?;

        let model_len = reader.read_u32()? as usize;
        let model = std::str::from_utf8(reader.take(model_len)?)
            .map_err(|e| AppError::Corruption(format!("Model id is not UTF-8: {}", e)))?
            .to_string();

        if dimension == 0 && count > 0 {
            return Err(AppError::Corruption(
                "Vector file declares zero dimensions".to_string(),
            ));
        }

        let expected = usize::try_from(count)
            .ok()
            .and_then(|count| count.checked_mul(dimension))
            .and_then(|values| values.checked_mul(4))
            .ok_or_else(|| AppError::Corruption(format!("Vector count {} too large", count)))?;

        let payload = reader.rest();
        if payload.len() != expected {
            return Err(AppError::Corruption(format!(
                "Vector payload is {} bytes, expected {} for {} x {}",
                payload.len(),
                expected,
                count,
                dimension
            )));
        }

        let vectors = payload
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        Ok(Self {
            dimension,
            model,
            vectors,
        })
    }
}

/// Bounds-checked cursor over a byte slice.
struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, n: usize) -> AppResult<&'a [u8]> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| {
                AppError::Corruption(format!(
                    "Vector file truncated at byte {} (needed {} more)",
                    self.offset, n
                ))
            })?;

        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> AppResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&mut self) -> AppResult<u64> {
        let b = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_le_bytes(buf))
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.bytes[self.offset..];
        self.offset = self.bytes.len();
        rest
    }
}
