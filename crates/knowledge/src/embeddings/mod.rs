//! Embedding providers.
//!
//! Maps passage and query text to fixed-dimension vectors. The provider is
//! chosen by configuration and must stay the same between index build and
//! serving.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};

/// Scale `vector` to unit length in place. A zero vector stays zero.
pub fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Inner product of two equal-length vectors.
///
/// Equals cosine similarity when both are normalized.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
