//! Retrieval and answering for the Vidya engine.
//!
//! - [`corpus`]: reads the chunk corpus produced by ingestion.
//! - [`embeddings`]: text-to-vector providers.
//! - [`index`] and [`store`]: exact inner-product index, its on-disk
//!   artifacts and the read-only store that serves searches.
//! - [`rag`]: the query pipeline (classify, retrieve and gate, respond).

pub mod corpus;
pub mod embeddings;
pub mod index;
pub mod rag;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use corpus::load_corpus;
pub use embeddings::{create_provider, EmbeddingProvider};
pub use rag::{GateDecision, PipelineResponse, QueryOptions, RagPipeline, SourceSummary};
pub use store::{EmbeddingIndex, IndexStats, VectorStore};
pub use types::{Chunk, RetrievalResult};
