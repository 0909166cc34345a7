//! Retrieval-augmented answering.
//!
//! A query is classified first. Casual small talk gets a fixed greeting.
//! Everything else is retrieved against the embedding index and gated on the
//! top score, which picks the grounded or ungrounded prompt. The generated
//! answer is then translated into the requested language.

pub mod classify;
pub mod gate;
pub mod pipeline;
pub mod sources;
pub mod types;

pub use classify::{classify, QueryKind, GREETING};
pub use gate::{GateDecision, GateReason};
pub use pipeline::RagPipeline;
pub use types::{PipelineResponse, QueryOptions, SourceSummary};
