//! Error types for the Vidya engine.
//!
//! A single error enum covers every failure category in the workspace:
//! missing or inconsistent index artifacts, empty corpora, embedding and
//! generation provider failures, configuration, prompt and I/O errors.

use thiserror::Error;

/// Unified error type for the Vidya engine.
///
/// All fallible functions return `Result<T, AppError>`.
/// The safety fallback for degenerate answers is not an error and never
/// produces one of these variants.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required artifact (index, chunk list, corpus) is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// An artifact exists but is inconsistent or unreadable
    #[error("Corrupt index: {0}")]
    Corruption(String),

    /// Input data is unusable (e.g. an empty corpus)
    #[error("Data error: {0}")]
    Data(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// External text-generation service errors (transport, API, timeout)
    #[error("Generation error: {0}")]
    Generation(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
