//! Command handlers for the Vidya CLI.

pub mod ask;
pub mod index;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use index::IndexCommand;
