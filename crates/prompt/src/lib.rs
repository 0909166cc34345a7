//! Prompt system for the Vidya engine.
//!
//! This crate provides:
//! - Built-in prompt definitions with optional YAML overrides
//! - Handlebars template rendering without HTML escaping
//! - Assembly of grounded, ungrounded and translation prompts

pub mod assembler;
pub mod builder;
pub mod library;
pub mod types;

// Re-export main types
pub use assembler::{format_context, PromptAssembler, NO_CONTEXT_PLACEHOLDER};
pub use builder::PromptRenderer;
pub use library::{load_prompt_file, PromptLibrary};
pub use types::PromptDefinition;
