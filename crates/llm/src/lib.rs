//! Generative model integration for the Vidya engine.
//!
//! Two layers:
//! - `LlmClient`: one adapter per provider (Ollama, Groq, OpenAI), speaking a
//!   common request/response shape.
//! - `TextGenerator`: answer generation and translation with the assistant
//!   persona, output cleanup and the safety fallback.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use vidya_core::config::GenerationConfig;
//! use vidya_llm::{create_client, LlmGenerator, TextGenerator};
//! use vidya_prompt::PromptAssembler;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_client("ollama", None, None, Duration::from_secs(60))?;
//! let prompts = Arc::new(PromptAssembler::builtin()?);
//! let config = GenerationConfig::default();
//! let generator = LlmGenerator::new(client, "llama3.2", prompts, &config)?;
//!
//! let answer = generator.generate("How do I teach fractions?", config.ungrounded).await?;
//! println!("{}", generator.translate(&answer, "Hindi").await?);
//! # Ok(())
//! # }
//! ```

pub mod cleanup;
pub mod client;
pub mod factory;
pub mod generator;
pub mod providers;
pub mod types;

// Re-export main types
pub use cleanup::ResponseCleaner;
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use generator::{is_base_language, LlmGenerator, TextGenerator, SAFETY_FALLBACK};
pub use providers::{ChatCompletionsClient, OllamaClient};
pub use types::ProviderType;
pub use vidya_core::config::GenerationParams;
