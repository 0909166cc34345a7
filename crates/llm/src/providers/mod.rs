//! Concrete `LlmClient` adapters.

pub mod chat_completions;
pub mod ollama;

pub use chat_completions::ChatCompletionsClient;
pub use ollama::OllamaClient;
