//! LLM provider factory.
//!
//! Resolves a provider name to a concrete `LlmClient`, injecting the endpoint,
//! API key and request timeout.

use crate::client::LlmClient;
use crate::providers::chat_completions::{GROQ_BASE_URL, OPENAI_BASE_URL};
use crate::providers::ollama::DEFAULT_OLLAMA_URL;
use crate::providers::{ChatCompletionsClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;
use vidya_core::{AppError, AppResult};

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "groq", "openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key for providers that require one
/// * `timeout` - Per-request timeout; an elapsed timeout is a generation error
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required API
/// key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    let api_key = api_key.filter(|key| !key.trim().is_empty());
    if provider_type.requires_api_key() && api_key.is_none() {
        return Err(AppError::Config(format!(
            "{} provider requires API key",
            provider_type.as_str()
        )));
    }

    tracing::debug!(
        provider = provider_type.as_str(),
        endpoint = endpoint.unwrap_or("<default>"),
        timeout_secs = timeout.as_secs(),
        "Creating LLM client"
    );

    match provider_type {
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or(DEFAULT_OLLAMA_URL);
            Ok(Arc::new(OllamaClient::new(base_url, timeout)?))
        }
        ProviderType::Groq | ProviderType::OpenAI => {
            let default_url = if provider_type == ProviderType::Groq {
                GROQ_BASE_URL
            } else {
                OPENAI_BASE_URL
            };
            let client = ChatCompletionsClient::new(
                provider_type.as_str(),
                endpoint.unwrap_or(default_url),
                api_key.unwrap_or_default(),
                timeout,
            )?;
            Ok(Arc::new(client))
        }
    }
}
