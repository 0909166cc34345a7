//! OpenAI-compatible chat completions provider.
//!
//! Serves both Groq (the default deployment) and OpenAI, which share the
//! `/chat/completions` wire format and bearer-token authentication.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vidya_core::{AppError, AppResult};

/// Groq's OpenAI-compatible base URL.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// OpenAI base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    /// Providers send `null` content for refusals and tool calls
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Client for OpenAI-compatible chat completion APIs.
pub struct ChatCompletionsClient {
    provider: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    /// Create a client.
    ///
    /// `provider` is only used for identification and log lines.
    pub fn new(
        provider: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            provider: provider.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    fn to_chat_request<'a>(&self, request: &'a LlmRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &request.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    fn convert_response(&self, request: &LlmRequest, response: ChatResponse) -> LlmResponse {
        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        let model = if response.model.is_empty() {
            request.model.clone()
        } else {
            response.model
        };

        LlmResponse {
            content,
            model,
            usage,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for ChatCompletionsClient {
    fn provider_name(&self) -> &str {
        &self.provider
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(
            provider = %self.provider,
            model = %request.model,
            prompt_len = request.prompt.len(),
            "Sending chat completion request"
        );

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.to_chat_request(request))
            .send()
            .await
            .map_err(|e| {
                AppError::Generation(format!("Failed to send request to {}: {}", self.provider, e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Generation(format!(
                "{} API error ({}): {}",
                self.provider, status, error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            AppError::Generation(format!("Failed to parse {} response: {}", self.provider, e))
        })?;

        let converted = self.convert_response(request, chat_response);

        tracing::debug!(
            provider = %self.provider,
            completion_tokens = converted.usage.completion_tokens,
            "Received chat completion"
        );

        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ChatCompletionsClient {
        ChatCompletionsClient::new("groq", GROQ_BASE_URL, "gsk-test", Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_chat_request_includes_system_message() {
        let request = LlmRequest::new("How do I teach fractions?", "qwen/qwen3-32b")
            .with_system("You are a classroom assistant")
            .with_temperature(0.3)
            .with_max_tokens(300);

        let json = serde_json::to_value(client().to_chat_request(&request)).unwrap();

        assert_eq!(json["model"], "qwen/qwen3-32b");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "How do I teach fractions?");
        assert_eq!(json["max_tokens"], 300);
    }

    #[test]
    fn test_chat_request_without_system_message() {
        let request = LlmRequest::new("Hello", "gpt-4o-mini");
        let json = serde_json::to_value(client().to_chat_request(&request)).unwrap();

        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_null_content_becomes_empty_string() {
        let raw = r#"{"model":"qwen/qwen3-32b","choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let request = LlmRequest::new("hi", "qwen/qwen3-32b");

        let response = client().convert_response(&request, parsed);
        assert_eq!(response.content, "");
        assert_eq!(response.usage, LlmUsage::default());
    }

    #[test]
    fn test_response_usage_and_model() {
        let raw = r#"{"choices":[{"message":{"content":"Group work helps."}}],"usage":{"prompt_tokens":40,"completion_tokens":4,"total_tokens":44}}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let request = LlmRequest::new("hi", "qwen/qwen3-32b");

        let response = client().convert_response(&request, parsed);
        assert_eq!(response.content, "Group work helps.");
        assert_eq!(response.model, "qwen/qwen3-32b");
        assert_eq!(response.usage.total_tokens, 44);
    }
}
