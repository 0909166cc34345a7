//! Text generation and translation on top of an `LlmClient`.
//!
//! `TextGenerator` is the seam the retrieval pipeline depends on. The
//! production implementation, `LlmGenerator`, adds the assistant persona,
//! output cleanup and the short-answer safety fallback to raw completions.

use crate::cleanup::ResponseCleaner;
use crate::client::{LlmClient, LlmRequest};
use std::sync::Arc;
use vidya_core::config::{GenerationConfig, GenerationParams};
use vidya_core::AppResult;
use vidya_prompt::PromptAssembler;

/// System persona for answer generation.
pub const ASSISTANT_PERSONA: &str = "You are Vidyamitra, a digital Cluster Resource Person (CRP). \
Give clear, practical, classroom-ready guidance to teachers.";

/// System persona for translation.
pub const TRANSLATOR_PERSONA: &str =
    "You are a strict translation engine. Do not add explanations.";

/// Returned in place of a generated answer that is empty or too short after cleanup.
pub const SAFETY_FALLBACK: &str = "To address this in class, use simple examples, hands-on activities, \
and regular student interaction to reinforce understanding.";

/// Language answers are generated in.
pub const BASE_LANGUAGE: &str = "English";

/// Whether `language` names the base language (case-insensitive, whitespace ignored).
pub fn is_base_language(language: &str) -> bool {
    language.trim().eq_ignore_ascii_case(BASE_LANGUAGE)
}

/// Produces answer text and translations.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate an answer for `prompt`.
    ///
    /// Never returns empty text: a degenerate completion is replaced by
    /// [`SAFETY_FALLBACK`]. Provider failures are `AppError::Generation`.
    async fn generate(&self, prompt: &str, params: GenerationParams) -> AppResult<String>;

    /// Translate `text` into `target_language`.
    ///
    /// The base language is an identity. There is no safety fallback, so a
    /// short source may legitimately produce a short translation.
    async fn translate(&self, text: &str, target_language: &str) -> AppResult<String>;
}

/// `TextGenerator` backed by a chat/completion provider.
pub struct LlmGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    prompts: Arc<PromptAssembler>,
    cleaner: ResponseCleaner,
    min_answer_chars: usize,
    translation: GenerationParams,
}

impl LlmGenerator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompts: Arc<PromptAssembler>,
        config: &GenerationConfig,
    ) -> AppResult<Self> {
        Ok(Self {
            client,
            model: model.into(),
            prompts,
            cleaner: ResponseCleaner::new()?,
            min_answer_chars: config.min_answer_chars,
            translation: config.translation,
        })
    }

    /// Provider serving this generator.
    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    fn is_degenerate(&self, answer: &str) -> bool {
        answer.is_empty() || answer.chars().count() < self.min_answer_chars
    }
}

#[async_trait::async_trait]
impl TextGenerator for LlmGenerator {
    async fn generate(&self, prompt: &str, params: GenerationParams) -> AppResult<String> {
        let request = LlmRequest::new(prompt, &self.model)
            .with_system(ASSISTANT_PERSONA)
            .with_temperature(params.temperature)
            .with_max_tokens(params.max_tokens);

        let response = self.client.complete(&request).await?;
        let cleaned = self.cleaner.clean(&response.content);

        if self.is_degenerate(&cleaned) {
            tracing::warn!(
                provider = self.client.provider_name(),
                raw_len = response.content.len(),
                cleaned_len = cleaned.len(),
                "Generated answer too short after cleanup, using safety fallback"
            );
            return Ok(SAFETY_FALLBACK.to_string());
        }

        tracing::debug!(
            completion_tokens = response.usage.completion_tokens,
            answer_len = cleaned.len(),
            "Generated answer"
        );
        Ok(cleaned)
    }

    async fn translate(&self, text: &str, target_language: &str) -> AppResult<String> {
        if is_base_language(target_language) {
            return Ok(text.to_string());
        }

        let prompt = self.prompts.build_translation_prompt(text, target_language)?;
        let request = LlmRequest::new(prompt, &self.model)
            .with_system(TRANSLATOR_PERSONA)
            .with_temperature(self.translation.temperature)
            .with_max_tokens(self.translation.max_tokens);

        tracing::debug!(language = target_language.trim(), "Translating answer");

        let response = self.client.complete(&request).await?;
        Ok(self.cleaner.clean(&response.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{LlmResponse, LlmUsage};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use vidya_core::AppError;

    /// Replays canned completions and records every request.
    struct ScriptedClient {
        replies: Mutex<VecDeque<Result<String, String>>>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string).map_err(str::to_string))
                        .collect(),
                ),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<LlmRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for ScriptedClient {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.requests.lock().unwrap().push(request.clone());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("no scripted reply left".to_string()));

            match reply {
                Ok(content) => Ok(LlmResponse {
                    content,
                    model: request.model.clone(),
                    usage: LlmUsage::new(10, 5),
                }),
                Err(msg) => Err(AppError::Generation(msg)),
            }
        }
    }

    fn generator(client: Arc<ScriptedClient>) -> LlmGenerator {
        LlmGenerator::new(
            client,
            "qwen/qwen3-32b",
            Arc::new(PromptAssembler::builtin().unwrap()),
            &GenerationConfig::default(),
        )
        .unwrap()
    }

    const GROUNDED: GenerationParams = GenerationParams {
        temperature: 0.3,
        max_tokens: 300,
    };

    #[tokio::test]
    async fn test_generate_sends_persona_and_params() {
        let client = ScriptedClient::new(vec![Ok("Use number lines to show fractions visually.")]);
        let answer = generator(client.clone())
            .generate("How do I teach fractions?", GROUNDED)
            .await
            .unwrap();

        assert_eq!(answer, "Use number lines to show fractions visually.");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system.as_deref(), Some(ASSISTANT_PERSONA));
        assert_eq!(requests[0].temperature, Some(0.3));
        assert_eq!(requests[0].max_tokens, Some(300));
        assert_eq!(requests[0].model, "qwen/qwen3-32b");
    }

    #[tokio::test]
    async fn test_generate_cleans_reasoning() {
        let client = ScriptedClient::new(vec![Ok(
            "<think>The teacher wants group ideas.</think>\nTry think-pair-share before whole-class discussion.",
        )]);
        let answer = generator(client).generate("q", GROUNDED).await.unwrap();
        assert_eq!(answer, "Try think-pair-share before whole-class discussion.");
    }

    #[tokio::test]
    async fn test_generate_empty_completion_uses_fallback() {
        let client = ScriptedClient::new(vec![Ok("")]);
        let answer = generator(client).generate("q", GROUNDED).await.unwrap();
        assert_eq!(answer, SAFETY_FALLBACK);
    }

    #[tokio::test]
    async fn test_generate_only_reasoning_uses_fallback() {
        let client = ScriptedClient::new(vec![Ok("<think>long private plan</think>")]);
        let answer = generator(client).generate("q", GROUNDED).await.unwrap();
        assert_eq!(answer, SAFETY_FALLBACK);
    }

    #[tokio::test]
    async fn test_generate_short_answer_uses_fallback() {
        // 19 characters
        let client = ScriptedClient::new(vec![Ok("Use group work now.")]);
        let answer = generator(client).generate("q", GROUNDED).await.unwrap();
        assert_eq!(answer, SAFETY_FALLBACK);
    }

    #[tokio::test]
    async fn test_generate_exact_minimum_is_kept() {
        // 20 characters
        let client = ScriptedClient::new(vec![Ok("Use group work daily")]);
        let answer = generator(client).generate("q", GROUNDED).await.unwrap();
        assert_eq!(answer, "Use group work daily");
    }

    #[tokio::test]
    async fn test_generate_provider_error_propagates() {
        let client = ScriptedClient::new(vec![Err("groq API error (503)")]);
        let result = generator(client).generate("q", GROUNDED).await;
        assert!(matches!(result, Err(AppError::Generation(_))));
    }

    #[tokio::test]
    async fn test_translate_base_language_is_identity() {
        let client = ScriptedClient::new(vec![]);
        let generator = generator(client.clone());

        for language in ["English", "english", "  ENGLISH "] {
            let text = generator.translate("Use group work.", language).await.unwrap();
            assert_eq!(text, "Use group work.");
        }
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_translate_sends_strict_prompt() {
        let client = ScriptedClient::new(vec![Ok("समूह कार्य का उपयोग करें।")]);
        let text = generator(client.clone())
            .translate("Use group work.", "Hindi")
            .await
            .unwrap();

        assert_eq!(text, "समूह कार्य का उपयोग करें।");

        let requests = client.requests();
        assert_eq!(requests[0].system.as_deref(), Some(TRANSLATOR_PERSONA));
        assert_eq!(requests[0].temperature, Some(0.1));
        assert_eq!(requests[0].max_tokens, Some(500));
        assert!(requests[0].prompt.contains("into Hindi."));
        assert!(requests[0].prompt.contains("Text:\nUse group work."));
    }

    #[tokio::test]
    async fn test_translate_short_output_has_no_fallback() {
        // Unlike generate, a short translation is returned as is
        let client = ScriptedClient::new(vec![Ok("ಹೌದು")]);
        let text = generator(client).translate("Yes", "Kannada").await.unwrap();
        assert_eq!(text, "ಹೌದು");
    }

    #[tokio::test]
    async fn test_translate_cleans_output() {
        let client = ScriptedClient::new(vec![Ok(
            "<think>translate carefully</think>\nTranslated text:\nಗುಂಪು ಕೆಲಸವನ್ನು ಬಳಸಿ.",
        )]);
        let text = generator(client)
            .translate("Use group work.", "Kannada")
            .await
            .unwrap();
        assert_eq!(text, "ಗುಂಪು ಕೆಲಸವನ್ನು ಬಳಸಿ.");
    }

    #[tokio::test]
    async fn test_translate_error_propagates() {
        let client = ScriptedClient::new(vec![Err("timeout")]);
        let result = generator(client).translate("Use group work.", "Hindi").await;
        assert!(matches!(result, Err(AppError::Generation(_))));
    }

    #[test]
    fn test_is_base_language() {
        assert!(is_base_language("English"));
        assert!(is_base_language(" english\n"));
        assert!(!is_base_language("Hindi"));
        assert!(!is_base_language("en"));
    }
}
