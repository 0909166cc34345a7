//! In-test fakes for the embedding and generation seams.

use crate::embeddings::EmbeddingProvider;
use std::sync::Mutex;
use vidya_core::config::GenerationParams;
use vidya_core::{AppError, AppResult};
use vidya_llm::{is_base_language, TextGenerator};

/// Embeds text as keyword counts, one axis per vocabulary word.
#[derive(Debug)]
pub struct KeywordProvider {
    vocabulary: Vec<&'static str>,
}

impl KeywordProvider {
    pub fn new(vocabulary: Vec<&'static str>) -> Self {
        Self { vocabulary }
    }

    pub fn classroom() -> Self {
        Self::new(vec![
            "phonics", "readers", "group", "work", "peer", "tutoring", "fractions", "folding",
            "struggling", "learners", "student",
        ])
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        self.vocabulary
            .iter()
            .map(|term| words.iter().filter(|w| *w == term).count() as f32)
            .collect()
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for KeywordProvider {
    fn provider_name(&self) -> &str {
        "keyword"
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

/// Returns fixed vectors for exact texts and a default vector otherwise.
#[derive(Debug)]
pub struct FixedProvider {
    dimensions: usize,
    vectors: Vec<(&'static str, Vec<f32>)>,
    fallback: Vec<f32>,
}

impl FixedProvider {
    pub fn new(vectors: Vec<(&'static str, Vec<f32>)>, fallback: Vec<f32>) -> Self {
        Self {
            dimensions: fallback.len(),
            vectors,
            fallback,
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FixedProvider {
    fn provider_name(&self) -> &str {
        "fixed"
    }

    fn model_name(&self) -> &str {
        "fixed-test"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                self.vectors
                    .iter()
                    .find(|(t, _)| *t == text.as_str())
                    .map(|(_, v)| v.clone())
                    .unwrap_or_else(|| self.fallback.clone())
            })
            .collect())
    }
}

/// Every call fails, as an unreachable embedding server would.
#[derive(Debug)]
pub struct FailingProvider {
    dimensions: usize,
}

impl FailingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FailingProvider {
    fn provider_name(&self) -> &str {
        "failing"
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Err(AppError::Embedding("embedding server unreachable".to_string()))
    }
}

/// A recorded `TextGenerator` call.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorCall {
    Generate {
        prompt: String,
        params: GenerationParams,
    },
    Translate {
        text: String,
        language: String,
    },
}

/// Answers every prompt with a fixed text and records the calls.
///
/// Translation into a non-base language prefixes the text with the language
/// in brackets.
pub struct ScriptedGenerator {
    answer: String,
    fail_generate: bool,
    fail_translate: bool,
    calls: Mutex<Vec<GeneratorCall>>,
}

impl ScriptedGenerator {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            fail_generate: false,
            fail_translate: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_generate() -> Self {
        Self {
            fail_generate: true,
            ..Self::answering("")
        }
    }

    pub fn failing_translate(answer: &str) -> Self {
        Self {
            fail_translate: true,
            ..Self::answering(answer)
        }
    }

    pub fn calls(&self) -> Vec<GeneratorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn generate_prompts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GeneratorCall::Generate { prompt, .. } => Some(prompt),
                GeneratorCall::Translate { .. } => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, params: GenerationParams) -> AppResult<String> {
        self.calls.lock().unwrap().push(GeneratorCall::Generate {
            prompt: prompt.to_string(),
            params,
        });

        if self.fail_generate {
            return Err(AppError::Generation("groq API error (503)".to_string()));
        }
        Ok(self.answer.clone())
    }

    async fn translate(&self, text: &str, target_language: &str) -> AppResult<String> {
        self.calls.lock().unwrap().push(GeneratorCall::Translate {
            text: text.to_string(),
            language: target_language.to_string(),
        });

        if is_base_language(target_language) {
            return Ok(text.to_string());
        }
        if self.fail_translate {
            return Err(AppError::Generation("translation timed out".to_string()));
        }
        Ok(format!("[{}] {}", target_language.trim(), text))
    }
}
