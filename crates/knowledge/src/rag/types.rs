//! Request and response types for the answering pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vidya_llm::generator::BASE_LANGUAGE;

/// Per-query options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    /// Language of the final answer
    pub language: String,

    /// Attach source summaries to the response
    pub return_sources: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            language: BASE_LANGUAGE.to_string(),
            return_sources: false,
        }
    }
}

impl QueryOptions {
    pub fn in_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }

    pub fn with_sources(mut self, return_sources: bool) -> Self {
        self.return_sources = return_sources;
        self
    }
}

/// A retrieved passage as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    /// Passage text, truncated
    pub text: String,
    pub metadata: BTreeMap<String, String>,
    /// Raw similarity score
    pub score: f32,
}

/// Answer to one query.
///
/// `sources` is `None` when sources were not requested (and for casual
/// queries), and an empty list when they were requested but retrieval did
/// not pass the confidence gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResponse {
    pub answer: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceSummary>>,
}

impl PipelineResponse {
    pub fn answer_only(answer: String) -> Self {
        Self {
            answer,
            sources: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = QueryOptions::default();
        assert_eq!(options.language, "English");
        assert!(!options.return_sources);

        let hindi = QueryOptions::in_language("Hindi").with_sources(true);
        assert_eq!(hindi.language, "Hindi");
        assert!(hindi.return_sources);
    }

    #[test]
    fn test_response_json_omits_missing_sources() {
        let response = PipelineResponse::answer_only("Use group work.".to_string());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({ "answer": "Use group work." }));

        let with_empty = PipelineResponse {
            answer: "General guidance.".to_string(),
            sources: Some(Vec::new()),
        };
        let json = serde_json::to_value(&with_empty).unwrap();
        assert_eq!(json["sources"], serde_json::json!([]));
    }
}
