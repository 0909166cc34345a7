//! Casual-query detection.

use serde::Serialize;

/// Small talk that skips retrieval and generation.
pub const CASUAL_PHRASES: [&str; 8] = [
    "hi",
    "hello",
    "hey",
    "how are you",
    "good morning",
    "good evening",
    "thanks",
    "thank you",
];

/// Queries with at most this many words are treated as casual.
pub const MAX_CASUAL_WORDS: usize = 2;

/// Fixed reply to casual queries.
pub const GREETING: &str = "Hello! I am Vidyamitra. I can help you with classroom teaching, \
student learning challenges, and practical teaching strategies. Please ask your question.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Casual,
    Substantive,
}

/// Classify a raw user query.
///
/// The query is trimmed and lowercased, then casual if it is one of
/// [`CASUAL_PHRASES`] or has at most [`MAX_CASUAL_WORDS`] words.
pub fn classify(query: &str) -> QueryKind {
    let normalized = query.trim().to_lowercase();

    if CASUAL_PHRASES.contains(&normalized.as_str())
        || normalized.split_whitespace().count() <= MAX_CASUAL_WORDS
    {
        QueryKind::Casual
    } else {
        QueryKind::Substantive
    }
}
