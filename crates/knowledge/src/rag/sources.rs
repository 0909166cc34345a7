//! Source summaries attached to answers.

use crate::rag::types::SourceSummary;
use crate::types::RetrievalResult;
use unicode_segmentation::UnicodeSegmentation;

/// Characters of passage text kept in a summary.
pub const SOURCE_PREVIEW_CHARS: usize = 200;

/// Summarize retrieved passages for display, preserving order.
pub fn summarize(results: &[RetrievalResult]) -> Vec<SourceSummary> {
    results
        .iter()
        .map(|result| SourceSummary {
            text: preview(&result.text, SOURCE_PREVIEW_CHARS),
            metadata: result.metadata.clone(),
            score: result.score,
        })
        .collect()
}

/// First `max_chars` user-perceived characters of `text`, followed by `...`.
///
/// The ellipsis is always appended. Counting graphemes keeps Indic
/// conjuncts and combining marks intact.
pub fn preview(text: &str, max_chars: usize) -> String {
    let head: String = text.graphemes(true).take(max_chars).collect();
    format!("{}...", head)
}
