//! Deterministic post-processing of raw model output.
//!
//! Reasoning models emit `<think>` … `</think>` blocks and occasionally narrate
//! their own plan ("Okay, let me translate this...") or echo the prompt's
//! instruction headers. None of that belongs in an answer shown to a teacher.

use regex::{Regex, RegexSet};
use vidya_core::{AppError, AppResult};

/// Line-level meta-commentary, matched against each trimmed line.
const META_LINE_PATTERNS: [&str; 7] = [
    // Self-referential planning openers
    r"(?i)^(?:okay|ok|alright|so|hmm)[,.!]?\s+(?:let me|let's|i need to|i should|i will|i'll|the user)\b",
    r"(?i)^(?:let me|i need to|i should|i will|i'll|i must)\s+(?:think|figure out|translate|draft|structure|recall)\b",
    r"(?i)^(?:let me|i need to|i should|i will|i'll|i must)\s+(?:start|begin|check|consider|make sure)\b.*\b(?:the|my) (?:answer|response|translation|question|context|prompt)\b",
    r"(?i)^(?:the user|the teacher)\s+(?:is asking|wants|asked|has asked|is looking)\b",
    // Restated prompt headers on a line of their own
    r"(?i)^(?:instructions|strict rules|rules|response|answer|translated text|translation|text)\s*:\s*$",
    r"(?i)^(?:here is|here's)\s+(?:the|my)\s+(?:translation|translated text|answer|response)\b.*:\s*$",
    // Instruction bullets echoed verbatim from the prompts
    r"^(?:[-*]\s*)?(?:Keep the response concise \(|Output ONLY the translated text|DO NOT (?:explain words or sentences|include English words|include examples or commentary)|End your response with a complete sentence\.)",
];

/// Strips reasoning blocks and meta-commentary from model output.
#[derive(Debug, Clone)]
pub struct ResponseCleaner {
    reasoning_block: Regex,
    orphan_close: Regex,
    unterminated_open: Regex,
    excess_blank_lines: Regex,
    meta_lines: RegexSet,
}

impl ResponseCleaner {
    /// Compile the cleanup patterns.
    pub fn new() -> AppResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| AppError::Other(format!("Invalid cleanup pattern: {}", e)))
        };

        Ok(Self {
            reasoning_block: compile(r"(?s)<think>.*?</think>")?,
            orphan_close: compile(r"(?s)^.*?</think>")?,
            unterminated_open: compile(r"(?s)<think>.*$")?,
            excess_blank_lines: compile(r"\n{3,}")?,
            meta_lines: RegexSet::new(META_LINE_PATTERNS)
                .map_err(|e| AppError::Other(format!("Invalid cleanup pattern: {}", e)))?,
        })
    }

    /// Clean raw model output.
    ///
    /// Removes complete `<think>` blocks, anything before a stray `</think>`,
    /// anything after an unterminated `<think>`, and lines of meta-commentary.
    /// The result is trimmed and may be empty.
    pub fn clean(&self, raw: &str) -> String {
        let text = self.reasoning_block.replace_all(raw, "");
        let text = self.orphan_close.replace(&text, "");
        let text = self.unterminated_open.replace(&text, "");

        let kept: Vec<&str> = text
            .lines()
            .filter(|line| !self.meta_lines.is_match(line.trim()))
            .collect();
        let joined = kept.join("\n");

        self.excess_blank_lines
            .replace_all(joined.trim(), "\n\n")
            .into_owned()
    }
}
