//! Prompt assembly for the answer and translation calls.

use crate::builder::PromptRenderer;
use crate::library::PromptLibrary;
use crate::types::{
    GROUNDED_PROMPT_ID, SYSTEM_PROMPT_ID, TRANSLATE_PROMPT_ID, UNGROUNDED_PROMPT_ID,
};
use std::collections::BTreeMap;
use vidya_core::AppResult;

/// Context used when no retrieved passage has any text.
pub const NO_CONTEXT_PLACEHOLDER: &str =
    "No specific teacher training material was found for this query.";

/// Render retrieved passages as numbered `[Source N]` blocks.
///
/// Numbering follows each passage's position, so a blank passage leaves a
/// gap rather than shifting later numbers. Passages are trimmed and blank
/// ones skipped. Returns [`NO_CONTEXT_PLACEHOLDER`] when nothing remains.
pub fn format_context<I, S>(passages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let blocks: Vec<String> = passages
        .into_iter()
        .enumerate()
        .filter_map(|(i, passage)| {
            let text = passage.as_ref().trim();
            (!text.is_empty()).then(|| format!("[Source {}]\n{}", i + 1, text))
        })
        .collect();

    if blocks.is_empty() {
        NO_CONTEXT_PLACEHOLDER.to_string()
    } else {
        blocks.join("\n\n")
    }
}

/// Builds the final instruction text sent to the generator.
pub struct PromptAssembler {
    renderer: PromptRenderer,
}

impl PromptAssembler {
    /// Compile the prompts in `library`.
    pub fn new(library: &PromptLibrary) -> AppResult<Self> {
        Ok(Self {
            renderer: PromptRenderer::new(library)?,
        })
    }

    /// Assembler over the built-in prompts only.
    pub fn builtin() -> AppResult<Self> {
        Self::new(&PromptLibrary::builtin())
    }

    /// The assistant's system message.
    pub fn system_message(&self) -> AppResult<String> {
        let no_vars: BTreeMap<&str, &str> = BTreeMap::new();
        self.renderer.render(SYSTEM_PROMPT_ID, &no_vars)
    }

    /// Prompt for an answer backed by retrieved context.
    ///
    /// The system message is prepended, separated by a blank line.
    pub fn build_grounded_prompt(&self, query: &str, context: &str) -> AppResult<String> {
        let mut vars = BTreeMap::new();
        vars.insert("query", query.trim());
        vars.insert("context", context);

        let user = self.renderer.render(GROUNDED_PROMPT_ID, &vars)?;
        Ok(format!("{}\n\n{}", self.system_message()?, user))
    }

    /// Prompt for general guidance when retrieval produced nothing trustworthy.
    pub fn build_ungrounded_prompt(&self, query: &str) -> AppResult<String> {
        let mut vars = BTreeMap::new();
        vars.insert("query", query.trim());

        self.renderer.render(UNGROUNDED_PROMPT_ID, &vars)
    }

    /// Prompt asking for a translation of `text` into `language` and nothing else.
    pub fn build_translation_prompt(&self, text: &str, language: &str) -> AppResult<String> {
        let mut vars = BTreeMap::new();
        vars.insert("text", text);
        vars.insert("language", language.trim());

        self.renderer.render(TRANSLATE_PROMPT_ID, &vars)
    }
}
