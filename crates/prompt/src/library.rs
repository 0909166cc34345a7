//! Prompt library: built-in definitions plus optional YAML overrides.
//!
//! Override files live in a single directory, one `<id>.yml` per prompt. An
//! override replaces the built-in definition with the same id; ids that the
//! engine never renders are rejected so typos surface at startup.

use crate::types::{
    PromptDefinition, GROUNDED_PROMPT_ID, SYSTEM_PROMPT_ID, TRANSLATE_PROMPT_ID,
    UNGROUNDED_PROMPT_ID,
};
use std::collections::BTreeMap;
use std::path::Path;
use vidya_core::{AppError, AppResult};

const SYSTEM_TEMPLATE: &str = "You are Vidyamitra, a digital Cluster Resource Person (CRP) supporting school teachers. \
Your role is to provide practical, classroom-ready guidance based on teacher training materials. \
Be supportive, clear, and focused on pedagogy and learner understanding. \
Avoid policy or administrative discussions.";

const GROUNDED_TEMPLATE: &str = "Context from teacher training materials:
{{context}}

Teacher's Question:
{{query}}

Instructions:
- Give a direct, practical answer based on the context
- Focus on classroom teaching strategies
- Use simple language teachers can apply immediately
- End your response with a complete sentence.
- If the context is insufficient, say so briefly and provide general pedagogical guidance
- Keep the response concise (4–6 sentences)

Response:";

const UNGROUNDED_TEMPLATE: &str = "You are Vidyamitra, a digital Cluster Resource Person (CRP).

The following question is not directly covered in the available teacher training materials. \
Provide general, responsible pedagogical guidance suitable for school teachers.

Teacher's Question:
{{query}}

Instructions:
- Clearly state that this is general guidance
- Keep the advice classroom-focused
- Avoid policy or administrative discussion
- Keep the response concise (4–6 sentences)

Response:";

const TRANSLATE_TEMPLATE: &str = "You are a professional educational translator.

Translate the following text into {{language}}.

STRICT RULES:
- Output ONLY the translated text
- DO NOT explain words or sentences
- DO NOT include English words
- DO NOT include examples or commentary
- Use simple, natural language suitable for teachers
- Keep the meaning accurate and complete

Text:
{{text}}

Translated text:";

/// The set of prompts the engine renders.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    definitions: BTreeMap<String, PromptDefinition>,
}

impl PromptLibrary {
    /// Library holding only the built-in definitions.
    pub fn builtin() -> Self {
        let definitions = [
            PromptDefinition::builtin(SYSTEM_PROMPT_ID, "System message", SYSTEM_TEMPLATE),
            PromptDefinition::builtin(GROUNDED_PROMPT_ID, "Grounded answer", GROUNDED_TEMPLATE),
            PromptDefinition::builtin(
                UNGROUNDED_PROMPT_ID,
                "General guidance answer",
                UNGROUNDED_TEMPLATE,
            ),
            PromptDefinition::builtin(
                TRANSLATE_PROMPT_ID,
                "Strict translation",
                TRANSLATE_TEMPLATE,
            ),
        ]
        .into_iter()
        .map(|def| (def.id.clone(), def))
        .collect();

        Self { definitions }
    }

    /// Built-in definitions, overlaid with `<id>.yml` files from `dir` when given.
    pub fn load(dir: Option<&Path>) -> AppResult<Self> {
        let mut library = Self::builtin();
        if let Some(dir) = dir {
            let count = library.load_overrides(dir)?;
            tracing::info!(dir = %dir.display(), count, "Loaded prompt overrides");
        }
        Ok(library)
    }

    /// Overlay every `.yml` file in `dir`. Returns how many were applied.
    pub fn load_overrides(&mut self, dir: &Path) -> AppResult<usize> {
        if !dir.is_dir() {
            return Err(AppError::Prompt(format!(
                "Prompt directory not found: {:?}",
                dir
            )));
        }

        let mut applied = 0;
        for entry in walkdir::WalkDir::new(dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("yml") {
                continue;
            }

            let definition = load_prompt_file(path)?;
            if path.file_stem().and_then(|s| s.to_str()) != Some(definition.id.as_str()) {
                tracing::warn!(
                    file = %path.display(),
                    id = %definition.id,
                    "Prompt file name does not match its id"
                );
            }
            self.insert(definition)?;
            applied += 1;
        }

        Ok(applied)
    }

    /// Replace the definition with the same id.
    pub fn insert(&mut self, definition: PromptDefinition) -> AppResult<()> {
        validate_prompt(&definition)?;

        if !self.definitions.contains_key(&definition.id) {
            return Err(AppError::Prompt(format!(
                "Unknown prompt id: {}",
                definition.id
            )));
        }

        tracing::debug!(id = %definition.id, title = %definition.title, "Overriding prompt");
        self.definitions.insert(definition.id.clone(), definition);
        Ok(())
    }

    /// All definitions, ordered by id.
    pub fn definitions(&self) -> impl Iterator<Item = &PromptDefinition> {
        self.definitions.values()
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Parse and validate a single prompt file.
pub fn load_prompt_file(path: &Path) -> AppResult<PromptDefinition> {
    tracing::debug!("Loading prompt from: {:?}", path);

    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e)))?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML {:?}: {}", path, e)))?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.trim().is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.trim().is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(format!(
            "Prompt template cannot be empty: {}",
            def.id
        )));
    }

    let mut parts = def.api_version.split('.');
    let well_formed = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(major), Some(minor), None)
            if !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
    );
    if !well_formed {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, file: &str, id: &str, template: &str) {
        let content = format!(
            "id: {}\ntitle: \"Override\"\napiVersion: \"1.0\"\ncreatedBy: test\ntemplate: \"{}\"\n",
            id, template
        );
        fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn test_builtin_contains_all_prompts() {
        let library = PromptLibrary::builtin();
        for id in [
            SYSTEM_PROMPT_ID,
            GROUNDED_PROMPT_ID,
            UNGROUNDED_PROMPT_ID,
            TRANSLATE_PROMPT_ID,
        ] {
            assert!(library.definitions().any(|d| d.id == id), "missing {}", id);
        }
        assert_eq!(library.definitions().count(), 4);
    }

    #[test]
    fn test_builtin_templates_pass_validation() {
        for def in PromptLibrary::builtin().definitions() {
            validate_prompt(def).unwrap();
        }
    }

    #[test]
    fn test_override_replaces_builtin() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "rag.ungrounded.yml", "rag.ungrounded", "Q: {{query}}");

        let library = PromptLibrary::load(Some(temp_dir.path())).unwrap();
        let by_id = |id: &str| library.definitions().find(|d| d.id == id).unwrap();
        assert_eq!(by_id(UNGROUNDED_PROMPT_ID).template, "Q: {{query}}");
        assert_ne!(by_id(UNGROUNDED_PROMPT_ID).created_by, "builtin");
        assert_eq!(by_id(GROUNDED_PROMPT_ID).created_by, "builtin");
    }

    #[test]
    fn test_non_yaml_files_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "not a prompt").unwrap();

        let mut library = PromptLibrary::builtin();
        assert_eq!(library.load_overrides(temp_dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_unknown_id_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "rag.summary.yml", "rag.summary", "{{query}}");

        match PromptLibrary::load(Some(temp_dir.path())) {
            Err(AppError::Prompt(msg)) => assert!(msg.contains("Unknown prompt id")),
            other => panic!("Expected prompt error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("translate.yml"), "invalid: yaml: content:").unwrap();

        assert!(matches!(
            PromptLibrary::load(Some(temp_dir.path())),
            Err(AppError::Prompt(_))
        ));
    }

    #[test]
    fn test_missing_directory_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("prompts");
        assert!(PromptLibrary::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_api_version_validation() {
        let mut def = PromptDefinition::builtin(TRANSLATE_PROMPT_ID, "T", "{{text}}");
        for bad in ["1", "1.", ".1", "1.0.0", "v1.0", ""] {
            def.api_version = bad.to_string();
            assert!(validate_prompt(&def).is_err(), "accepted {:?}", bad);
        }
        def.api_version = "2.13".to_string();
        assert!(validate_prompt(&def).is_ok());
    }

    #[test]
    fn test_blank_template_rejected() {
        let mut library = PromptLibrary::builtin();
        let def = PromptDefinition::builtin(GROUNDED_PROMPT_ID, "Grounded", "   ");
        assert!(library.insert(def).is_err());
    }
}
