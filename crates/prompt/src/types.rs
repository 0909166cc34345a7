//! Prompt types for the Vidya engine.

use serde::{Deserialize, Serialize};

/// Identifier of the system message prepended to grounded prompts.
pub const SYSTEM_PROMPT_ID: &str = "rag.system";

/// Identifier of the prompt used when retrieved context passed the gate.
pub const GROUNDED_PROMPT_ID: &str = "rag.grounded";

/// Identifier of the prompt used when no trustworthy context was found.
pub const UNGROUNDED_PROMPT_ID: &str = "rag.ungrounded";

/// Identifier of the translation prompt.
pub const TRANSLATE_PROMPT_ID: &str = "translate";

/// A prompt definition, either built in or loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Template string with Handlebars syntax
    pub template: String,
}

impl PromptDefinition {
    /// Create a definition shipped with the binary.
    pub fn builtin(id: &str, title: &str, template: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            api_version: "1.0".to_string(),
            created_by: "builtin".to_string(),
            template: template.to_string(),
        }
    }
}
