//! Template rendering.

use crate::library::PromptLibrary;
use handlebars::Handlebars;
use serde::Serialize;
use vidya_core::{AppError, AppResult};

/// Renders library prompts by id.
///
/// Every template is compiled once at construction, so a malformed override
/// fails at startup rather than on the first query that needs it.
pub struct PromptRenderer {
    registry: Handlebars<'static>,
}

impl PromptRenderer {
    /// Compile every definition in `library`.
    pub fn new(library: &PromptLibrary) -> AppResult<Self> {
        let mut registry = plain_text_registry();

        for definition in library.definitions() {
            registry
                .register_template_string(&definition.id, &definition.template)
                .map_err(|e| {
                    AppError::Prompt(format!(
                        "Failed to register template {}: {}",
                        definition.id, e
                    ))
                })?;
        }

        Ok(Self { registry })
    }

    /// Render the prompt `id` with `variables`.
    pub fn render<T: Serialize>(&self, id: &str, variables: &T) -> AppResult<String> {
        if !self.registry.has_template(id) {
            return Err(AppError::Prompt(format!("Unknown prompt id: {}", id)));
        }

        self.registry
            .render(id, variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template {}: {}", id, e)))
    }
}

fn plain_text_registry() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    // Prompts are plain text; queries routinely contain quotes and ampersands
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
}
