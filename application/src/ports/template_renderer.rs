//! Template rendering port
//!
//! Defines the interface for turning a named prompt template plus a
//! context mapping into prompt text. Template bodies are an adapter
//! concern; the application layer only knows names (via
//! [`Panelist::template_name()`](panel_domain::Panelist::template_name))
//! and context keys.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during template rendering
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("missing variable `{variable}` for template `{template}`")]
    MissingVariable { template: String, variable: String },

    #[error("template render failed: {0}")]
    Render(String),
}

/// Context mapping passed to a template
///
/// A thin builder over a JSON object; values are serialized on insert so
/// domain records can be handed to templates directly.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    values: Map<String, Value>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.values
            .insert(key.into(), serde_json::to_value(value).unwrap_or(Value::Null));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Fetch a variable, erroring with [`TemplateError::MissingVariable`]
    /// when absent. Intended for adapters.
    pub fn require<'a>(&'a self, template: &str, key: &str) -> Result<&'a Value, TemplateError> {
        self.values
            .get(key)
            .ok_or_else(|| TemplateError::MissingVariable {
                template: template.to_string(),
                variable: key.to_string(),
            })
    }
}

/// Port for rendering named prompt templates
pub trait TemplateRenderer: Send + Sync {
    /// Render `name` with `context`, failing on unknown templates or
    /// missing referenced variables.
    fn render(&self, name: &str, context: &TemplateContext) -> Result<String, TemplateError>;
}
