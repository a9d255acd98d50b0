//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Errors surfaced by the loader and the render entry point.
///
/// Unresolved tokens and unmatched section tags are deliberately NOT here:
/// they resolve to literal text or empty output per configuration.
#[derive(Error, Debug)]
pub enum StencilError {
    #[error("template '{name}' not found (loaded: {})", .available.join(", "))]
    TemplateNotFound { name: String, available: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),
}

impl FixSuggestion for StencilError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            StencilError::TemplateNotFound { .. } => {
                Some("Check the fragment directories and extension; `stencil list` prints every loaded name")
            }
            StencilError::Io(_) => Some("Check file path and permissions"),
            StencilError::Config(_) => Some("Check YAML syntax: indentation and quoting"),
            StencilError::InvalidParams(_) => {
                Some("Params values must be scalars, arrays of scalars, or arrays of string maps")
            }
        }
    }
}
