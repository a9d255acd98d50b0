//! Stencil - logic-light mustache-style template engine
//!
//! Loads named template fragments from directories and renders them
//! through bounded textual substitution passes: partial inlining, section
//! expansion over array data, and variable interpolation. No AST, no
//! compilation step - every render rewrites the raw text.

pub mod bindings;
pub mod config;
pub mod engine;
pub mod error;
pub mod escape;
pub mod expand;
pub mod loader;
pub mod params;
pub mod subst;

pub use config::EngineConfig;
pub use engine::{Engine, RenderStats};
pub use error::{FixSuggestion, StencilError};
pub use escape::escape_html;
pub use loader::FragmentStore;
pub use params::{ParamValue, Params, Row};
