//! Final variable interpolation pass

use crate::bindings::Bindings;
use crate::subst::substitute_all;

/// Substitute every bound `{{key}}` / `{{!key}}` token in one pass.
/// Tokens with no binding stay put for the orchestrator's cleanup.
pub fn interpolate_vars(text: String, bindings: &Bindings) -> String {
    substitute_all(&text, &bindings.vars)
}
