//! Partial expansion - bounded inlining of fragment references

use std::collections::HashMap;

use tracing::trace;

use crate::subst::substitute_all;

/// Substitute `{{>name}}` tokens with their fragment text.
///
/// Runs `max_level` full passes over the entire working text, so pass N
/// can expand references that pass N-1 inlined. There is no cycle
/// detection: a partial that (transitively) includes itself burns the
/// remaining passes and leaves residual tokens once the budget runs out.
/// The iteration bound is the whole safety story.
pub fn expand_partials(
    text: String,
    partials: &HashMap<String, String>,
    max_level: u32,
) -> String {
    let mut out = text;
    for level in 0..max_level {
        trace!(level, "partial substitution pass");
        out = substitute_all(&out, partials);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partials(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, text)| (format!("{{{{>{name}}}}}"), text.to_string()))
            .collect()
    }

    #[test]
    fn single_level_inlines_direct_references() {
        let p = partials(&[("header", "<h1>Title</h1>")]);
        assert_eq!(
            expand_partials("{{>header}} body".to_string(), &p, 1),
            "<h1>Title</h1> body"
        );
    }

    #[test]
    fn nested_reference_needs_a_second_pass() {
        let p = partials(&[("outer", "[{{>inner}}]"), ("inner", "x")]);
        assert_eq!(
            expand_partials("{{>outer}}".to_string(), &p, 1),
            "[{{>inner}}]"
        );
        assert_eq!(expand_partials("{{>outer}}".to_string(), &p, 2), "[x]");
    }

    #[test]
    fn self_including_partial_stops_at_the_bound() {
        let p = partials(&[("loop", "a{{>loop}}")]);
        assert_eq!(
            expand_partials("{{>loop}}".to_string(), &p, 3),
            "aaa{{>loop}}"
        );
    }

    #[test]
    fn zero_levels_is_a_no_op() {
        let p = partials(&[("header", "x")]);
        assert_eq!(
            expand_partials("{{>header}}".to_string(), &p, 0),
            "{{>header}}"
        );
    }

    #[test]
    fn unknown_references_are_left_in_place() {
        let p = partials(&[("known", "x")]);
        assert_eq!(
            expand_partials("{{>unknown}}".to_string(), &p, 2),
            "{{>unknown}}"
        );
    }
}
