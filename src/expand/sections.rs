//! Section expansion - `{{#name}}` iteration and `{{^name}}` inversion

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::bindings::{row_field_tokens, Bindings};
use crate::params::Row;
use crate::subst::substitute_all;

/// Implicit current-item placeholder inside `#` blocks over scalar rows.
const ITEM_TOKEN: &str = "{{.}}";

/// `{{#name}}body{{/any}}` / `{{^name}}body{{/any}}`: narrowest span from
/// an opening tag to the next closing tag of any name. Blocks nested
/// inside the body are therefore swallowed as literal text - expansion is
/// single-level, and same-named nesting is unsupported.
static SECTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{\{([#^])(\S+?)\}\}(.*?)\{\{/\S+?\}\}").unwrap());

/// Rewrite every section block against the array table.
///
/// All blocks are resolved first, then applied in one simultaneous
/// substitution keyed by each block's exact original span - never by name,
/// so one block's literal text cannot bleed into another's replacement.
pub fn expand_sections(text: String, bindings: &Bindings) -> String {
    let mut replacements: HashMap<String, String> = HashMap::new();

    for caps in SECTION_PATTERN.captures_iter(&text) {
        let span = &caps[0];
        if replacements.contains_key(span) {
            continue;
        }
        let sigil = &caps[1];
        let name = &caps[2];
        let body = &caps[3];

        let replacement = match bindings.arrays.get(name) {
            // Name not bound: both sigils collapse to nothing.
            None => String::new(),
            Some(rows) => {
                trace!(name, sigil, rows = rows.len(), "section block");
                if sigil == "#" {
                    expand_rows(body, rows)
                } else if rows.is_empty() {
                    body.to_string()
                } else {
                    String::new()
                }
            }
        };
        replacements.insert(span.to_string(), replacement);
    }

    substitute_all(&text, &replacements)
}

fn expand_rows(body: &str, rows: &[Row]) -> String {
    let mut out = String::new();
    for row in rows {
        match row {
            Row::Item(value) => {
                // A scalar row without the placeholder contributes nothing,
                // not the raw body.
                if body.contains(ITEM_TOKEN) {
                    out.push_str(&body.replace(ITEM_TOKEN, value));
                }
            }
            Row::Fields(fields) => {
                out.push_str(&substitute_all(body, &row_field_tokens(fields)));
            }
        }
    }
    out
}
