//! Single-pass simultaneous token substitution
//!
//! Every expansion pass in the engine goes through `substitute_all`: one
//! left-to-right scan in which the longest table key wins at each position
//! and replaced text is never rescanned within the pass. Rescanning only
//! happens when a caller runs another pass (the partial expander's bounded
//! loop does exactly that).

use std::collections::HashMap;

use regex::Regex;

/// Replace every occurrence of any table key with its value, in one pass.
pub fn substitute_all(input: &str, table: &HashMap<String, String>) -> String {
    if table.is_empty() {
        return input.to_string();
    }

    // Longest key first so `{{item}}` never shadows `{{items}}` inside the
    // alternation; ties broken lexicographically for determinism.
    let mut keys: Vec<&str> = table.keys().map(String::as_str).collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let pattern = keys
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let re = Regex::new(&pattern).expect("escaped alternation is always a valid pattern");

    re.replace_all(input, |caps: &regex::Captures<'_>| table[&caps[0]].clone())
        .into_owned()
}
