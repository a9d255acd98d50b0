//! Binding normalization - splits a parameter bag into lookup tables
//!
//! Scalars become two variable entries (escaped and raw token forms);
//! arrays go to the section table untouched. Both tables are rebuilt
//! together from one `Params` snapshot, so the interpolation and section
//! passes always see consistent data.

use std::collections::{BTreeMap, HashMap};

use crate::escape::escape_html;
use crate::params::{ParamValue, Params, Row};

/// Variable and array tables derived from one `Params` snapshot.
#[derive(Debug, Default)]
pub struct Bindings {
    /// Full token text -> value: `{{key}}` carries the HTML-escaped form,
    /// `{{!key}}` the raw form.
    pub vars: HashMap<String, String>,
    /// Section name -> rows.
    pub arrays: HashMap<String, Vec<Row>>,
}

impl Bindings {
    /// Clear and repopulate both tables from `params`.
    pub fn rebuild(&mut self, params: &Params) {
        self.vars.clear();
        self.arrays.clear();
        for (key, value) in params.iter() {
            match value {
                ParamValue::Scalar(s) => {
                    self.vars.insert(format!("{{{{{key}}}}}"), escape_html(s));
                    self.vars.insert(format!("{{{{!{key}}}}}"), s.clone());
                }
                ParamValue::Rows(rows) => {
                    self.arrays.insert(key.clone(), rows.clone());
                }
            }
        }
    }
}

/// Per-row token table for an explicit-iterator row: the same two-token
/// convention as the top-level variable table, scoped to one row's fields.
pub fn row_field_tokens(fields: &BTreeMap<String, String>) -> HashMap<String, String> {
    let mut tokens = HashMap::with_capacity(fields.len() * 2);
    for (key, value) in fields {
        tokens.insert(format!("{{{{{key}}}}}"), escape_html(value));
        tokens.insert(format!("{{{{!{key}}}}}"), value.clone());
    }
    tokens
}
