//! Render parameters - the data handed to a render call
//!
//! A `Params` bag maps keys to either a scalar (variable binding) or an
//! ordered list of rows (section data). Bags deserialize from JSON or YAML
//! params files; non-string scalars are stringified on the way in.

use std::collections::BTreeMap;

use serde::Deserialize;

/// One row of a section array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Scalar row, addressed inside the block via the `{{.}}` placeholder.
    Item(String),
    /// Row with named fields, each addressable as `{{field}}` / `{{!field}}`.
    Fields(BTreeMap<String, String>),
}

impl Row {
    /// Scalar row.
    pub fn item(value: impl Into<String>) -> Self {
        Row::Item(value.into())
    }

    /// Row with named fields.
    pub fn fields<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Row::Fields(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A scalar binding or a section array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Scalar(String),
    Rows(Vec<Row>),
}

/// Parameter bag for one render call.
///
/// Compared by value: the engine's render memo and the binding rebuild
/// guard both key off `PartialEq` of the whole bag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scalar binding (chainable, test-friendly).
    pub fn with_scalar(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0
            .insert(key.into(), ParamValue::Scalar(value.into()));
        self
    }

    /// Add a section array (chainable, test-friendly).
    pub fn with_rows(mut self, key: impl Into<String>, rows: Vec<Row>) -> Self {
        self.0.insert(key.into(), ParamValue::Rows(rows));
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Raw serde shapes - deserialized first, then folded into the runtime
// types so callers only ever see strings.

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl RawScalar {
    fn into_string(self) -> String {
        match self {
            RawScalar::Bool(b) => b.to_string(),
            RawScalar::Int(i) => i.to_string(),
            RawScalar::Float(f) => f.to_string(),
            RawScalar::Str(s) => s,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRow {
    Item(RawScalar),
    Fields(BTreeMap<String, RawScalar>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Scalar(RawScalar),
    Rows(Vec<RawRow>),
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = BTreeMap::<String, RawValue>::deserialize(deserializer)?;
        let converted = raw
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    RawValue::Scalar(s) => ParamValue::Scalar(s.into_string()),
                    RawValue::Rows(rows) => ParamValue::Rows(
                        rows.into_iter()
                            .map(|row| match row {
                                RawRow::Item(s) => Row::Item(s.into_string()),
                                RawRow::Fields(fields) => Row::Fields(
                                    fields
                                        .into_iter()
                                        .map(|(k, v)| (k, v.into_string()))
                                        .collect(),
                                ),
                            })
                            .collect(),
                    ),
                };
                (key, value)
            })
            .collect();
        Ok(Params(converted))
    }
}
