//! Engine configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::StencilError;

/// All recognized engine options, with the stock defaults.
///
/// Loadable from a YAML file; unknown keys are rejected so a typo in an
/// option name fails loudly instead of silently using the default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Expand `{{>name}}` partial references.
    pub enable_partials: bool,
    /// Expand `{{#name}}` / `{{^name}}` section blocks.
    pub enable_arrays: bool,
    /// Fragment filename suffix, including the dot.
    pub extension: String,
    /// Full substitution passes over the working text for partials. Each
    /// pass can expand references introduced by the previous one.
    pub partial_max_level: u32,
    /// Strip unresolved `{{...}}` tokens from the final output.
    pub hide_empty_vars: bool,
    /// Accept whitespace between tag delimiters and content.
    pub allow_whitespaces: bool,
    /// Memoize directory scans in compressed blobs under `cache_dir`.
    pub file_cache: bool,
    /// Where `.fcache` blobs live.
    pub cache_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_partials: true,
            enable_arrays: true,
            extension: ".tpl".to_string(),
            partial_max_level: 1,
            hide_empty_vars: true,
            allow_whitespaces: false,
            file_cache: false,
            cache_dir: PathBuf::from(".stencil-cache"),
        }
    }
}

impl EngineConfig {
    /// Load options from a YAML file, defaulting every absent field.
    pub fn from_yaml_file(path: &Path) -> Result<Self, StencilError> {
        let text = fs::read_to_string(path)?;
        serde_yaml::from_str(&text).map_err(|e| StencilError::Config(e.to_string()))
    }
}
