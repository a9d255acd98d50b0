//! Render orchestration - pass sequencing, memoization, cleanup
//!
//! A render walks: resolve name -> memo check -> whitespace normalization
//! -> rebind -> partials -> sections -> variables -> cleanup. The memo
//! holds exactly the last successful call, compared by value; binding
//! tables are rebuilt only when the incoming bag differs from the one
//! bound last.
//!
//! One engine instance serves one caller at a time - `render` takes
//! `&mut self`, so the borrow checker enforces the discipline. Share the
//! `FragmentStore` and give each concurrent caller its own engine.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::bindings::Bindings;
use crate::config::EngineConfig;
use crate::error::StencilError;
use crate::expand::{expand_partials, expand_sections, interpolate_vars};
use crate::loader::FragmentStore;
use crate::params::Params;

/// `{{ name }}` -> `{{name}}`, for every tag shape, when the config
/// tolerates whitespace inside delimiters.
static TAG_WHITESPACE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([>#/^!]?)\s*(.+?)\s*\}\}").unwrap());

/// Any leftover double-brace token. Stripping is per token (non-greedy),
/// and also eats literal double-braced text the author wanted kept - a
/// documented sharp edge of `hide_empty_vars`.
static LEFTOVER_TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{.+?\}\}").unwrap());

/// Memo of the single most recent successful render. Capacity one, by
/// value - not a general cache.
#[derive(Debug)]
struct RenderMemo {
    template: String,
    params: Params,
    output: String,
}

/// Pass counters, readable from tests and diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderStats {
    /// Full renders executed (memo hits excluded).
    pub renders: u64,
    /// Calls answered from the single-slot memo.
    pub memo_hits: u64,
    /// Substitution passes run across all renders.
    pub expansion_passes: u64,
}

/// The render orchestrator.
pub struct Engine {
    store: FragmentStore,
    config: EngineConfig,
    /// `{{>name}}` -> fragment text, frozen at construction.
    partial_table: HashMap<String, String>,
    bindings: Bindings,
    bound_params: Option<Params>,
    memo: Option<RenderMemo>,
    stats: RenderStats,
}

impl Engine {
    pub fn new(store: FragmentStore, config: EngineConfig) -> Self {
        let partial_table = if config.enable_partials {
            store.partial_table()
        } else {
            HashMap::new()
        };
        Self {
            store,
            config,
            partial_table,
            bindings: Bindings::default(),
            bound_params: None,
            memo: None,
            stats: RenderStats::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &FragmentStore {
        &self.store
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Render `template` against `params`.
    ///
    /// Unknown names fail with `TemplateNotFound` and produce no partial
    /// output. A call value-identical to the previous successful one is
    /// answered from the memo without touching the expansion passes.
    pub fn render(&mut self, template: &str, params: &Params) -> Result<String, StencilError> {
        let Some(fragment) = self.store.get(template) else {
            return Err(StencilError::TemplateNotFound {
                name: template.to_string(),
                available: self.store.names(),
            });
        };

        if let Some(memo) = &self.memo {
            if memo.template == template && memo.params == *params {
                self.stats.memo_hits += 1;
                debug!(template, "render memo hit");
                return Ok(memo.output.clone());
            }
        }

        self.stats.renders += 1;
        // All rewriting happens on this transient copy; the stored
        // fragment text is never touched.
        let mut text = fragment.to_string();

        if self.config.allow_whitespaces {
            text = TAG_WHITESPACE_PATTERN
                .replace_all(&text, "{{${1}${2}}}")
                .into_owned();
        }

        if self.bound_params.as_ref() != Some(params) {
            self.bindings.rebuild(params);
            self.bound_params = Some(params.clone());
        }

        if self.config.enable_partials {
            text = expand_partials(text, &self.partial_table, self.config.partial_max_level);
            self.stats.expansion_passes += u64::from(self.config.partial_max_level);
        }
        if self.config.enable_arrays {
            text = expand_sections(text, &self.bindings);
            self.stats.expansion_passes += 1;
        }
        text = interpolate_vars(text, &self.bindings);
        self.stats.expansion_passes += 1;

        if self.config.hide_empty_vars {
            text = LEFTOVER_TOKEN_PATTERN.replace_all(&text, "").into_owned();
        }

        self.memo = Some(RenderMemo {
            template: template.to_string(),
            params: params.clone(),
            output: text.clone(),
        });
        Ok(text)
    }
}
