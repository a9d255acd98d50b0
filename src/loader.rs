//! Fragment loading - directory scans with an optional compressed disk memo
//!
//! Fragments are keyed by filename stem; later directories win on stem
//! collisions. With `file_cache` enabled, each directory's scan is
//! memoized in a gzip-compressed JSON blob keyed by a SHA-256 digest of
//! the sorted file list, so an unchanged file set skips the per-file
//! reads. A stale or corrupt blob falls back to a fresh scan, never an
//! error.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::StencilError;

/// Loaded fragments, keyed by filename stem. Immutable after load and
/// cheap to share across engine instances.
#[derive(Debug, Default)]
pub struct FragmentStore {
    fragments: DashMap<String, Arc<str>>,
}

impl FragmentStore {
    /// Scan every directory for `*<extension>` files and load them.
    pub fn load(dirs: &[PathBuf], config: &EngineConfig) -> Result<Self, StencilError> {
        let store = Self::default();
        for dir in dirs {
            store.load_dir(dir, config)?;
        }
        Ok(store)
    }

    fn load_dir(&self, dir: &Path, config: &EngineConfig) -> Result<(), StencilError> {
        let pattern = format!("{}/*{}", dir.display(), config.extension);
        let mut files: Vec<PathBuf> = glob::glob(&pattern)
            .map_err(|e| StencilError::Config(format!("bad fragment pattern '{pattern}': {e}")))?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        debug!(dir = %dir.display(), count = files.len(), "scanning fragment directory");

        if config.file_cache {
            let cache_path = config
                .cache_dir
                .join(format!("{}.fcache", file_list_digest(&files)));
            if let Some(cached) = read_cache(&cache_path) {
                debug!(cache = %cache_path.display(), "fragment cache hit");
                self.absorb(cached);
                return Ok(());
            }
            let scanned = read_files(&files, &config.extension)?;
            write_cache(&cache_path, &scanned);
            self.absorb(scanned);
            return Ok(());
        }

        self.absorb(read_files(&files, &config.extension)?);
        Ok(())
    }

    /// Register a fragment directly, bypassing the filesystem.
    pub fn insert(&self, name: impl Into<String>, text: impl AsRef<str>) {
        self.fragments.insert(name.into(), Arc::from(text.as_ref()));
    }

    /// Raw fragment text by name.
    pub fn get(&self, name: &str) -> Option<Arc<str>> {
        self.fragments.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }

    /// Sorted fragment names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fragments.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// `{{>name}}` token -> fragment text, for the partial pass.
    pub fn partial_table(&self) -> HashMap<String, String> {
        self.fragments
            .iter()
            .map(|e| (format!("{{{{>{}}}}}", e.key()), e.value().to_string()))
            .collect()
    }

    fn absorb(&self, fragments: BTreeMap<String, String>) {
        for (name, text) in fragments {
            self.fragments.insert(name, Arc::from(text.as_str()));
        }
    }
}

fn read_files(
    files: &[PathBuf],
    extension: &str,
) -> Result<BTreeMap<String, String>, StencilError> {
    let mut out = BTreeMap::new();
    for path in files {
        let text = fs::read_to_string(path)?;
        out.insert(fragment_name(path, extension), text);
    }
    Ok(out)
}

/// Filename stem: `templates/greet.tpl` -> `greet`.
fn fragment_name(path: &Path, extension: &str) -> String {
    let file = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    file.strip_suffix(extension).unwrap_or(file).to_string()
}

/// Cache key: digest of the sorted path list. Content changes inside an
/// unchanged file set do NOT invalidate the blob; delete the cache dir to
/// force a rescan.
fn file_list_digest(files: &[PathBuf]) -> String {
    let mut hasher = Sha256::new();
    for path in files {
        hasher.update(path.display().to_string().as_bytes());
        hasher.update([0]);
    }
    format!("{:x}", hasher.finalize())
}

fn read_cache(path: &Path) -> Option<BTreeMap<String, String>> {
    let raw = fs::read(path).ok()?;
    let mut json = String::new();
    if let Err(err) = GzDecoder::new(raw.as_slice()).read_to_string(&mut json) {
        warn!(cache = %path.display(), %err, "unreadable fragment cache, rescanning");
        return None;
    }
    match serde_json::from_str(&json) {
        Ok(map) => Some(map),
        Err(err) => {
            warn!(cache = %path.display(), %err, "corrupt fragment cache, rescanning");
            None
        }
    }
}

/// Best effort: a failed cache write only costs the memoization.
fn write_cache(path: &Path, fragments: &BTreeMap<String, String>) {
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            warn!(cache = %path.display(), %err, "cannot create cache directory");
            return;
        }
    }
    let json = match serde_json::to_vec(fragments) {
        Ok(json) => json,
        Err(_) => return,
    };
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    if encoder.write_all(&json).is_err() {
        return;
    }
    match encoder.finish() {
        Ok(blob) => {
            if let Err(err) = fs::write(path, blob) {
                warn!(cache = %path.display(), %err, "cannot write fragment cache");
            } else {
                debug!(cache = %path.display(), "fragment cache written");
            }
        }
        Err(err) => warn!(cache = %path.display(), %err, "cannot compress fragment cache"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_name_strips_the_configured_suffix() {
        assert_eq!(fragment_name(Path::new("dir/greet.tpl"), ".tpl"), "greet");
        assert_eq!(fragment_name(Path::new("greet.html"), ".tpl"), "greet.html");
    }

    #[test]
    fn digest_is_stable_and_order_sensitive() {
        let a = vec![PathBuf::from("a.tpl"), PathBuf::from("b.tpl")];
        let b = vec![PathBuf::from("a.tpl"), PathBuf::from("b.tpl")];
        let c = vec![PathBuf::from("b.tpl"), PathBuf::from("a.tpl")];
        assert_eq!(file_list_digest(&a), file_list_digest(&b));
        assert_ne!(file_list_digest(&a), file_list_digest(&c));
    }

    #[test]
    fn partial_table_keys_are_reference_tokens() {
        let store = FragmentStore::default();
        store.insert("header", "<h1>");
        let table = store.partial_table();
        assert_eq!(table.get("{{>header}}").map(String::as_str), Some("<h1>"));
    }

    #[test]
    fn insert_and_get_round_trip() {
        let store = FragmentStore::default();
        store.insert("greet", "Hello {{name}}");
        assert!(store.contains("greet"));
        assert_eq!(store.get("greet").as_deref(), Some("Hello {{name}}"));
        assert_eq!(store.get("missing"), None);
        assert_eq!(store.names(), vec!["greet".to_string()]);
    }
}
