//! Disk memoization tests for the fragment loader

use std::fs;

use tempfile::TempDir;

use stencil::{EngineConfig, FragmentStore};

fn cache_config(cache_dir: &TempDir) -> EngineConfig {
    EngineConfig {
        file_cache: true,
        cache_dir: cache_dir.path().to_path_buf(),
        ..EngineConfig::default()
    }
}

#[test]
fn first_load_writes_a_cache_blob() {
    let fragments = TempDir::new().unwrap();
    fs::write(fragments.path().join("greet.tpl"), "Hello {{name}}").unwrap();
    let cache = TempDir::new().unwrap();

    let config = cache_config(&cache);
    let dirs = vec![fragments.path().to_path_buf()];
    let store = FragmentStore::load(&dirs, &config).unwrap();

    assert_eq!(store.names(), vec!["greet".to_string()]);
    let blobs: Vec<_> = fs::read_dir(cache.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "fcache"))
        .collect();
    assert_eq!(blobs.len(), 1);
}

#[test]
fn second_load_serves_fragments_from_the_blob() {
    let fragments = TempDir::new().unwrap();
    fs::write(fragments.path().join("greet.tpl"), "Hello {{name}}").unwrap();
    let cache = TempDir::new().unwrap();

    let config = cache_config(&cache);
    let dirs = vec![fragments.path().to_path_buf()];
    FragmentStore::load(&dirs, &config).unwrap();

    // The file set is unchanged, so the content change is invisible: the
    // digest keys the path list, not the bytes.
    fs::write(fragments.path().join("greet.tpl"), "CHANGED").unwrap();
    let store = FragmentStore::load(&dirs, &config).unwrap();
    assert_eq!(store.get("greet").as_deref(), Some("Hello {{name}}"));
}

#[test]
fn adding_a_file_changes_the_key_and_forces_a_rescan() {
    let fragments = TempDir::new().unwrap();
    fs::write(fragments.path().join("greet.tpl"), "one").unwrap();
    let cache = TempDir::new().unwrap();

    let config = cache_config(&cache);
    let dirs = vec![fragments.path().to_path_buf()];
    FragmentStore::load(&dirs, &config).unwrap();

    fs::write(fragments.path().join("extra.tpl"), "two").unwrap();
    let store = FragmentStore::load(&dirs, &config).unwrap();
    assert_eq!(
        store.names(),
        vec!["extra".to_string(), "greet".to_string()]
    );
}

#[test]
fn corrupt_blob_falls_back_to_a_fresh_scan() {
    let fragments = TempDir::new().unwrap();
    fs::write(fragments.path().join("greet.tpl"), "Hello").unwrap();
    let cache = TempDir::new().unwrap();

    let config = cache_config(&cache);
    let dirs = vec![fragments.path().to_path_buf()];
    FragmentStore::load(&dirs, &config).unwrap();

    for entry in fs::read_dir(cache.path()).unwrap().filter_map(Result::ok) {
        fs::write(entry.path(), b"not gzip at all").unwrap();
    }

    let store = FragmentStore::load(&dirs, &config).unwrap();
    assert_eq!(store.get("greet").as_deref(), Some("Hello"));
}

#[test]
fn cache_disabled_always_rereads_files() {
    let fragments = TempDir::new().unwrap();
    fs::write(fragments.path().join("greet.tpl"), "v1").unwrap();

    let config = EngineConfig::default();
    let dirs = vec![fragments.path().to_path_buf()];
    FragmentStore::load(&dirs, &config).unwrap();

    fs::write(fragments.path().join("greet.tpl"), "v2").unwrap();
    let store = FragmentStore::load(&dirs, &config).unwrap();
    assert_eq!(store.get("greet").as_deref(), Some("v2"));
}
