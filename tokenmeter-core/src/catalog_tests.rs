//! Tests for the model catalog and index file handling.

use super::*;
use tempfile::TempDir;

#[test]
fn test_builtin_resolves_known_keys() {
    let catalog = ModelCatalog::builtin();

    assert_eq!(catalog.resolve("qwen3-0.6b"), Some("Qwen/Qwen3-0.6B"));
    assert_eq!(
        catalog.resolve("deepseek-v3.1-base"),
        Some("deepseek-ai/DeepSeek-V3.1-Base")
    );
    assert_eq!(catalog.len(), 11);
}

#[test]
fn test_resolve_unknown_key() {
    let catalog = ModelCatalog::builtin();
    assert_eq!(catalog.resolve("deepseek-671b"), None);
    assert!(!catalog.contains("deepseek-671b"));
}

#[test]
fn test_keys_are_sorted() {
    let catalog = ModelCatalog::builtin();
    let keys: Vec<&str> = catalog.keys().collect();

    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(keys.first(), Some(&"deepseek-v3"));
}

#[test]
fn test_display_name_fallbacks() {
    let catalog = ModelCatalog::from_entries([
        ModelEntry::new("a", "org/A").with_display_name("Model A"),
        ModelEntry::new("b", "org/B"),
    ]);

    assert_eq!(catalog.display_name("a"), "Model A");
    assert_eq!(catalog.display_name("b"), "org/B");
    assert_eq!(catalog.display_name("c"), "c");
}

#[test]
fn test_merged_with_prefers_other() {
    let base = ModelCatalog::from_entries([ModelEntry::new("a", "org/A")]);
    let overlay = ModelCatalog::from_entries([
        ModelEntry::new("a", "mirror/A"),
        ModelEntry::new("z", "org/Z"),
    ]);

    let merged = base.merged_with(overlay);
    assert_eq!(merged.resolve("a"), Some("mirror/A"));
    assert_eq!(merged.resolve("z"), Some("org/Z"));
    assert_eq!(merged.len(), 2);
}

#[test]
fn test_index_write_then_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(INDEX_FILE);

    ModelCatalog::builtin().write_index(&path).unwrap();
    let read = ModelCatalog::read_index(&path).unwrap();

    assert_eq!(read, ModelCatalog::builtin());
}

#[test]
fn test_read_index_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = ModelCatalog::read_index(dir.path().join(INDEX_FILE));
    assert!(matches!(result, Err(CatalogError::Read { .. })));
}

#[test]
fn test_read_index_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(INDEX_FILE);
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let result = ModelCatalog::read_index(&path);
    assert!(matches!(result, Err(CatalogError::Format { .. })));
}

#[test]
fn test_builtin_keys_match_catalog() {
    let mut keys: Vec<&str> = builtin_keys().collect();
    keys.sort();
    assert_eq!(keys, ModelCatalog::builtin().keys().collect::<Vec<_>>());
}
