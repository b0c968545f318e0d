//! Model catalog
//!
//! Maps short model keys (e.g. `qwen3-0.6b`) to the upstream HuggingFace
//! repository that publishes the tokenizer. Models are organized by vendor:
//! - Qwen3 dense and MoE models
//! - DeepSeek V3 and V3.1 models
//!
//! The catalog is pure data. A key that is absent is not an error here;
//! loaders turn it into a skipped model.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::CatalogError;

/// File name of the index written next to downloaded tokenizers.
pub const INDEX_FILE: &str = "models_index.json";

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    /// Short, stable key used as selector and map key
    pub key: String,
    /// Upstream repository id (e.g. "Qwen/Qwen3-0.6B")
    pub upstream_id: String,
    /// Optional human readable name
    pub display_name: Option<String>,
}

impl ModelEntry {
    pub fn new(key: impl Into<String>, upstream_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            upstream_id: upstream_id.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Display name if set, upstream id otherwise
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.upstream_id)
    }
}

/// (key, upstream repository)
const BUILTIN_MODELS: &[(&str, &str)] = &[
    // Qwen3
    ("qwen3-0.6b", "Qwen/Qwen3-0.6B"),
    ("qwen3-1.7b", "Qwen/Qwen3-1.7B"),
    ("qwen3-4b", "Qwen/Qwen3-4B"),
    ("qwen3-8b", "Qwen/Qwen3-8B"),
    ("qwen3-14b", "Qwen/Qwen3-14B"),
    ("qwen3-32b", "Qwen/Qwen3-32B"),
    ("qwen3-30b-a3b", "Qwen/Qwen3-30B-A3B"),
    // DeepSeek
    ("deepseek-v3", "deepseek-ai/DeepSeek-V3"),
    ("deepseek-v3-base", "deepseek-ai/DeepSeek-V3-Base"),
    ("deepseek-v3.1", "deepseek-ai/DeepSeek-V3.1"),
    ("deepseek-v3.1-base", "deepseek-ai/DeepSeek-V3.1-Base"),
];

/// Keys of the built-in catalog, in declaration order
pub fn builtin_keys() -> impl Iterator<Item = &'static str> {
    BUILTIN_MODELS.iter().map(|(key, _)| *key)
}

/// Immutable set of known models, keyed and ordered by [`ModelEntry::key`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelCatalog {
    entries: BTreeMap<String, ModelEntry>,
}

impl ModelCatalog {
    /// The catalog compiled into the binary
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN_MODELS
                .iter()
                .map(|(key, repo)| ModelEntry::new(*key, *repo)),
        )
    }

    pub fn from_entries(entries: impl IntoIterator<Item = ModelEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.key.clone(), entry))
                .collect(),
        }
    }

    /// Resolve a key to its upstream identifier
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.upstream_id.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&ModelEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name shown to users; falls back to the key for uncatalogued models
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map(ModelEntry::name).unwrap_or(key)
    }

    /// Overlay `other` onto this catalog. Entries in `other` win.
    pub fn merged_with(mut self, other: ModelCatalog) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Read an index file mapping key to upstream id
    pub fn read_index(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let map: BTreeMap<String, String> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Format {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::from_entries(
            map.into_iter().map(|(key, repo)| ModelEntry::new(key, repo)),
        ))
    }

    /// Write this catalog as an index file (pretty printed, UTF-8)
    pub fn write_index(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        let path = path.as_ref();
        let map: BTreeMap<&str, &str> = self
            .entries
            .values()
            .map(|e| (e.key.as_str(), e.upstream_id.as_str()))
            .collect();
        let json = serde_json::to_string_pretty(&map).map_err(|source| CatalogError::Format {
            path: path.to_path_buf(),
            source,
        })?;

        std::fs::write(path, json).map_err(|source| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
