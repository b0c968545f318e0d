//! Tokenizer registry
//!
//! The registry owns the mapping from model key to loaded tokenizer for the
//! lifetime of the process. It is built lazily, at most once, on the first
//! call to [`TokenizerRegistry::get_or_build`]:
//!
//! - the build runs under a mutex, so concurrent first callers wait for a
//!   single discover + load sequence instead of racing
//! - afterwards the result is published in a `OnceLock` and read without
//!   locking
//! - the published [`LoadedTokenizers`] is never mutated; requests narrow it
//!   with [`LoadedTokenizers::select`], which copies `Arc` handles only

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::catalog::ModelCatalog;
use crate::loader::{LoadMode, TokenizerLoader};
use crate::tokenizer::TokenEncoder;

/// Lazily built, process-wide set of tokenizers.
pub struct TokenizerRegistry {
    loader: Arc<dyn TokenizerLoader>,
    selection: Option<Vec<String>>,
    built: OnceLock<Arc<LoadedTokenizers>>,
    build_lock: Mutex<()>,
}

impl TokenizerRegistry {
    pub fn new(loader: impl TokenizerLoader + 'static) -> Self {
        Self::from_arc(Arc::new(loader))
    }

    /// Create a registry from a shared loader
    pub fn from_arc(loader: Arc<dyn TokenizerLoader>) -> Self {
        Self {
            loader,
            selection: None,
            built: OnceLock::new(),
            build_lock: Mutex::new(()),
        }
    }

    /// Only load these keys (intersected with what the loader discovers).
    ///
    /// An empty selection means "everything available".
    pub fn with_selection<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        self.selection = (!keys.is_empty()).then_some(keys);
        self
    }

    pub fn mode(&self) -> LoadMode {
        self.loader.mode()
    }

    /// The built tokenizers, if a build already happened
    pub fn get(&self) -> Option<Arc<LoadedTokenizers>> {
        self.built.get().cloned()
    }

    pub fn is_built(&self) -> bool {
        self.built.get().is_some()
    }

    /// Return the loaded tokenizers, building them on first use.
    ///
    /// This blocks while the build runs. An empty result is returned as-is;
    /// callers decide whether that is fatal.
    pub fn get_or_build(&self) -> Arc<LoadedTokenizers> {
        if let Some(loaded) = self.built.get() {
            return loaded.clone();
        }

        let _guard = self.build_lock.lock();
        if let Some(loaded) = self.built.get() {
            return loaded.clone();
        }

        let loaded = Arc::new(self.build());
        // Only the lock holder writes, so the cell is still empty here
        let _ = self.built.set(loaded.clone());
        loaded
    }

    fn build(&self) -> LoadedTokenizers {
        let mode = self.loader.mode();
        let available = self.loader.discover();

        let expected: Vec<String> = match &self.selection {
            Some(selection) => {
                let mut expected = Vec::new();
                for key in selection {
                    if !available.contains(key) {
                        warn!(model = %key, "requested model is not available, skipping");
                    } else if !expected.contains(key) {
                        expected.push(key.clone());
                    }
                }
                expected
            }
            None => available,
        };

        info!(%mode, count = expected.len(), "loading tokenizers");

        let mut tokenizers = BTreeMap::new();
        for key in &expected {
            match self.loader.load(key) {
                Ok(encoder) => {
                    info!(model = %key, "loaded tokenizer");
                    tokenizers.insert(key.clone(), encoder);
                }
                Err(e) => {
                    warn!(model = %key, error = %e, "failed to load tokenizer, skipping");
                }
            }
        }

        if tokenizers.is_empty() {
            error!(%mode, "no tokenizer could be loaded");
        } else {
            info!(
                loaded = tokenizers.len(),
                expected = expected.len(),
                "tokenizers ready"
            );
        }

        LoadedTokenizers {
            tokenizers,
            expected,
            catalog: self.loader.catalog(),
            mode,
        }
    }
}

impl std::fmt::Debug for TokenizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizerRegistry")
            .field("mode", &self.mode())
            .field("selection", &self.selection)
            .field("built", &self.is_built())
            .finish()
    }
}

/// Immutable result of a registry build.
pub struct LoadedTokenizers {
    pub(crate) tokenizers: BTreeMap<String, Arc<dyn TokenEncoder>>,
    expected: Vec<String>,
    pub(crate) catalog: ModelCatalog,
    mode: LoadMode,
}

impl LoadedTokenizers {
    pub fn get(&self, key: &str) -> Option<&Arc<dyn TokenEncoder>> {
        self.tokenizers.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tokenizers.contains_key(key)
    }

    /// Loaded keys, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tokenizers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokenizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokenizers.is_empty()
    }

    /// Keys the build attempted to load
    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    pub fn expected_count(&self) -> usize {
        self.expected.len()
    }

    /// Expected keys that failed to load
    pub fn missing(&self) -> Vec<String> {
        self.expected
            .iter()
            .filter(|key| !self.tokenizers.contains_key(*key))
            .cloned()
            .collect()
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.catalog.display_name(key)
    }

    pub fn health(&self) -> HealthReport {
        let missing = self.missing();
        let status = if self.tokenizers.is_empty() {
            HealthStatus::Error
        } else if !missing.is_empty() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        HealthReport {
            status,
            tokenizer_count: self.tokenizers.len(),
            expected_count: self.expected.len(),
            loaded_models: self.tokenizers.keys().cloned().collect(),
            missing_models: missing,
            local_mode: self.mode.is_local(),
        }
    }
}

impl std::fmt::Debug for LoadedTokenizers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedTokenizers")
            .field("loaded", &self.tokenizers.keys().collect::<Vec<_>>())
            .field("expected", &self.expected)
            .field("mode", &self.mode)
            .finish()
    }
}

/// Overall registry health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Every expected tokenizer loaded
    Healthy,
    /// Some expected tokenizers are missing
    Degraded,
    /// Nothing loaded
    Error,
}

/// Snapshot of how many tokenizers loaded versus expected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub tokenizer_count: usize,
    pub expected_count: usize,
    pub loaded_models: Vec<String>,
    pub missing_models: Vec<String>,
    pub local_mode: bool,
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
