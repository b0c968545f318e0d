//! Tokenizer loaders
//!
//! A loader answers two questions for the registry: which model keys are
//! available, and how to turn one key into a [`TokenEncoder`]. Two
//! implementations exist:
//!
//! - [`LocalLoader`] scans a directory with one subdirectory per model and
//!   never touches the network.
//! - [`RemoteLoader`] offers every catalog key and fetches `tokenizer.json`
//!   from the HuggingFace Hub on load.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use hf_hub::api::sync::{Api, ApiBuilder};
use tracing::{debug, info, warn};

use crate::catalog::{ModelCatalog, INDEX_FILE};
use crate::error::LoadError;
use crate::tokenizer::{HfTokenizer, TokenEncoder, TOKENIZER_CONFIG_FILE, TOKENIZER_FILE};

/// Where tokenizer assets come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Local directory tree, no network access
    Local,
    /// HuggingFace Hub, network required
    Remote,
}

impl LoadMode {
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

/// Mode requested by configuration; `Auto` is resolved against the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeSetting {
    /// Local when the tokenizer directory exists and is non-empty
    #[default]
    Auto,
    Local,
    Remote,
}

impl ModeSetting {
    /// Resolve to a concrete mode for the given tokenizer directory
    pub fn resolve(self, tokenizers_dir: &Path) -> LoadMode {
        match self {
            Self::Local => LoadMode::Local,
            Self::Remote => LoadMode::Remote,
            Self::Auto if dir_has_entries(tokenizers_dir) => LoadMode::Local,
            Self::Auto => LoadMode::Remote,
        }
    }
}

impl FromStr for ModeSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(format!(
                "invalid mode '{}', expected one of: auto, local, remote",
                other
            )),
        }
    }
}

impl fmt::Display for ModeSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Local => f.write_str("local"),
            Self::Remote => f.write_str("remote"),
        }
    }
}

fn dir_has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Source of tokenizers for a [`crate::TokenizerRegistry`].
///
/// `load` may block for a long time (network, large vocabularies).
/// Implementations must not retry; a failure is final for that key.
pub trait TokenizerLoader: Send + Sync {
    fn mode(&self) -> LoadMode;

    /// Catalog used to name models in results
    fn catalog(&self) -> ModelCatalog;

    /// Keys that can be loaded, sorted
    fn discover(&self) -> Vec<String>;

    /// Load the tokenizer for one key
    fn load(&self, key: &str) -> Result<Arc<dyn TokenEncoder>, LoadError>;
}

/// Loads tokenizers from `<dir>/<model-key>/tokenizer.json`.
#[derive(Debug, Clone)]
pub struct LocalLoader {
    dir: PathBuf,
}

impl LocalLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Subdirectories that contain a tokenizer definition or config
    fn scan(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "tokenizers directory is not readable");
                return Vec::new();
            }
        };

        let mut keys: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .filter(|name| {
                let path = self.dir.join(name);
                path.join(TOKENIZER_FILE).exists() || path.join(TOKENIZER_CONFIG_FILE).exists()
            })
            .collect();
        keys.sort();
        keys
    }

    fn index(&self) -> Option<ModelCatalog> {
        let path = self.dir.join(INDEX_FILE);
        if !path.exists() {
            return None;
        }
        match ModelCatalog::read_index(&path) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable model index");
                None
            }
        }
    }
}

impl TokenizerLoader for LocalLoader {
    fn mode(&self) -> LoadMode {
        LoadMode::Local
    }

    fn catalog(&self) -> ModelCatalog {
        let builtin = ModelCatalog::builtin();
        match self.index() {
            Some(index) => builtin.merged_with(index),
            None => builtin,
        }
    }

    fn discover(&self) -> Vec<String> {
        let scanned = self.scan();
        if !scanned.is_empty() {
            info!(dir = %self.dir.display(), count = scanned.len(), "discovered local tokenizers");
            return scanned;
        }

        warn!(dir = %self.dir.display(), "no tokenizer directories found, trying model index");
        self.index()
            .map(|index| {
                let keys: Vec<String> = index.keys().map(String::from).collect();
                info!(count = keys.len(), "read model keys from index");
                keys
            })
            .unwrap_or_default()
    }

    fn load(&self, key: &str) -> Result<Arc<dyn TokenEncoder>, LoadError> {
        // Keys are directory names; anything that could escape the root is absent
        if key.is_empty() || key.contains(['/', '\\']) || key == ".." {
            return Err(LoadError::NotFound(self.dir.join(key)));
        }

        let model_dir = self.dir.join(key);
        debug!(model = key, path = %model_dir.display(), "loading local tokenizer");
        Ok(Arc::new(HfTokenizer::from_dir(model_dir)?))
    }
}

/// Fetches tokenizers from the HuggingFace Hub.
#[derive(Debug, Clone)]
pub struct RemoteLoader {
    catalog: ModelCatalog,
    cache_dir: Option<PathBuf>,
}

impl RemoteLoader {
    pub fn new(catalog: ModelCatalog) -> Self {
        Self {
            catalog,
            cache_dir: None,
        }
    }

    /// Use a custom hub cache instead of the default `~/.cache/huggingface`
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub(crate) fn api(&self) -> Result<Api, hf_hub::api::sync::ApiError> {
        hub_api(self.cache_dir.as_deref())
    }
}

/// Build a synchronous hub client, optionally with a custom cache directory
pub(crate) fn hub_api(cache_dir: Option<&Path>) -> Result<Api, hf_hub::api::sync::ApiError> {
    let builder = ApiBuilder::new().with_progress(false);
    match cache_dir {
        Some(dir) => builder.with_cache_dir(dir.to_path_buf()).build(),
        None => builder.build(),
    }
}

impl TokenizerLoader for RemoteLoader {
    fn mode(&self) -> LoadMode {
        LoadMode::Remote
    }

    fn catalog(&self) -> ModelCatalog {
        self.catalog.clone()
    }

    fn discover(&self) -> Vec<String> {
        self.catalog.keys().map(String::from).collect()
    }

    fn load(&self, key: &str) -> Result<Arc<dyn TokenEncoder>, LoadError> {
        let repo = self
            .catalog
            .resolve(key)
            .ok_or_else(|| LoadError::UnknownModel(key.to_string()))?
            .to_string();

        let download_error = |message: String| LoadError::Download {
            repo: repo.clone(),
            message,
        };

        debug!(model = key, repo = %repo, "fetching tokenizer from hub");
        let api = self.api().map_err(|e| download_error(e.to_string()))?;
        let path = api
            .model(repo.clone())
            .get(TOKENIZER_FILE)
            .map_err(|e| download_error(e.to_string()))?;

        Ok(Arc::new(HfTokenizer::from_file(path)?))
    }
}

/// Create the loader for a resolved mode
pub fn loader_for(
    mode: LoadMode,
    tokenizers_dir: impl Into<PathBuf>,
    cache_dir: Option<PathBuf>,
) -> Arc<dyn TokenizerLoader> {
    match mode {
        LoadMode::Local => Arc::new(LocalLoader::new(tokenizers_dir)),
        LoadMode::Remote => {
            let loader = RemoteLoader::new(ModelCatalog::builtin());
            match cache_dir {
                Some(dir) => Arc::new(loader.with_cache_dir(dir)),
                None => Arc::new(loader),
            }
        }
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
