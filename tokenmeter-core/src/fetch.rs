//! Download tokenizer assets from the hub into a local tokenizers directory.
//!
//! The resulting layout is the one [`LocalLoader`](crate::LocalLoader)
//! scans: one directory per model key, plus a `models_index.json` mapping
//! keys to upstream repositories.

use std::path::{Path, PathBuf};

use glob::Pattern;
use hf_hub::api::sync::Api;
use tracing::{info, warn};

use crate::catalog::{ModelCatalog, ModelEntry, INDEX_FILE};
use crate::error::FetchError;
use crate::loader::hub_api;
use crate::tokenizer::Definition;

/// Files that make up a tokenizer definition
pub const ALLOW_PATTERNS: &[&str] = &[
    "tokenizer_config.json",
    "vocab.json",
    "merges.txt",
    "vocab.txt",
    "special_tokens_map.json",
    "added_tokens.json",
    "tokenizer.json",
    "*.model",
    "*.bpe",
    "*.vocab",
    "*.tiktoken",
];

/// Weights and other large artifacts, never downloaded
pub const IGNORE_PATTERNS: &[&str] = &[
    "*.bin",
    "*.safetensors",
    "*.pt",
    "*.pth",
    "*.h5",
    "*.onnx",
    "*.pb",
];

fn matches_any(patterns: &[&str], name: &str) -> bool {
    patterns
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .any(|p| p.matches(name))
}

/// Whether a repository file belongs to the tokenizer
pub fn is_tokenizer_asset(name: &str) -> bool {
    !name.split('/').any(|part| part == "..")
        && !matches_any(IGNORE_PATTERNS, name)
        && matches_any(ALLOW_PATTERNS, name)
}

/// Download the tokenizer files of one model into `out_dir/<key>/`.
///
/// Returns the written paths.
pub fn fetch_model(
    api: &Api,
    entry: &ModelEntry,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, FetchError> {
    let hub_error = |e: hf_hub::api::sync::ApiError| FetchError::Hub {
        repo: entry.upstream_id.clone(),
        message: e.to_string(),
    };

    let repo = api.model(entry.upstream_id.clone());
    let info = repo.info().map_err(hub_error)?;

    let assets: Vec<&str> = info
        .siblings
        .iter()
        .map(|s| s.rfilename.as_str())
        .filter(|name| is_tokenizer_asset(name))
        .collect();
    if assets.is_empty() {
        return Err(FetchError::NoTokenizerFiles(entry.upstream_id.clone()));
    }

    let model_dir = out_dir.join(&entry.key);
    std::fs::create_dir_all(&model_dir)?;

    let mut written = Vec::with_capacity(assets.len());
    for name in assets {
        let cached = repo.get(name).map_err(hub_error)?;
        let target = model_dir.join(name);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&cached, &target)?;
        written.push(target);
    }
    ensure_loadable(&model_dir, &entry.upstream_id)?;

    info!(model = %entry.key, files = written.len(), dir = %model_dir.display(), "fetched tokenizer");
    Ok(written)
}

/// Fail when `model_dir` holds no definition the local loader can read
pub fn ensure_loadable(model_dir: &Path, repo: &str) -> Result<(), FetchError> {
    match Definition::find(model_dir) {
        Some(_) => Ok(()),
        None => {
            warn!(repo, dir = %model_dir.display(), "fetched files hold no loadable tokenizer");
            Err(FetchError::NoTokenizerFiles(repo.to_string()))
        }
    }
}

/// Outcome of [`fetch_all`]
#[derive(Debug, Default)]
pub struct FetchSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, FetchError)>,
}

impl FetchSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Fetch every entry, then write the model index.
///
/// A failing model is recorded in the summary and does not stop the
/// others. The index lists every requested entry, fetched or not.
pub fn fetch_all(
    entries: &[ModelEntry],
    out_dir: &Path,
    cache_dir: Option<&Path>,
) -> Result<FetchSummary, FetchError> {
    std::fs::create_dir_all(out_dir)?;
    let api = hub_api(cache_dir).map_err(|e| FetchError::Hub {
        repo: "huggingface.co".to_string(),
        message: e.to_string(),
    })?;

    let mut summary = FetchSummary::default();
    for entry in entries {
        info!(model = %entry.key, repo = %entry.upstream_id, "fetching");
        match fetch_model(&api, entry, out_dir) {
            Ok(_) => summary.succeeded.push(entry.key.clone()),
            Err(e) => {
                warn!(model = %entry.key, error = %e, "fetch failed");
                summary.failed.push((entry.key.clone(), e));
            }
        }
    }

    write_index(entries, out_dir)?;
    Ok(summary)
}

/// Write `models_index.json` for `entries` into `out_dir`
pub fn write_index(entries: &[ModelEntry], out_dir: &Path) -> Result<PathBuf, FetchError> {
    let path = out_dir.join(INDEX_FILE);
    ModelCatalog::from_entries(entries.iter().cloned()).write_index(&path)?;
    Ok(path)
}
