//! Error types for tokenmeter
//!
//! Errors are split by the layer that produces them, so that callers can
//! tell a per-model failure (which only removes one model from a batch)
//! from a failure that leaves nothing to count with.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to materialize a tokenizer for one model key.
///
/// Load errors never abort a registry build; the model is skipped and
/// reported as missing.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Key is not part of the catalog (remote mode)
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    /// The local tokenizer directory or file does not exist
    #[error("tokenizer not found at {}", .0.display())]
    NotFound(PathBuf),

    /// Fetching assets from the hub failed
    #[error("download failed for {repo}: {message}")]
    Download { repo: String, message: String },

    /// The tokenizer definition could not be parsed
    #[error("failed to parse tokenizer {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Failure inside the tokenizer library while encoding or decoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error("decode failed for token {id}: {message}")]
    Decode { id: u32, message: String },
}

/// Errors surfaced to the caller of a counting request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CountError {
    /// No text was supplied, or it was empty
    #[error("no text provided")]
    EmptyText,

    /// None of the requested models is loaded
    #[error("none of the selected models are available: {}", .0.join(", "))]
    NoModelsAvailable(Vec<String>),

    /// The registry holds no tokenizer at all
    #[error("no tokenizers available")]
    NoTokenizers,
}

impl CountError {
    /// Returns true if the error is caused by the request rather than the
    /// state of the registry
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::EmptyText | Self::NoModelsAvailable(_))
    }
}

/// Errors reading or writing the model index file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read index {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write index {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid index {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors while downloading tokenizer assets to disk.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("hub error for {repo}: {message}")]
    Hub { repo: String, message: String },

    #[error("no tokenizer files found in {0}")]
    NoTokenizerFiles(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
