//! CLI-specific error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors that end a CLI run with exit code 1
#[derive(Debug, Error)]
pub enum CliError {
    /// The `--file` argument points nowhere
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Input exists but could not be read as UTF-8 text
    #[error("cannot read {source_name}: {reason}")]
    Unreadable { source_name: String, reason: String },

    /// No `--file`, no `--text` and stdin is a terminal
    #[error("no input: use -f, -t or pipe text on stdin")]
    NoInput,

    /// The resolved text is empty
    #[error("input text is empty")]
    EmptyText,

    /// Counting failed (nothing loaded, no requested model available)
    #[error(transparent)]
    Count(#[from] tokenmeter_core::CountError),

    /// Some tokenizer downloads failed
    #[error("{failed} of {total} downloads failed")]
    FetchIncomplete { failed: usize, total: usize },

    #[error(transparent)]
    Fetch(#[from] tokenmeter_core::FetchError),

    /// IO error (stdout, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
