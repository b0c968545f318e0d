//! Resolve the text to count from `--file`, `--text` or stdin.

use std::io::Read;
use std::path::Path;

use crate::error::CliError;

/// Where the text came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource<'a> {
    File(&'a Path),
    Text(&'a str),
    /// Piped stdin
    Stdin,
    /// Nothing given and stdin is a terminal
    None,
}

impl<'a> InputSource<'a> {
    /// Priority: file, then text, then piped stdin
    pub fn select(file: Option<&'a Path>, text: Option<&'a str>, stdin_is_terminal: bool) -> Self {
        match (file, text) {
            (Some(path), _) => Self::File(path),
            (None, Some(text)) => Self::Text(text),
            (None, None) if !stdin_is_terminal => Self::Stdin,
            (None, None) => Self::None,
        }
    }

    /// Read the whole input. Empty text is an error.
    pub fn read(&self, stdin: impl Read) -> Result<String, CliError> {
        let text = match self {
            Self::File(path) => read_file(path)?,
            Self::Text(text) => text.to_string(),
            Self::Stdin => read_utf8(stdin, "stdin")?,
            Self::None => return Err(CliError::NoInput),
        };

        if text.is_empty() {
            return Err(CliError::EmptyText);
        }
        Ok(text)
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    if !path.is_file() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path).map_err(|e| CliError::Unreadable {
        source_name: path.display().to_string(),
        reason: e.to_string(),
    })?;
    read_utf8(file, &path.display().to_string())
}

fn read_utf8(mut reader: impl Read, source_name: &str) -> Result<String, CliError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| CliError::Unreadable {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })?;
    Ok(text)
}
