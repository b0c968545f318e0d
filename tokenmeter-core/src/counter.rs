//! Token counting and decoding
//!
//! Counting runs against a [`Selection`]: a request-scoped list of handles
//! narrowed from the shared [`LoadedTokenizers`]. Building a selection
//! clones `Arc`s only and never writes back into the registry, so
//! concurrent requests with different model lists cannot observe each
//! other.
//!
//! Per-model failures are values. A tokenizer that fails to encode yields
//! an `Err` in its [`ModelOutcome`] while the rest of the batch completes.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::error::{CountError, TokenizeError};
use crate::registry::LoadedTokenizers;
use crate::tokenizer::TokenEncoder;

/// Token count reported for a model whose tokenizer failed
pub const COUNT_FAILED: i64 = -1;

/// Number of tokens decoded for the preview
pub const PREVIEW_TOKENS: usize = 100;

/// Number of characters kept in the text preview
pub const PREVIEW_CHARS: usize = 200;

/// Characters per token; 0 when there are no tokens
pub fn ratio(text_chars: usize, token_count: usize) -> f64 {
    if token_count == 0 {
        0.0
    } else {
        text_chars as f64 / token_count as f64
    }
}

/// Round to two decimals for display
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// First `max_chars` characters, with `...` appended when truncated
pub fn preview_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Lookup of encoders by model key, with the counting operations on top.
///
/// Unknown keys are not errors: `count` gives 0 and the id/decode
/// operations give empty sequences.
pub trait TokenCounting {
    fn encoder(&self, key: &str) -> Option<&dyn TokenEncoder>;

    /// Number of tokens in `text`, special tokens excluded
    fn count(&self, text: &str, key: &str) -> Result<usize, TokenizeError> {
        Ok(self.token_ids(text, key)?.len())
    }

    fn token_ids(&self, text: &str, key: &str) -> Result<Vec<u32>, TokenizeError> {
        match self.encoder(key) {
            Some(encoder) => encoder.encode(text),
            None => Ok(Vec::new()),
        }
    }

    /// Decode every id on its own so token boundaries stay visible
    fn decode_each(&self, ids: &[u32], key: &str) -> Result<Vec<String>, TokenizeError> {
        match self.encoder(key) {
            Some(encoder) => ids.iter().map(|id| encoder.decode_token(*id)).collect(),
            None => Ok(Vec::new()),
        }
    }
}

impl TokenCounting for LoadedTokenizers {
    fn encoder(&self, key: &str) -> Option<&dyn TokenEncoder> {
        self.tokenizers.get(key).map(|e| e.as_ref())
    }
}

impl LoadedTokenizers {
    /// Narrow to the requested keys.
    ///
    /// An empty request selects every loaded model. Otherwise the result is
    /// the requested keys that are loaded, in request order, without
    /// duplicates.
    pub fn select<S: AsRef<str>>(&self, requested: &[S]) -> Result<Selection, CountError> {
        if self.tokenizers.is_empty() {
            return Err(CountError::NoTokenizers);
        }

        let keys: Vec<&str> = if requested.is_empty() {
            self.tokenizers.keys().map(String::as_str).collect()
        } else {
            let mut keys: Vec<&str> = Vec::new();
            for key in requested.iter().map(AsRef::as_ref) {
                if self.tokenizers.contains_key(key) && !keys.contains(&key) {
                    keys.push(key);
                }
            }
            keys
        };

        if keys.is_empty() {
            return Err(CountError::NoModelsAvailable(
                requested.iter().map(|k| k.as_ref().to_string()).collect(),
            ));
        }

        let models = keys
            .into_iter()
            .filter_map(|key| {
                self.tokenizers.get(key).map(|encoder| SelectedModel {
                    key: key.to_string(),
                    name: self.catalog.display_name(key).to_string(),
                    encoder: encoder.clone(),
                })
            })
            .collect();

        Ok(Selection { models })
    }
}

struct SelectedModel {
    key: String,
    name: String,
    encoder: Arc<dyn TokenEncoder>,
}

/// Request-scoped subset of the loaded tokenizers
pub struct Selection {
    models: Vec<SelectedModel>,
}

impl Selection {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Count `text` with every selected model.
    ///
    /// Outcomes are sorted by model key.
    pub fn calculate(&self, text: &str) -> Result<Calculation, CountError> {
        if text.is_empty() {
            return Err(CountError::EmptyText);
        }

        let text_length = text.chars().count();
        let mut outcomes: Vec<ModelOutcome> = self
            .models
            .iter()
            .map(|model| ModelOutcome {
                model: model.key.clone(),
                model_name: model.name.clone(),
                result: report_for(model, text, text_length),
            })
            .collect();
        outcomes.sort_by(|a, b| a.model.cmp(&b.model));

        Ok(Calculation {
            text_length,
            text_preview: preview_text(text, PREVIEW_CHARS),
            outcomes,
        })
    }
}

impl TokenCounting for Selection {
    fn encoder(&self, key: &str) -> Option<&dyn TokenEncoder> {
        self.models
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.encoder.as_ref())
    }
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

fn report_for(
    model: &SelectedModel,
    text: &str,
    text_length: usize,
) -> Result<ModelReport, TokenizeError> {
    let ids = model.encoder.encode(text).inspect_err(|e| {
        warn!(model = %model.key, error = %e, "token count failed");
    })?;

    let preview_ids = &ids[..ids.len().min(PREVIEW_TOKENS)];
    let token_preview = preview_ids
        .iter()
        .map(|id| model.encoder.decode_token(*id))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| {
            warn!(model = %model.key, error = %e, "token preview failed");
            Vec::new()
        });

    Ok(ModelReport {
        token_count: ids.len(),
        char_per_token: round2(ratio(text_length, ids.len())),
        preview_count: token_preview.len(),
        token_preview,
    })
}

/// Result of counting one text against a selection
#[derive(Debug, Clone)]
pub struct Calculation {
    /// Length of the text in characters
    pub text_length: usize,
    pub text_preview: String,
    /// One outcome per selected model, sorted by key
    pub outcomes: Vec<ModelOutcome>,
}

impl Calculation {
    /// Successful reports with their model keys
    pub fn successes(&self) -> impl Iterator<Item = (&ModelOutcome, &ModelReport)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|r| (o, r)))
    }

    /// Mean token count over successful models
    pub fn average_tokens(&self) -> Option<f64> {
        let counts: Vec<usize> = self.successes().map(|(_, r)| r.token_count).collect();
        if counts.is_empty() {
            return None;
        }
        Some(counts.iter().sum::<usize>() as f64 / counts.len() as f64)
    }
}

#[derive(Debug, Clone)]
pub struct ModelOutcome {
    pub model: String,
    pub model_name: String,
    pub result: Result<ModelReport, TokenizeError>,
}

impl ModelOutcome {
    /// Token count, or [`COUNT_FAILED`]
    pub fn token_count(&self) -> i64 {
        match &self.result {
            Ok(report) => report.token_count as i64,
            Err(_) => COUNT_FAILED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelReport {
    pub token_count: usize,
    pub char_per_token: f64,
    /// Decoded strings for the first tokens, one per id
    pub token_preview: Vec<String>,
    pub preview_count: usize,
}

#[cfg(test)]
#[path = "counter_tests.rs"]
mod tests;
