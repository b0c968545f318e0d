//! Plain-text rendering of calculations and the model catalog

use std::fmt::Write;

use crossterm::style::Stylize;
use tokenmeter_core::counter::preview_text;
use tokenmeter_core::{Calculation, ModelCatalog};

/// Characters of input shown above the table
pub const HEADER_PREVIEW_CHARS: usize = 100;

const MODEL_HEADER: &str = "Model";
const TOKENS_HEADER: &str = "Tokens";
const RATIO_HEADER: &str = "Chars/Token";

/// Text length and a short preview of the input
pub fn render_header(text: &str) -> String {
    format!(
        "Text length: {} chars\nPreview: {}\n",
        text.chars().count(),
        preview_text(text, HEADER_PREVIEW_CHARS).replace('\n', " ")
    )
}

/// One row per model, then the average over successful models.
///
/// Failed models show `error` in both numeric columns, red when `color`
/// is set.
pub fn render_table(calculation: &Calculation, color: bool) -> String {
    let model_width = calculation
        .outcomes
        .iter()
        .map(|o| o.model.chars().count())
        .chain(std::iter::once(MODEL_HEADER.len()))
        .max()
        .unwrap_or(MODEL_HEADER.len());
    let rule = "-".repeat(model_width + TOKENS_HEADER.len() + RATIO_HEADER.len() + 8);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<model_width$}  {:>8}  {:>11}",
        MODEL_HEADER, TOKENS_HEADER, RATIO_HEADER
    );
    let _ = writeln!(out, "{rule}");

    for outcome in &calculation.outcomes {
        match &outcome.result {
            Ok(report) => {
                let _ = writeln!(
                    out,
                    "{:<model_width$}  {:>8}  {:>11.2}",
                    outcome.model, report.token_count, report.char_per_token
                );
            }
            Err(_) => {
                // Pad before styling so escape codes do not break alignment
                let cell = |width: usize| {
                    let padded = format!("{:>width$}", "error");
                    if color {
                        padded.red().to_string()
                    } else {
                        padded
                    }
                };
                let _ = writeln!(
                    out,
                    "{:<model_width$}  {}  {}",
                    outcome.model,
                    cell(8),
                    cell(11)
                );
            }
        }
    }

    if let Some(average) = calculation.average_tokens() {
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Average tokens: {average:.1}");
    }
    out
}

/// `--list-models` output: key and upstream repository per line
pub fn render_catalog(catalog: &ModelCatalog) -> String {
    let width = catalog.keys().map(str::len).max().unwrap_or(0);
    let mut out = String::from("Supported models:\n");
    for entry in catalog.entries() {
        let _ = writeln!(out, "  {:<width$}  {}", entry.key, entry.name());
    }
    out
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
