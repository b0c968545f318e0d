//! The work behind each binary, kept apart from process setup so it can be
//! driven from tests.

use std::io::{Read, Write};

use tokenmeter_core::{
    fetch_all, loader_for, CountError, FetchSummary, ModelCatalog, ModelEntry, TokenizerRegistry,
};
use tracing::{debug, info};

use crate::args::{CountArgs, FetchArgs};
use crate::error::CliError;
use crate::input::InputSource;
use crate::report::{render_catalog, render_header, render_table};

/// Terminal facts the count command depends on
#[derive(Debug, Clone, Copy, Default)]
pub struct Terminal {
    pub stdin_is_terminal: bool,
    /// Color failed rows
    pub color: bool,
}

/// Run `tokenmeter` and return what should go to stdout
pub fn run_count(args: &CountArgs, stdin: impl Read, terminal: Terminal) -> Result<String, CliError> {
    if args.list_models {
        return Ok(render_catalog(&ModelCatalog::builtin()));
    }

    let source = InputSource::select(
        args.file.as_deref(),
        args.text.as_deref(),
        terminal.stdin_is_terminal,
    );
    let text = source.read(stdin)?;

    let mode = args.mode.resolve(&args.tokenizers_dir);
    debug!(%mode, dir = %args.tokenizers_dir.display(), "resolved loading mode");
    let registry = TokenizerRegistry::from_arc(loader_for(
        mode,
        args.tokenizers_dir.clone(),
        args.cache_dir.clone(),
    ))
    .with_selection(args.models.iter().cloned());

    count_text(&registry, &args.models, &text, terminal.color)
}

/// Count `text` with the registry's models and render the report
pub fn count_text(
    registry: &TokenizerRegistry,
    models: &[String],
    text: &str,
    color: bool,
) -> Result<String, CliError> {
    let loaded = registry.get_or_build();
    if loaded.is_empty() {
        return Err(CountError::NoTokenizers.into());
    }

    let calculation = loaded.select(models)?.calculate(text)?;
    Ok(format!(
        "{}\n{}",
        render_header(text),
        render_table(&calculation, color)
    ))
}

/// Write a rendered report and flush it
pub fn write_report(mut out: impl Write, report: &str) -> Result<(), CliError> {
    out.write_all(report.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Catalog entries for the requested keys, or the whole catalog
pub fn fetch_entries(catalog: &ModelCatalog, models: &[String]) -> Vec<ModelEntry> {
    if models.is_empty() {
        return catalog.entries().cloned().collect();
    }
    models
        .iter()
        .filter_map(|key| catalog.get(key).cloned())
        .collect()
}

/// Run `tokenmeter-fetch`
pub fn run_fetch(args: &FetchArgs) -> Result<FetchSummary, CliError> {
    let entries = fetch_entries(&ModelCatalog::builtin(), &args.models);
    info!(count = entries.len(), dir = %args.output.display(), "fetching tokenizers");

    let summary = fetch_all(&entries, &args.output, args.cache_dir.as_deref())?;
    Ok(summary)
}

/// Render a fetch summary; an incomplete fetch is an error after printing
pub fn render_fetch_summary(summary: &FetchSummary) -> String {
    let mut out = String::new();
    for key in &summary.succeeded {
        out.push_str(&format!("  ok      {key}\n"));
    }
    for (key, error) in &summary.failed {
        out.push_str(&format!("  failed  {key}: {error}\n"));
    }
    out.push_str(&format!(
        "{} of {} models fetched\n",
        summary.succeeded.len(),
        summary.total()
    ));
    out
}

/// Turn a summary into the command's exit status
pub fn check_fetch(summary: &FetchSummary) -> Result<(), CliError> {
    if summary.is_complete() {
        Ok(())
    } else {
        Err(CliError::FetchIncomplete {
            failed: summary.failed.len(),
            total: summary.total(),
        })
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
