use super::*;
use clap::Parser;
use std::io::Cursor;
use tempfile::TempDir;
use tokenmeter_core::test_utils::{write_wordpiece_model, FailingTokenizer, StaticLoader};
use tokenmeter_core::FetchError;

fn local_args(dir: &TempDir, extra: &[&str]) -> CountArgs {
    let dir = dir.path().to_string_lossy().into_owned();
    let mut argv = vec!["tokenmeter", "--mode", "local", "--tokenizers-dir", &dir];
    argv.extend_from_slice(extra);
    CountArgs::try_parse_from(argv).unwrap()
}

fn terminal() -> Terminal {
    Terminal {
        stdin_is_terminal: true,
        color: false,
    }
}

#[test]
fn test_count_from_text_flag() {
    let dir = TempDir::new().unwrap();
    write_wordpiece_model(dir.path(), "wp").unwrap();

    let out = run_count(
        &local_args(&dir, &["-t", "Hello world faster"]),
        std::io::empty(),
        terminal(),
    )
    .unwrap();

    assert!(out.starts_with("Text length: 18 chars\n"));
    let row = out.lines().find(|l| l.starts_with("wp ")).unwrap();
    assert!(row.contains(" 4 "));
    assert!(row.ends_with("4.50"));
    assert!(out.contains("Average tokens: 4.0"));
}

#[test]
fn test_count_from_piped_stdin() {
    let dir = TempDir::new().unwrap();
    write_wordpiece_model(dir.path(), "wp").unwrap();

    let piped = Terminal {
        stdin_is_terminal: false,
        color: false,
    };
    let out = run_count(&local_args(&dir, &[]), Cursor::new("hello"), piped).unwrap();

    assert!(out.contains("Preview: hello"));
}

#[test]
fn test_file_wins_over_text() {
    let dir = TempDir::new().unwrap();
    write_wordpiece_model(dir.path(), "wp").unwrap();
    let input = dir.path().join("input.txt");
    std::fs::write(&input, "rust token").unwrap();

    let out = run_count(
        &local_args(&dir, &["-f", input.to_str().unwrap(), "-t", "hello"]),
        std::io::empty(),
        terminal(),
    )
    .unwrap();

    assert!(out.contains("Preview: rust token"));
}

#[test]
fn test_no_input_on_terminal() {
    let dir = TempDir::new().unwrap();
    write_wordpiece_model(dir.path(), "wp").unwrap();

    let result = run_count(&local_args(&dir, &[]), std::io::empty(), terminal());
    assert!(matches!(result, Err(CliError::NoInput)));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.txt");

    let result = run_count(
        &local_args(&dir, &["-f", missing.to_str().unwrap()]),
        std::io::empty(),
        terminal(),
    );
    assert!(matches!(result, Err(CliError::FileNotFound(_))));
}

#[test]
fn test_empty_tokenizer_dir() {
    let dir = TempDir::new().unwrap();

    let result = run_count(&local_args(&dir, &["-t", "hi"]), std::io::empty(), terminal());
    assert!(matches!(
        result,
        Err(CliError::Count(CountError::NoTokenizers))
    ));
}

#[test]
fn test_list_models_skips_loading() {
    let dir = TempDir::new().unwrap();

    let out = run_count(&local_args(&dir, &["--list-models"]), std::io::empty(), terminal())
        .unwrap();
    assert!(out.starts_with("Supported models:"));
    assert!(out.contains("qwen3-8b"));
}

#[test]
fn test_count_with_failing_model() {
    let registry = TokenizerRegistry::new(
        StaticLoader::new()
            .with_char_model("a")
            .with_encoder("b", FailingTokenizer::new("broken")),
    );

    let out = count_text(&registry, &[], "abc", false).unwrap();

    let row = out.lines().find(|l| l.starts_with("b ")).unwrap();
    assert!(row.contains("error"));
    assert!(out.contains("Average tokens: 3.0"));
}

#[test]
fn test_count_only_selected_models() {
    let registry = TokenizerRegistry::new(
        StaticLoader::new()
            .with_char_model("a")
            .with_char_model("b")
            .with_char_model("c"),
    );
    let models = vec!["c".to_string(), "a".to_string()];

    let out = count_text(&registry, &models, "xy", false).unwrap();
    let rows: Vec<&str> = out
        .lines()
        .filter(|l| l.starts_with("a ") || l.starts_with("b ") || l.starts_with("c "))
        .collect();

    assert_eq!(rows.len(), 2);
}

#[test]
fn test_fetch_entries() {
    let catalog = ModelCatalog::builtin();

    assert_eq!(fetch_entries(&catalog, &[]).len(), catalog.len());

    let picked = fetch_entries(&catalog, &["qwen3-8b".to_string(), "unknown".to_string()]);
    assert_eq!(picked.len(), 1);
    assert_eq!(picked[0].upstream_id, "Qwen/Qwen3-8B");
}

#[test]
fn test_fetch_summary_rendering_and_status() {
    let complete = FetchSummary {
        succeeded: vec!["a".into(), "b".into()],
        failed: Vec::new(),
    };
    assert!(check_fetch(&complete).is_ok());
    assert!(render_fetch_summary(&complete).ends_with("2 of 2 models fetched\n"));

    let partial = FetchSummary {
        succeeded: vec!["a".into()],
        failed: vec![("b".into(), FetchError::NoTokenizerFiles("org/b".into()))],
    };
    let rendered = render_fetch_summary(&partial);
    assert!(rendered.contains("failed  b: no tokenizer files found in org/b"));
    assert!(matches!(
        check_fetch(&partial),
        Err(CliError::FetchIncomplete { failed: 1, total: 2 })
    ));
}

struct ClosedPipe;

impl std::io::Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_write_report() {
    let mut out = Vec::new();
    write_report(&mut out, "Average tokens: 1.0\n").unwrap();
    assert_eq!(out, b"Average tokens: 1.0\n");

    let result = write_report(ClosedPipe, "report");
    assert!(matches!(result, Err(CliError::Io(e)) if e.kind() == std::io::ErrorKind::BrokenPipe));
}
