//! tokenmeter - count tokens under several LLM tokenizers

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tokenmeter_cli::{
    init_tracing, log_filter, run_count, write_report, CliError, CountArgs, Terminal,
};

fn main() -> ExitCode {
    let args = CountArgs::parse();
    init_tracing(log_filter(args.verbose));

    let terminal = Terminal {
        stdin_is_terminal: std::io::stdin().is_terminal(),
        color: std::io::stdout().is_terminal(),
    };

    let result = run_count(&args, std::io::stdin().lock(), terminal)
        .and_then(|report| write_report(std::io::stdout().lock(), &report));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::NoInput) => {
            let _ = CountArgs::command().print_help();
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
