//! tokenmeter-fetch - download tokenizer assets for offline use

use anyhow::Result;
use clap::Parser;
use tokenmeter_cli::{
    check_fetch, init_tracing, render_fetch_summary, run_fetch, write_report, FetchArgs,
};

fn main() -> Result<()> {
    let args = FetchArgs::parse();
    init_tracing("tokenmeter_core=info,tokenmeter_cli=info");

    let summary = run_fetch(&args)?;
    let report = format!(
        "{}Tokenizers saved to {}\n",
        render_fetch_summary(&summary),
        args.output.display()
    );
    write_report(std::io::stdout().lock(), &report)?;

    check_fetch(&summary)?;
    Ok(())
}
