//! Command line front end for tokenmeter
//!
//! This crate provides:
//! - `tokenmeter`: count the tokens of a file, a string or piped stdin under
//!   every available tokenizer and print a table
//! - `tokenmeter-fetch`: download tokenizer assets for offline use

pub mod args;
mod error;
pub mod input;
pub mod report;
pub mod run;

pub use args::{log_filter, CountArgs, FetchArgs};
pub use error::CliError;
pub use input::InputSource;
pub use report::{render_catalog, render_header, render_table};
pub use run::{
    check_fetch, count_text, render_fetch_summary, run_count, run_fetch, write_report, Terminal,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log to stderr so stdout only carries the report
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
