//! Server configuration from command line arguments and environment.

use std::io;
use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use tokenmeter_core::{loader_for, ModeSetting, TokenizerRegistry};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Command-line arguments for the tokenmeter server.
#[derive(Parser, Debug, Clone)]
#[command(name = "tokenmeter-server")]
#[command(about = "Serve the tokenmeter web page and HTTP API")]
#[command(version)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    pub host: String,

    /// Port to listen on; the next port is tried when it is taken
    #[arg(long, short = 'p', default_value_t = 5001, env = "PORT")]
    pub port: u16,

    /// Verbose logs and error detail in responses
    #[arg(
        long,
        env = "DEBUG",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub debug: bool,

    /// Directory with one subdirectory of tokenizer files per model
    #[arg(long, default_value = "./tokenizers", env = "TOKENMETER_TOKENIZERS_DIR")]
    pub tokenizers_dir: PathBuf,

    /// Where tokenizers come from: auto, local or remote
    #[arg(long, default_value = "auto", env = "TOKENMETER_MODE")]
    pub mode: ModeSetting,

    /// Hub cache directory for remote mode
    #[arg(long, env = "TOKENMETER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

impl ServerArgs {
    /// Default `tracing` filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "tokenmeter_server=debug,tokenmeter_core=debug,tower_http=debug"
        } else {
            "tokenmeter_server=info,tokenmeter_core=info,tower_http=info"
        }
    }

    /// Create the (unbuilt) registry for the configured mode
    pub fn registry(&self) -> TokenizerRegistry {
        let mode = self.mode.resolve(&self.tokenizers_dir);
        info!(%mode, dir = %self.tokenizers_dir.display(), "tokenizer source");
        TokenizerRegistry::from_arc(loader_for(
            mode,
            self.tokenizers_dir.clone(),
            self.cache_dir.clone(),
        ))
    }

    /// Bind the listener, falling back to `port + 1` once when the port is
    /// already in use.
    pub async fn bind(&self) -> io::Result<TcpListener> {
        bind_with_fallback(&self.host, self.port).await
    }
}

pub async fn bind_with_fallback(host: &str, port: u16) -> io::Result<TcpListener> {
    match TcpListener::bind((host, port)).await {
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
            let Some(next) = port.checked_add(1) else {
                return Err(e);
            };
            warn!(port, next, "port in use, trying the next one");
            TcpListener::bind((host, next)).await
        }
        result => result,
    }
}
