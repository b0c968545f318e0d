//! Command line arguments of `tokenmeter` and `tokenmeter-fetch`.

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::Parser;
use tokenmeter_core::{builtin_keys, ModeSetting};

const EXAMPLES: &str = "\
Examples:
  tokenmeter -f input.txt
  tokenmeter -t \"Hello, world!\"
  tokenmeter -t \"Hello\" --models qwen3-8b deepseek-v3
  echo \"Hello\" | tokenmeter";

fn model_key_parser() -> PossibleValuesParser {
    PossibleValuesParser::new(builtin_keys())
}

/// Count the tokens of a text under several LLM tokenizers.
#[derive(Parser, Debug, Clone)]
#[command(name = "tokenmeter")]
#[command(version, after_help = EXAMPLES)]
pub struct CountArgs {
    /// Read the text from a UTF-8 file; takes priority over --text
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Count this text
    #[arg(short = 't', long)]
    pub text: Option<String>,

    /// Only use these models (default: all available)
    #[arg(long, num_args = 1.., value_parser = model_key_parser())]
    pub models: Vec<String>,

    /// Print the supported models and exit
    #[arg(long)]
    pub list_models: bool,

    /// Where tokenizers come from: auto, local or remote
    #[arg(long, default_value = "auto", env = "TOKENMETER_MODE")]
    pub mode: ModeSetting,

    /// Directory with one subdirectory of tokenizer files per model
    #[arg(long, default_value = "./tokenizers", env = "TOKENMETER_TOKENIZERS_DIR")]
    pub tokenizers_dir: PathBuf,

    /// Hub cache directory for remote mode
    #[arg(long, env = "TOKENMETER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Log tokenizer loading
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Download tokenizer files for offline use.
#[derive(Parser, Debug, Clone)]
#[command(name = "tokenmeter-fetch")]
#[command(version)]
pub struct FetchArgs {
    /// Directory to write the tokenizers to
    #[arg(short = 'o', long, default_value = "./tokenizers", env = "TOKENMETER_TOKENIZERS_DIR")]
    pub output: PathBuf,

    /// Only fetch these models (default: all)
    #[arg(long, num_args = 1.., value_parser = model_key_parser())]
    pub models: Vec<String>,

    /// Hub cache directory
    #[arg(long, env = "TOKENMETER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Default `tracing` filter when `RUST_LOG` is not set
pub fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "tokenmeter_core=info,tokenmeter_cli=info"
    } else {
        "tokenmeter_core=error,tokenmeter_cli=warn"
    }
}
