//! # Tokenmeter
//!
//! Count how many tokens a piece of text costs under several LLM
//! tokenizers at once, and see where the token boundaries fall.
//!
//! Tokenizers are loaded either from a local directory of downloaded
//! tokenizer assets or from the HuggingFace Hub, once per process, into a
//! [`TokenizerRegistry`]. Requests narrow the registry to the models they
//! care about and count against that [`Selection`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use tokenmeter_core::{LocalLoader, TokenizerRegistry};
//!
//! let registry = TokenizerRegistry::new(LocalLoader::new("./tokenizers"));
//! let loaded = registry.get_or_build();
//!
//! let calculation = loaded.select(&["qwen3-8b"])?.calculate("Hello, world!")?;
//! for (outcome, report) in calculation.successes() {
//!     println!("{}: {} tokens", outcome.model_name, report.token_count);
//! }
//! # Ok::<(), tokenmeter_core::CountError>(())
//! ```
//!
//! ## Loading modes
//!
//! - **Local**: every subdirectory of the tokenizers directory that holds a
//!   `tokenizer.json` or `tokenizer_config.json` is one model
//! - **Remote**: every key of the built-in [`ModelCatalog`] is fetched from
//!   the hub (cached under the hub cache directory)
//!
//! [`ModeSetting::Auto`] picks local mode when the tokenizers directory
//! exists and is not empty.
//!
//! ## Feature Flags
//!
//! - `test-utils` - deterministic tokenizers and a scripted loader for tests

pub mod catalog;
pub mod counter;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod registry;
pub mod tokenizer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use catalog::{builtin_keys, ModelCatalog, ModelEntry, INDEX_FILE};
pub use counter::{
    ratio, round2, Calculation, ModelOutcome, ModelReport, Selection, TokenCounting,
    COUNT_FAILED, PREVIEW_CHARS, PREVIEW_TOKENS,
};
pub use error::{CatalogError, CountError, FetchError, LoadError, TokenizeError};
pub use fetch::{fetch_all, fetch_model, FetchSummary};
pub use loader::{loader_for, LoadMode, LocalLoader, ModeSetting, RemoteLoader, TokenizerLoader};
pub use registry::{HealthReport, HealthStatus, LoadedTokenizers, TokenizerRegistry};
pub use tokenizer::{
    Definition, HfTokenizer, TokenEncoder, MERGES_FILE, TOKENIZER_CONFIG_FILE, TOKENIZER_FILE,
    VOCAB_JSON_FILE, VOCAB_TXT_FILE,
};
