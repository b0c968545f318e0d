//! Test utilities for tokenmeter-core.
//!
//! Deterministic tokenizers and a scripted loader, so that registry and
//! counting behaviour can be tested without downloading real tokenizer
//! assets.
//!
//! Enable with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! tokenmeter-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust
//! use tokenmeter_core::test_utils::StaticLoader;
//! use tokenmeter_core::TokenizerRegistry;
//!
//! let loader = StaticLoader::new().with_char_model("a").with_char_model("b");
//! let registry = TokenizerRegistry::new(loader.clone());
//!
//! let loaded = registry.get_or_build();
//! assert_eq!(loaded.len(), 2);
//! assert_eq!(loader.load_count(), 2);
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{ModelCatalog, ModelEntry};
use crate::error::{LoadError, TokenizeError};
use crate::loader::{LoadMode, TokenizerLoader};
use crate::tokenizer::{
    TokenEncoder, MERGES_FILE, TOKENIZER_CONFIG_FILE, TOKENIZER_FILE, VOCAB_JSON_FILE,
};

/// Maps every `char` to one token whose id is its code point.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl TokenEncoder for CharTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizeError> {
        Ok(text.chars().map(u32::from).collect())
    }

    fn decode_token(&self, id: u32) -> Result<String, TokenizeError> {
        char::from_u32(id)
            .map(String::from)
            .ok_or_else(|| TokenizeError::Decode {
                id,
                message: "not a scalar value".to_string(),
            })
    }
}

/// Fails every encode call.
#[derive(Debug, Clone, Default)]
pub struct FailingTokenizer {
    message: String,
}

impl FailingTokenizer {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl TokenEncoder for FailingTokenizer {
    fn encode(&self, _text: &str) -> Result<Vec<u32>, TokenizeError> {
        Err(TokenizeError::Encode(self.message.clone()))
    }

    fn decode_token(&self, id: u32) -> Result<String, TokenizeError> {
        Err(TokenizeError::Decode {
            id,
            message: self.message.clone(),
        })
    }
}

#[derive(Clone)]
enum Scripted {
    Ready(Arc<dyn TokenEncoder>),
    Broken(String),
}

/// A loader with a fixed script of models.
///
/// Every call to [`TokenizerLoader::load`] increments a shared counter,
/// which makes "built exactly once" observable from tests.
#[derive(Clone)]
pub struct StaticLoader {
    models: BTreeMap<String, Scripted>,
    mode: LoadMode,
    delay: Option<Duration>,
    loads: Arc<AtomicUsize>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self {
            models: BTreeMap::new(),
            mode: LoadMode::Local,
            delay: None,
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add a model that loads as a [`CharTokenizer`]
    pub fn with_char_model(self, key: impl Into<String>) -> Self {
        self.with_encoder(key, CharTokenizer)
    }

    pub fn with_encoder(
        mut self,
        key: impl Into<String>,
        encoder: impl TokenEncoder + 'static,
    ) -> Self {
        self.models
            .insert(key.into(), Scripted::Ready(Arc::new(encoder)));
        self
    }

    /// Add a model that is discovered but fails to load
    pub fn with_broken_model(
        mut self,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.models.insert(key.into(), Scripted::Broken(message.into()));
        self
    }

    pub fn with_mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sleep inside every `load`, to widen race windows in tests
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `load` calls made so far, across all clones
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl Default for StaticLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenizerLoader for StaticLoader {
    fn mode(&self) -> LoadMode {
        self.mode
    }

    fn catalog(&self) -> ModelCatalog {
        ModelCatalog::from_entries(
            self.models
                .keys()
                .map(|key| ModelEntry::new(key.clone(), format!("test/{}", key))),
        )
    }

    fn discover(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    fn load(&self, key: &str) -> Result<Arc<dyn TokenEncoder>, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        match self.models.get(key) {
            Some(Scripted::Ready(encoder)) => Ok(encoder.clone()),
            Some(Scripted::Broken(message)) => Err(LoadError::Parse {
                path: PathBuf::from(key),
                message: message.clone(),
            }),
            None => Err(LoadError::UnknownModel(key.to_string())),
        }
    }
}

/// A small WordPiece definition in `tokenizer.json` format.
///
/// Vocabulary: `[PAD]`=0, `[UNK]`=1, `[CLS]`=2, `[SEP]`=3, `hello`=4,
/// `world`=5, `test`=6, `token`=7, `##ization`=8, `rust`=9, `fast`=10,
/// `##er`=11. Input is lowercased and the post processor wraps sequences
/// in `[CLS] ... [SEP]`.
pub const WORDPIECE_TOKENIZER_JSON: &str = r###"{
  "version": "1.0",
  "truncation": null,
  "padding": null,
  "added_tokens": [
    {"id": 0, "content": "[PAD]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
    {"id": 1, "content": "[UNK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
    {"id": 2, "content": "[CLS]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
    {"id": 3, "content": "[SEP]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
  ],
  "normalizer": {
    "type": "Sequence",
    "normalizers": [
      {"type": "NFD"},
      {"type": "Lowercase"},
      {"type": "StripAccents"}
    ]
  },
  "pre_tokenizer": {"type": "Whitespace"},
  "post_processor": {
    "type": "TemplateProcessing",
    "single": [
      {"SpecialToken": {"id": "[CLS]", "type_id": 0}},
      {"Sequence": {"id": "A", "type_id": 0}},
      {"SpecialToken": {"id": "[SEP]", "type_id": 0}}
    ],
    "pair": [
      {"SpecialToken": {"id": "[CLS]", "type_id": 0}},
      {"Sequence": {"id": "A", "type_id": 0}},
      {"SpecialToken": {"id": "[SEP]", "type_id": 0}},
      {"Sequence": {"id": "B", "type_id": 1}},
      {"SpecialToken": {"id": "[SEP]", "type_id": 1}}
    ],
    "special_tokens": {
      "[CLS]": {"id": "[CLS]", "ids": [2], "tokens": ["[CLS]"]},
      "[SEP]": {"id": "[SEP]", "ids": [3], "tokens": ["[SEP]"]}
    }
  },
  "decoder": {"type": "WordPiece", "prefix": "##", "cleanup": true},
  "model": {
    "type": "WordPiece",
    "unk_token": "[UNK]",
    "continuing_subword_prefix": "##",
    "max_input_chars_per_word": 100,
    "vocab": {
      "[PAD]": 0, "[UNK]": 1, "[CLS]": 2, "[SEP]": 3,
      "hello": 4, "world": 5, "test": 6, "token": 7, "##ization": 8,
      "rust": 9, "fast": 10, "##er": 11
    }
  }
}"###;

/// Create `dir/key/tokenizer.json` with [`WORDPIECE_TOKENIZER_JSON`].
///
/// Returns the model directory.
pub fn write_wordpiece_model(dir: &Path, key: &str) -> std::io::Result<PathBuf> {
    let model_dir = dir.join(key);
    std::fs::create_dir_all(&model_dir)?;
    std::fs::write(model_dir.join(TOKENIZER_FILE), WORDPIECE_TOKENIZER_JSON)?;
    Ok(model_dir)
}

/// Byte-level BPE vocabulary: `a`=0, `b`=1, `c`=2, `ab`=3, `abc`=4
pub const BPE_VOCAB_JSON: &str = r#"{"a": 0, "b": 1, "c": 2, "ab": 3, "abc": 4}"#;
pub const BPE_MERGES_TXT: &str = "#version: 0.2\na b\nab c\n";

/// Create `dir/key/` with `tokenizer_config.json`, `vocab.json` and
/// `merges.txt` but no `tokenizer.json`.
pub fn write_bpe_model(dir: &Path, key: &str) -> std::io::Result<PathBuf> {
    let model_dir = dir.join(key);
    std::fs::create_dir_all(&model_dir)?;
    std::fs::write(model_dir.join(TOKENIZER_CONFIG_FILE), "{}")?;
    std::fs::write(model_dir.join(VOCAB_JSON_FILE), BPE_VOCAB_JSON)?;
    std::fs::write(model_dir.join(MERGES_FILE), BPE_MERGES_TXT)?;
    Ok(model_dir)
}
