//! Tokenizer seam
//!
//! [`TokenEncoder`] is the only surface the registry and the counting
//! wrapper see. The production implementation wraps a HuggingFace
//! `tokenizers::Tokenizer`; tests plug in deterministic encoders from
//! [`crate::test_utils`].

use std::path::{Path, PathBuf};

use tokenizers::decoders::wordpiece::WordPiece as WordPieceDecoder;
use tokenizers::models::bpe::BPE;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::pre_tokenizers::byte_level::ByteLevel;

use crate::error::{LoadError, TokenizeError};

/// File that holds a complete tokenizer definition
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// File that marks a directory as a tokenizer even without a definition
pub const TOKENIZER_CONFIG_FILE: &str = "tokenizer_config.json";

/// Byte-level BPE vocabulary, paired with [`MERGES_FILE`]
pub const VOCAB_JSON_FILE: &str = "vocab.json";
pub const MERGES_FILE: &str = "merges.txt";
/// WordPiece vocabulary, one token per line
pub const VOCAB_TXT_FILE: &str = "vocab.txt";

/// The tokenizer definition a model directory provides
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    /// A complete `tokenizer.json`
    Json(PathBuf),
    /// GPT-2 style `vocab.json` + `merges.txt`
    ByteLevelBpe { vocab: PathBuf, merges: PathBuf },
    /// BERT style `vocab.txt`
    WordPiece { vocab: PathBuf },
}

impl Definition {
    /// Best definition found in `dir`, preferring `tokenizer.json`
    pub fn find(dir: &Path) -> Option<Self> {
        let json = dir.join(TOKENIZER_FILE);
        if json.is_file() {
            return Some(Self::Json(json));
        }

        let vocab = dir.join(VOCAB_JSON_FILE);
        let merges = dir.join(MERGES_FILE);
        if vocab.is_file() && merges.is_file() {
            return Some(Self::ByteLevelBpe { vocab, merges });
        }

        let vocab = dir.join(VOCAB_TXT_FILE);
        vocab.is_file().then_some(Self::WordPiece { vocab })
    }

    /// File reported when the definition fails to parse
    fn path(&self) -> &Path {
        match self {
            Self::Json(path) => path,
            Self::ByteLevelBpe { vocab, .. } | Self::WordPiece { vocab } => vocab,
        }
    }

    fn build(&self) -> tokenizers::Result<tokenizers::Tokenizer> {
        match self {
            Self::Json(path) => tokenizers::Tokenizer::from_file(path),
            Self::ByteLevelBpe { vocab, merges } => {
                let model =
                    BPE::from_file(&vocab.to_string_lossy(), &merges.to_string_lossy()).build()?;
                let mut tokenizer = tokenizers::Tokenizer::new(model);
                tokenizer
                    .with_pre_tokenizer(Some(ByteLevel::default().add_prefix_space(false)))
                    .with_decoder(Some(ByteLevel::default()));
                Ok(tokenizer)
            }
            Self::WordPiece { vocab } => {
                let model = WordPiece::from_file(&vocab.to_string_lossy()).build()?;
                let mut tokenizer = tokenizers::Tokenizer::new(model);
                tokenizer
                    .with_normalizer(Some(BertNormalizer::default()))
                    .with_pre_tokenizer(Some(BertPreTokenizer))
                    .with_decoder(Some(WordPieceDecoder::default()));
                Ok(tokenizer)
            }
        }
    }
}

/// A loaded tokenizer for one model.
///
/// Implementations never add model specific special tokens (BOS/EOS,
/// chat markers) when encoding, so counts reflect the raw content only.
pub trait TokenEncoder: Send + Sync {
    /// Encode text into token ids
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizeError>;

    /// Decode a single token id into its printable form
    fn decode_token(&self, id: u32) -> Result<String, TokenizeError>;
}

/// [`TokenEncoder`] backed by a HuggingFace tokenizer definition
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
}

impl HfTokenizer {
    /// Load from a `tokenizer.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Self { inner })
    }

    /// Load from a model directory.
    ///
    /// Uses `tokenizer.json` when present, else `vocab.json` + `merges.txt`
    /// as byte-level BPE, else `vocab.txt` as WordPiece.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(LoadError::NotFound(dir.to_path_buf()));
        }
        let definition =
            Definition::find(dir).ok_or_else(|| LoadError::NotFound(dir.join(TOKENIZER_FILE)))?;
        Self::from_definition(&definition)
    }

    pub fn from_definition(definition: &Definition) -> Result<Self, LoadError> {
        let inner = definition.build().map_err(|e| LoadError::Parse {
            path: definition.path().to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self { inner })
    }

    pub fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }
}

impl TokenEncoder for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizeError> {
        self.inner
            .encode(text, false)
            .map(|encoding| encoding.get_ids().to_vec())
            .map_err(|e| TokenizeError::Encode(e.to_string()))
    }

    fn decode_token(&self, id: u32) -> Result<String, TokenizeError> {
        self.inner
            .decode(&[id], false)
            .map_err(|e| TokenizeError::Decode {
                id,
                message: e.to_string(),
            })
    }
}

impl std::fmt::Debug for HfTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTokenizer")
            .field("vocab_size", &self.vocab_size())
            .finish()
    }
}

#[cfg(test)]
#[path = "tokenizer_tests.rs"]
mod tests;
