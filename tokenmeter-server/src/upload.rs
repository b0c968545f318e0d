//! Decoding of uploaded text files.
//!
//! Uploads are accepted as UTF-8 first and GBK second. The bytes are only
//! ever held in memory.

use encoding_rs::GBK;

use crate::error::ServerError;

/// Decode `bytes` as UTF-8, falling back to GBK.
pub fn decode_text(bytes: &[u8]) -> Result<String, ServerError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    GBK.decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or(ServerError::Decode)
}
