//! Data-URI payload handling for image annotations.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("image source is not a data URI")]
    NotDataUri,
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Decoded image bytes plus the PNG/JPEG call the exporter needs.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub is_png: bool,
}

/// Decode a `data:<media type>;base64,<payload>` URI.
///
/// PNG is recognized by the declared media type or, failing that, by the
/// `0x89` first byte of the decoded payload; anything else is treated as
/// JPEG by the exporter.
pub fn decode_data_uri(src: &str) -> Result<ImagePayload, PayloadError> {
    let (header, data) = src.split_once(',').ok_or(PayloadError::NotDataUri)?;
    let bytes = STANDARD.decode(data.trim())?;
    let is_png = header.contains("image/png") || bytes.first().is_some_and(|&b| b == 0x89);
    Ok(ImagePayload { bytes, is_png })
}

pub fn encode_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}
