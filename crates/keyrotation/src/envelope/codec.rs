//! Envelope encoder and decoder.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::{CipherEnvelope, CipherMetaData, EnvelopeError};

/// Pack a ciphertext and its IV into one self-contained Base64 string.
///
/// Both inputs may have any length, including zero. The result is
/// deterministic for identical inputs.
///
/// # Errors
///
/// Returns [`EnvelopeError::Encoding`] if the envelope cannot be serialised
/// (unreachable for byte input, kept for callers that match exhaustively).
pub fn encode(ciphertext: &[u8], iv: &[u8]) -> Result<String, EnvelopeError> {
    let json = CipherEnvelope::from_raw(ciphertext, iv).to_json()?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Parse the JSON bytes of an envelope into its ciphertext and IV.
///
/// `envelope_bytes` is the envelope *after* the outer Base64 layer has been
/// removed. The returned values are still Base64 text.
///
/// # Errors
///
/// Returns [`EnvelopeError::Parse`] for invalid UTF-8 or malformed JSON and
/// [`EnvelopeError::MissingField`] when `cipher` or `initializationVector`
/// is absent or `null`.
pub fn decode(envelope_bytes: &[u8]) -> Result<CipherMetaData, EnvelopeError> {
    CipherEnvelope::from_json(envelope_bytes).map(CipherMetaData::from)
}

/// Strip the outer Base64 layer of a stored envelope, then [`decode`] it.
///
/// # Errors
///
/// Returns [`EnvelopeError::InvalidBase64`] if `encoded` is not Base64, or any
/// error [`decode`] returns.
pub fn decode_self_contained(encoded: &str) -> Result<CipherMetaData, EnvelopeError> {
    let json = STANDARD
        .decode(encoded.trim())
        .map_err(|_| EnvelopeError::InvalidBase64 { field: "envelope" })?;
    decode(&json)
}
