//! Envelope records exchanged between the encoder, the decoder and their callers.
//!
//! The wire form is a compact JSON object with exactly two string fields:
//!
//! ```text
//! {"cipher":"<base64(ciphertext)>","initializationVector":"<base64(iv)>"}
//! ```
//!
//! Field names are part of the stored-data contract and must never change.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::EnvelopeError;

/// JSON field holding the Base64 ciphertext.
pub const CIPHER_FIELD: &str = "cipher";

/// JSON field holding the Base64 initialization vector.
pub const IV_FIELD: &str = "initializationVector";

// ---------------------------------------------------------------------------
// Wire record
// ---------------------------------------------------------------------------

/// Serialised form of a self-contained ciphertext.
///
/// Both fields carry standard, padded Base64 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CipherEnvelope {
    /// Base64 of the raw ciphertext bytes.
    pub cipher: String,
    /// Base64 of the raw IV bytes.
    pub initialization_vector: String,
}

impl CipherEnvelope {
    /// Build an envelope from raw ciphertext and IV bytes, Base64-encoding each.
    pub fn from_raw(ciphertext: &[u8], iv: &[u8]) -> Self {
        Self {
            cipher: STANDARD.encode(ciphertext),
            initialization_vector: STANDARD.encode(iv),
        }
    }

    /// Serialise to compact JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Encoding`] if the serialiser fails.
    pub fn to_json(&self) -> Result<String, EnvelopeError> {
        serde_json::to_string(self).map_err(|e| EnvelopeError::Encoding(e.to_string()))
    }

    /// Parse envelope JSON bytes. Fields are matched by name; unknown extra
    /// fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Parse`] for invalid UTF-8, malformed JSON, a
    /// top-level value that is not an object, or non-string field values, and
    /// [`EnvelopeError::MissingField`] when either field is absent or `null`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let text = std::str::from_utf8(bytes).map_err(|e| EnvelopeError::Parse(e.to_string()))?;
        let value: Value =
            serde_json::from_str(text).map_err(|e| EnvelopeError::Parse(e.to_string()))?;
        let Value::Object(fields) = value else {
            return Err(EnvelopeError::Parse("envelope must be a JSON object".into()));
        };

        Ok(Self {
            cipher: string_field(&fields, CIPHER_FIELD)?,
            initialization_vector: string_field(&fields, IV_FIELD)?,
        })
    }
}

fn string_field(fields: &Map<String, Value>, name: &'static str) -> Result<String, EnvelopeError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(EnvelopeError::MissingField(name)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(EnvelopeError::Parse(format!("`{name}` must be a string"))),
    }
}

// ---------------------------------------------------------------------------
// Caller-facing record
// ---------------------------------------------------------------------------

/// Decoded envelope as handed to callers.
///
/// Holds the same two values as [`CipherEnvelope`] under caller-facing names.
/// Both values are still Base64 text; use [`CipherMetaData::cipher_text_bytes`]
/// and [`CipherMetaData::iv_bytes`] to obtain the raw bytes a decipher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherMetaData {
    cipher_text: String,
    iv: String,
}

impl CipherMetaData {
    /// Base64 text of the ciphertext.
    pub fn cipher_text(&self) -> &str {
        &self.cipher_text
    }

    /// Base64 text of the IV.
    pub fn iv(&self) -> &str {
        &self.iv
    }

    /// Raw ciphertext bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidBase64`] if the stored text is not Base64.
    pub fn cipher_text_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        STANDARD
            .decode(&self.cipher_text)
            .map_err(|_| EnvelopeError::InvalidBase64 { field: CIPHER_FIELD })
    }

    /// Raw IV bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidBase64`] if the stored text is not Base64.
    pub fn iv_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        STANDARD
            .decode(&self.iv)
            .map_err(|_| EnvelopeError::InvalidBase64 { field: IV_FIELD })
    }
}

impl From<CipherEnvelope> for CipherMetaData {
    fn from(envelope: CipherEnvelope) -> Self {
        Self {
            cipher_text: envelope.cipher,
            iv: envelope.initialization_vector,
        }
    }
}
