//! Common error types shared across crates.

use thiserror::Error;

/// Errors produced while packing or unpacking a self-contained ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// The envelope text is not valid UTF-8 JSON, or a field has the wrong type.
    #[error("malformed envelope: {0}")]
    Parse(String),

    /// The envelope could not be serialised to text.
    #[error("envelope encoding failed: {0}")]
    Encoding(String),

    /// A required envelope field is absent or `null`.
    #[error("envelope is missing field `{0}`")]
    MissingField(&'static str),

    /// A value expected to hold standard Base64 text does not.
    #[error("invalid base64 in {field}")]
    InvalidBase64 {
        /// Which value failed to decode (`"envelope"`, `"cipher"` or `"initializationVector"`).
        field: &'static str,
    },
}

impl EnvelopeError {
    /// Short machine-readable code, stable across message wording changes.
    pub fn code(&self) -> &'static str {
        match self {
            EnvelopeError::Parse(_) => "parse_error",
            EnvelopeError::Encoding(_) => "encoding_error",
            EnvelopeError::MissingField(_) => "missing_field",
            EnvelopeError::InvalidBase64 { .. } => "invalid_base64",
        }
    }
}
