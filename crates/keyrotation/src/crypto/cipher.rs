//! AES-256-GCM-SIV sealing of values into self-contained envelopes.
//!
//! Every call to [`seal`] draws a fresh 96-bit IV from the OS CSPRNG and
//! stores it next to the ciphertext, so [`open`] needs only the key.

use aes_gcm_siv::{
    aead::{Aead, KeyInit, OsRng},
    Aes256GcmSiv, Nonce,
};
use common::EnvelopeError;
use thiserror::Error;

use crate::envelope;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV IV (12 bytes = 96 bits).
pub const IV_LEN: usize = 12;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes")]
    InvalidKeyLength,

    /// The envelope carried an IV of the wrong length.
    #[error("invalid IV length: expected {IV_LEN} bytes, got {0}")]
    InvalidIvLength(usize),

    /// AES-GCM-SIV encryption or decryption failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// The self-contained ciphertext could not be packed or unpacked.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// Encrypt `plaintext` and pack ciphertext and IV into one envelope string.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::AeadFailure`] on an internal AEAD error (should be
/// unreachable with a valid key and IV).
pub fn seal(plaintext: &[u8], key: &[u8]) -> Result<String, CipherError> {
    let cipher = build_cipher(key)?;

    use aes_gcm_siv::aead::rand_core::RngCore;
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| CipherError::AeadFailure)?;

    Ok(envelope::encode(&ciphertext, &iv)?)
}

/// Unpack a self-contained envelope and decrypt it back to plaintext bytes.
///
/// # Errors
///
/// Returns [`CipherError::Envelope`] if `self_contained` is not a valid envelope,
/// [`CipherError::InvalidIvLength`] if the embedded IV is not [`IV_LEN`] bytes,
/// [`CipherError::InvalidKeyLength`] for a bad key, and
/// [`CipherError::AeadFailure`] if authentication fails (wrong key or tampered data).
pub fn open(self_contained: &str, key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;

    let meta = envelope::decode_self_contained(self_contained)?;
    let iv = meta.iv_bytes()?;
    if iv.len() != IV_LEN {
        return Err(CipherError::InvalidIvLength(iv.len()));
    }
    let ciphertext = meta.cipher_text_bytes()?;

    cipher
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_slice())
        .map_err(|_| CipherError::AeadFailure)
}

/// Re-encrypt an envelope sealed under `old_key` so it opens under `new_key`.
///
/// The output always carries a fresh IV.
///
/// # Errors
///
/// Any error [`open`] returns for `old_key`, or [`seal`] returns for `new_key`.
pub fn reencrypt(self_contained: &str, old_key: &[u8], new_key: &[u8]) -> Result<String, CipherError> {
    let plaintext = open(self_contained, old_key)?;
    seal(&plaintext, new_key)
}

fn build_cipher(key: &[u8]) -> Result<Aes256GcmSiv, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength);
    }
    Aes256GcmSiv::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength)
}
