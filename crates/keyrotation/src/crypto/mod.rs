//! AES-256-GCM-SIV reference cipher for self-contained envelopes.
//!
//! The envelope codec does no cryptography; this module is the cipher that
//! produces the ciphertext + IV pairs it packages, and the re-encryption step
//! a key-rotation run applies to each stored value.
//!
//! # Ciphertext format
//!
//! ```text
//! base64({"cipher":"<base64(ciphertext+tag)>","initializationVector":"<base64(iv)>"})
//! ```

pub mod cipher;

pub use cipher::{open, reencrypt, seal, CipherError, IV_LEN, KEY_LEN};
