//! Self-contained ciphertext envelopes.
//!
//! An envelope packs a ciphertext and the IV used to produce it into a single
//! opaque string, so stored values never need a separate IV column.
//!
//! # Format
//!
//! ```text
//! base64( {"cipher":"<base64(ciphertext)>","initializationVector":"<base64(iv)>"} )
//! ```
//!
//! [`decode`] takes the inner JSON bytes, not the outer Base64 string, and
//! returns the field values still Base64-encoded. Stored envelopes depend on
//! both layers, so neither may be dropped.

pub mod codec;

pub use codec::{decode, decode_self_contained, encode};
