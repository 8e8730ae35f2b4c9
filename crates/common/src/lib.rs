//! Common types, wire definitions, and errors shared across the key-rotation crates.

pub mod error;
pub mod protocol;

pub use error::EnvelopeError;
pub use protocol::{CipherEnvelope, CipherMetaData};
