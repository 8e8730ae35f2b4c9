//! Self-contained ciphertext envelopes for key rotation.
//!
//! Building blocks:
//! 1. [`envelope`] packs a ciphertext and its IV into one storable string and back.
//! 2. [`crypto`] seals, opens and re-encrypts values using those envelopes.
//! 3. [`config`] loads the rotation tool's `properties.yaml`.
//! 4. [`telemetry`] installs the JSON log subscriber for binaries.

pub mod config;
pub mod crypto;
pub mod envelope;
pub mod telemetry;

pub use common::{CipherEnvelope, CipherMetaData, EnvelopeError};
pub use config::{load_config, ConfigLoadError, KeyRotationConfig};
pub use envelope::{decode, decode_self_contained, encode};
