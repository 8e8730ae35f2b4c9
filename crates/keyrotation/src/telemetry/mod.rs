//! Logging setup for processes built on this crate.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the embedding binary (or to a test, via `tracing::subscriber::with_default`).
//!
//! # Telemetry invariants
//!
//! - **No key material or passwords** may appear in any log field.
//! - Log level is configurable via `RUST_LOG`, falling back to the level passed to [`init`].

pub mod init;

pub use init::{init, subscriber};
