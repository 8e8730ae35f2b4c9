//! Tracing subscriber construction and global installation.

use anyhow::Result;
use tracing::Subscriber;
use tracing_subscriber::{fmt::MakeWriter, EnvFilter};

/// Targets that follow the configured level; everything else logs at `warn`.
const CRATE_TARGETS: [&str; 2] = ["keyrotation", "common"];

/// Build the JSON subscriber used by key-rotation processes, writing to `writer`.
///
/// `RUST_LOG`, when set, takes precedence over `log_level`.
pub fn subscriber<W>(log_level: &str, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter(log_level))
        .with_writer(writer)
        .finish()
}

/// Install [`subscriber`] as the process-wide default, logging to stdout.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    tracing::subscriber::set_global_default(subscriber(log_level, std::io::stdout))
        .map_err(|e| anyhow::anyhow!("failed to initialise key rotation tracing subscriber: {e}"))
}

fn filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(log_level)))
}

fn directives(log_level: &str) -> String {
    CRATE_TARGETS
        .iter()
        .fold(String::from("warn"), |acc, target| format!("{acc},{target}={log_level}"))
}
