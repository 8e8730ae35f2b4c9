//! Loading of the key-rotation `properties.yaml` file.
//!
//! [`KeyRotationConfig::load`] is the fallible entry point: it checks the file
//! exists, reads it and parses the YAML, nothing more. [`load_config`] logs any
//! failure through the caller's `tracing` subscriber and returns `None`.
//! Semantic checks live in [`KeyRotationConfig::validate`] and the key
//! accessors, which callers run once they know what they need.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

/// Errors produced while loading or checking the configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// No file exists at the given path.
    #[error("file does not exist at: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("error occurred while reading {}: {source}", path.display())]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML or does not match the expected shape.
    #[error("error occurred while loading the yaml file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A value is absent or out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Key-rotation configuration as read from `properties.yaml`.
///
/// Keys follow the camelCase names of the tool's `properties.yaml`. Every
/// field is optional at load time.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRotationConfig {
    /// Hex-encoded key the stored values are currently sealed under.
    #[serde(default)]
    pub old_secret_key: Option<String>,

    /// Hex-encoded key to re-seal stored values under.
    #[serde(default)]
    pub new_secret_key: Option<String>,

    /// Home directory of the target server installation.
    #[serde(rename = "newISHome", default)]
    pub new_is_home: String,

    #[serde(rename = "oldIdnDBUrl", default)]
    pub old_idn_db_url: String,
    #[serde(default)]
    pub old_idn_username: String,
    #[serde(default)]
    pub old_idn_password: String,

    #[serde(rename = "newIdnDBUrl", default)]
    pub new_idn_db_url: String,
    #[serde(default)]
    pub new_idn_username: String,
    #[serde(default)]
    pub new_idn_password: String,

    #[serde(rename = "oldRegDBUrl", default)]
    pub old_reg_db_url: String,
    #[serde(default)]
    pub old_reg_username: String,
    #[serde(default)]
    pub old_reg_password: String,

    /// Re-encrypt values held in the identity and registry databases.
    #[serde(rename = "enableDBMigrator", default = "default_enabled")]
    pub enable_db_migrator: bool,

    /// Re-encrypt values held by pending workflow requests.
    #[serde(default = "default_enabled")]
    pub enable_workflow_migrator: bool,

    /// Re-encrypt values written to the old database after the initial run.
    #[serde(default = "default_enabled")]
    pub enable_sync_migrator: bool,

    /// Rows fetched per database round-trip.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,
}

fn default_enabled() -> bool {
    true
}
fn default_chunk_size() -> u32 {
    1000
}

impl KeyRotationConfig {
    /// Read and parse the YAML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError::NotFound`] if there is no file at `path`, and
    /// [`ConfigLoadError::Io`] or [`ConfigLoadError::Yaml`] if it cannot be read
    /// or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigLoadError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Decoded bytes of [`KeyRotationConfig::old_secret_key`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError::Invalid`] if the key is absent, empty or not hex.
    pub fn old_key(&self) -> Result<Vec<u8>, ConfigLoadError> {
        decode_key(self.old_secret_key.as_deref(), "oldSecretKey")
    }

    /// Decoded bytes of [`KeyRotationConfig::new_secret_key`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError::Invalid`] if the key is absent, empty or not hex.
    pub fn new_key(&self) -> Result<Vec<u8>, ConfigLoadError> {
        decode_key(self.new_secret_key.as_deref(), "newSecretKey")
    }

    /// Check the values a rotation run depends on, returning a descriptive
    /// error on the first failure.
    ///
    /// Key length is not checked here; the cipher the keys are handed to
    /// enforces its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigLoadError::Invalid`] if either key is absent or not hex,
    /// the keys are identical, or `chunkSize` is zero.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let old_key = self.old_key()?;
        let new_key = self.new_key()?;
        if old_key == new_key {
            return Err(ConfigLoadError::Invalid(
                "oldSecretKey and newSecretKey must differ".into(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(ConfigLoadError::Invalid("chunkSize must be > 0".into()));
        }
        Ok(())
    }
}

fn decode_key(hex_key: Option<&str>, name: &str) -> Result<Vec<u8>, ConfigLoadError> {
    let hex_key = hex_key.map(str::trim).unwrap_or_default();
    if hex_key.is_empty() {
        return Err(ConfigLoadError::Invalid(format!(
            "{name} is required and must not be empty"
        )));
    }
    hex::decode(hex_key).map_err(|_| ConfigLoadError::Invalid(format!("{name} must be hex-encoded")))
}

fn redact(value: &Option<String>) -> &'static str {
    match value {
        Some(_) => "[REDACTED]",
        None => "<unset>",
    }
}

impl fmt::Debug for KeyRotationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys and passwords are never printed.
        f.debug_struct("KeyRotationConfig")
            .field("old_secret_key", &redact(&self.old_secret_key))
            .field("new_secret_key", &redact(&self.new_secret_key))
            .field("new_is_home", &self.new_is_home)
            .field("old_idn_db_url", &self.old_idn_db_url)
            .field("old_idn_username", &self.old_idn_username)
            .field("old_idn_password", &"[REDACTED]")
            .field("new_idn_db_url", &self.new_idn_db_url)
            .field("new_idn_username", &self.new_idn_username)
            .field("new_idn_password", &"[REDACTED]")
            .field("old_reg_db_url", &self.old_reg_db_url)
            .field("old_reg_username", &self.old_reg_username)
            .field("old_reg_password", &"[REDACTED]")
            .field("enable_db_migrator", &self.enable_db_migrator)
            .field("enable_workflow_migrator", &self.enable_workflow_migrator)
            .field("enable_sync_migrator", &self.enable_sync_migrator)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

/// Load the configuration at `path`, logging and discarding any failure.
///
/// Returns `None` only when the file is missing, unreadable or not parseable.
/// Diagnostics go to whichever `tracing` subscriber is active for the calling
/// thread.
pub fn load_config(path: impl AsRef<Path>) -> Option<KeyRotationConfig> {
    let path = path.as_ref();
    match KeyRotationConfig::load(path) {
        Ok(cfg) => {
            debug!(path = %path.display(), "key rotation config loaded");
            Some(cfg)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to load key rotation config");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    const OLD_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
    const NEW_KEY: &str = "f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff000102030405060708090a0b0c0d0e0f";

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("properties.yaml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn minimal_yaml() -> String {
        format!("oldSecretKey: {OLD_KEY}\nnewSecretKey: {NEW_KEY}\n")
    }

    fn load_str(contents: &str) -> KeyRotationConfig {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, contents);
        KeyRotationConfig::load(&path).unwrap()
    }

    #[test]
    fn defaults_are_correct() {
        assert!(default_enabled());
        assert_eq!(default_chunk_size(), 1000);
    }

    #[test]
    fn loads_minimal_file_with_defaults() {
        let cfg = load_str(&minimal_yaml());
        assert_eq!(cfg.old_key().unwrap().len(), 32);
        assert_eq!(cfg.new_key().unwrap()[0], 0xF0);
        assert!(cfg.enable_db_migrator);
        assert!(cfg.enable_workflow_migrator);
        assert!(cfg.enable_sync_migrator);
        assert_eq!(cfg.chunk_size, 1000);
        assert_eq!(cfg.new_is_home, "");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn loads_full_file() {
        let yaml = format!(
            "{}newISHome: /opt/is-new\n\
             oldIdnDBUrl: jdbc:mysql://old/idn\n\
             oldIdnUsername: root\n\
             oldIdnPassword: hunter2\n\
             newIdnDBUrl: jdbc:mysql://new/idn\n\
             oldRegDBUrl: jdbc:mysql://old/reg\n\
             enableDBMigrator: false\n\
             enableSyncMigrator: false\n\
             chunkSize: 250\n",
            minimal_yaml()
        );
        let cfg = load_str(&yaml);
        assert_eq!(cfg.new_is_home, "/opt/is-new");
        assert_eq!(cfg.old_idn_db_url, "jdbc:mysql://old/idn");
        assert_eq!(cfg.old_idn_username, "root");
        assert_eq!(cfg.new_idn_db_url, "jdbc:mysql://new/idn");
        assert_eq!(cfg.old_reg_db_url, "jdbc:mysql://old/reg");
        assert!(!cfg.enable_db_migrator);
        assert!(cfg.enable_workflow_migrator);
        assert!(!cfg.enable_sync_migrator);
        assert_eq!(cfg.chunk_size, 250);
    }

    #[test]
    fn loads_128_bit_keys() {
        let cfg = load_str(
            "oldSecretKey: 03BAFEB20A1C2D3E4F5061728394A5B6\n\
             newSecretKey: 7F00FF11EE22DD33CC44BB55AA669977\n",
        );
        assert_eq!(cfg.old_key().unwrap().len(), 16);
        assert_eq!(cfg.new_key().unwrap()[0], 0x7F);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn loads_without_keys() {
        let cfg = load_str("newISHome: /opt/is\nchunkSize: 5\n");
        assert!(cfg.old_secret_key.is_none());
        assert!(cfg.new_secret_key.is_none());
        assert_eq!(cfg.new_is_home, "/opt/is");
        assert_eq!(cfg.chunk_size, 5);

        let err = cfg.old_key().unwrap_err();
        assert!(err.to_string().contains("oldSecretKey"));
        assert!(matches!(cfg.validate(), Err(ConfigLoadError::Invalid(_))));
    }

    #[test]
    fn loads_identical_keys_but_validate_rejects_them() {
        let cfg = load_str(&format!("oldSecretKey: {OLD_KEY}\nnewSecretKey: {OLD_KEY}\n"));
        assert!(matches!(cfg.validate(), Err(ConfigLoadError::Invalid(_))));
    }

    #[test]
    fn non_hex_key_rejected_on_access() {
        let cfg = load_str(&format!("oldSecretKey: not-hex\nnewSecretKey: {NEW_KEY}\n"));
        assert!(matches!(cfg.old_key(), Err(ConfigLoadError::Invalid(_))));
        assert!(cfg.new_key().is_ok());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_chunk_size() {
        let cfg = load_str(&format!("{}chunkSize: 0\n", minimal_yaml()));
        assert!(matches!(cfg.validate(), Err(ConfigLoadError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = KeyRotationConfig::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigLoadError::NotFound(_)));
        assert!(err.to_string().contains("file does not exist at"));
    }

    #[test]
    fn unreadable_path_is_io_error() {
        // A directory exists but cannot be read as a file.
        let dir = TempDir::new().unwrap();
        let err = KeyRotationConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Io { .. }));
        assert!(err.to_string().contains("error occurred while reading"));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "oldSecretKey: [unterminated\n");
        assert!(matches!(
            KeyRotationConfig::load(&path),
            Err(ConfigLoadError::Yaml(_))
        ));
    }

    #[test]
    fn wrong_value_type_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "chunkSize: lots\n");
        assert!(matches!(
            KeyRotationConfig::load(&path),
            Err(ConfigLoadError::Yaml(_))
        ));
    }

    #[test]
    fn debug_redacts_secrets() {
        let cfg = load_str(&format!("{}oldIdnPassword: hunter2\n", minimal_yaml()));
        let printed = format!("{cfg:?}");
        assert!(!printed.contains(OLD_KEY));
        assert!(!printed.contains(NEW_KEY));
        assert!(!printed.contains("hunter2"));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = crate::telemetry::subscriber("debug", move || writer.clone());
        let out = tracing::subscriber::with_default(subscriber, f);
        (out, logs.contents())
    }

    #[test]
    fn load_config_logs_missing_file_and_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");

        let (cfg, logs) = with_captured_logs(|| load_config(&path));
        assert!(cfg.is_none());
        assert!(logs.contains(r#""level":"ERROR""#));
        assert!(logs.contains("file does not exist at"));
    }

    #[test]
    fn load_config_logs_parse_failure_and_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "oldSecretKey: [unterminated\n");

        let (cfg, logs) = with_captured_logs(|| load_config(&path));
        assert!(cfg.is_none());
        assert!(logs.contains("failed to load key rotation config"));
    }

    #[test]
    fn load_config_keeps_parseable_configs() {
        let dir = TempDir::new().unwrap();
        let short_keys = write_config(
            &dir,
            "oldSecretKey: 03BAFEB20A1C2D3E4F5061728394A5B6\n\
             newSecretKey: 7F00FF11EE22DD33CC44BB55AA669977\n",
        );
        assert!(load_config(&short_keys).is_some());

        let no_keys = dir.path().join("no-keys.yaml");
        std::fs::write(&no_keys, "newISHome: /opt/is\nchunkSize: 5\n").unwrap();
        assert!(load_config(&no_keys).is_some());
    }

    #[test]
    fn load_config_does_not_log_keys() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, &minimal_yaml());

        let (cfg, logs) = with_captured_logs(|| load_config(&path));
        assert!(cfg.is_some());
        assert!(!logs.contains(OLD_KEY));
    }
}
