//! Work generation configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::accelerator::DEFAULT_BATCH;
use crate::WorkError;

/// Which backends a [`Pool`](crate::Pool) is built from, and how.
///
/// Can be loaded from a TOML file via [`WorkConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkConfig {
    /// Whether to race a CPU backend.
    #[serde(default = "default_true")]
    pub enable_cpu: bool,

    /// CPU search threads. Defaults to the available parallelism, halved
    /// (or dropped below 8) when an accelerator joins the pool.
    #[serde(default)]
    pub cpu_threads: Option<usize>,

    /// Whether to look for an accelerator device.
    #[serde(default = "default_true")]
    pub enable_accelerator: bool,

    /// Candidates evaluated per accelerator dispatch. Power of two.
    #[serde(default = "default_accelerator_batch")]
    pub accelerator_batch: u64,

    /// Give up on a request after this many seconds. `None` waits forever.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_accelerator_batch() -> u64 {
    DEFAULT_BATCH
}

// ── Impl ───────────────────────────────────────────────────────────────

impl WorkConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, WorkError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| WorkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WorkError> {
        let config: Self = toml::from_str(s).map_err(|e| WorkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, WorkError> {
        toml::to_string_pretty(self).map_err(|e| WorkError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), WorkError> {
        if self.cpu_threads == Some(0) {
            return Err(WorkError::Config("cpu_threads must be at least 1".into()));
        }
        if !self.accelerator_batch.is_power_of_two() {
            return Err(WorkError::Config(format!(
                "accelerator_batch must be a power of two, got {}",
                self.accelerator_batch
            )));
        }
        Ok(())
    }
}

impl Default for WorkConfig {
    fn default() -> Self {
        Self {
            enable_cpu: true,
            cpu_threads: None,
            enable_accelerator: true,
            accelerator_batch: default_accelerator_batch(),
            timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(WorkConfig::from_toml_str("").unwrap(), WorkConfig::default());
    }

    #[test]
    fn parses_all_fields() {
        let config = WorkConfig::from_toml_str(
            r#"
            enable_cpu = true
            cpu_threads = 4
            enable_accelerator = false
            accelerator_batch = 1024
            timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.cpu_threads, Some(4));
        assert!(!config.enable_accelerator);
        assert_eq!(config.accelerator_batch, 1024);
        assert_eq!(config.timeout_secs, Some(30));
    }

    #[test]
    fn rejects_zero_threads() {
        assert!(matches!(
            WorkConfig::from_toml_str("cpu_threads = 0"),
            Err(WorkError::Config(_))
        ));
    }

    #[test]
    fn rejects_odd_batch() {
        assert!(WorkConfig::from_toml_str("accelerator_batch = 1000").is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let config = WorkConfig {
            cpu_threads: Some(2),
            timeout_secs: Some(5),
            ..WorkConfig::default()
        };
        let s = config.to_toml_string().unwrap();
        assert_eq!(WorkConfig::from_toml_str(&s).unwrap(), config);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("work.toml");
        std::fs::write(&path, "cpu_threads = 3\nenable_accelerator = false\n").unwrap();

        let config = WorkConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.cpu_threads, Some(3));
        assert!(!config.enable_accelerator);
    }

    #[test]
    fn missing_file_is_config_error() {
        assert!(matches!(
            WorkConfig::from_toml_file("/nonexistent/latticepow.toml"),
            Err(WorkError::Config(_))
        ));
    }
}
