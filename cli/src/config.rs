//! Configuration file for the `latticepow` binary.
//!
//! Logging settings live at the top level; backend settings go under a
//! `[work]` table and are handed to the work pool unchanged.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use latticepow_utils::LogFormat;
use latticepow_work::WorkConfig;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CliConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub work: WorkConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            work: WorkConfig::default(),
        }
    }
}

impl CliConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.work.validate()?;
        Ok(config)
    }
}
