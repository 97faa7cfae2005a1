//! blinc-replay configuration file handling

use anyhow::{Context, Result};
use blinc_recorder::ReplayConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "blinc-replay.toml";

/// Top-level configuration (blinc-replay.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub simulate: SimulateConfig,
}

/// Dry-run configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct SimulateConfig {
    /// Register every window named in the log before playing, so
    /// structural records never wait
    #[serde(default = "default_true")]
    pub register_windows: bool,
    /// Give up when playback makes no progress for this long
    #[serde(default = "default_stall_ms")]
    pub stall_timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_stall_ms() -> u64 {
    5_000
}

impl Default for SimulateConfig {
    fn default() -> Self {
        Self {
            register_windows: true,
            stall_timeout_ms: default_stall_ms(),
        }
    }
}

impl CliConfig {
    /// Load an explicit config file, or `blinc-replay.toml` from `dir` if present
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILE);
                if !candidate.exists() {
                    tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
