//! Replay engine configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReplayError, Result};

/// Configuration for recording, playback and click synthesis.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Maximum gap between two presses for a double click (milliseconds).
    pub double_click_ms: u32,
    /// Maximum gap between the first and third press for a triple click (milliseconds).
    pub triple_click_ms: u32,
    /// Playback speed multiplier (1.0 = recorded pace).
    pub playback_speed: f64,
    /// Override for the display's window resource base.
    pub window_base: Option<u64>,
    /// Records parsed ahead per scheduler tick.
    pub read_ahead: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            double_click_ms: 250,
            triple_click_ms: 500,
            playback_speed: 1.0,
            window_base: None,
            read_ahead: 1,
        }
    }
}

impl ReplayConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| ReplayError::io(path, e))?;
        Self::from_toml_str(&raw)
    }

    /// Set the playback speed.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.playback_speed = speed;
        self
    }

    /// Set the double and triple click windows.
    pub fn with_click_times(mut self, double_ms: u32, triple_ms: u32) -> Self {
        self.double_click_ms = double_ms;
        self.triple_click_ms = triple_ms;
        self
    }

    /// Pin the window resource base instead of asking the display.
    pub fn with_window_base(mut self, base: u64) -> Self {
        self.window_base = Some(base);
        self
    }

    /// Records to parse ahead per tick, at least one.
    pub(crate) fn read_ahead(&self) -> usize {
        self.read_ahead.max(1)
    }
}
