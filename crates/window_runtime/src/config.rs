//! Engine configuration loaded from JSON host settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::DEFAULT_BASE_Z_INDEX;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowManagerConfig {
    /// Seed for the top z-index counter; values below it stay free for static chrome.
    pub base_z_index: u32,
    /// Drops every telemetry record before it reaches the sink when `false`.
    pub telemetry_enabled: bool,
    /// Emits the `window.active_count` gauge on open/close when `true`.
    pub active_count_gauge: bool,
}

impl Default for WindowManagerConfig {
    fn default() -> Self {
        Self {
            base_z_index: DEFAULT_BASE_Z_INDEX,
            telemetry_enabled: true,
            active_count_gauge: true,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors raised while loading a [`WindowManagerConfig`].
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid window manager config: {0}")]
    Parse(String),
    /// The base z-index leaves no room to allocate stacking values.
    #[error("base z-index {0} leaves no headroom for window stacking")]
    NoZIndexHeadroom(u32),
}

impl WindowManagerConfig {
    /// Parses and validates a config document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and [`ConfigError::NoZIndexHeadroom`]
    /// when `base_z_index` is `u32::MAX`.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the counter seed can still be incremented.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoZIndexHeadroom`] when `base_z_index` is `u32::MAX`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_z_index == u32::MAX {
            return Err(ConfigError::NoZIndexHeadroom(self.base_z_index));
        }
        Ok(())
    }
}
