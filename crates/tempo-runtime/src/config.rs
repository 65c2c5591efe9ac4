//! Host configuration

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tempo_core::{Result, TempoError};

/// Construction-time options for [`GameHost`](crate::GameHost).
///
/// Durations are expressed in milliseconds so the config stays plain
/// TOML. Every field has a default; `validate` runs before the host
/// accepts the configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Run fixed-quantum updates (true) or one variable step per tick.
    pub is_fixed_time_step: bool,
    /// Target update quantum in milliseconds. Default 16.6667 (60 Hz).
    pub target_elapsed_ms: f64,
    /// Upper bound on time folded into the accumulator per tick.
    pub max_elapsed_ms: f64,
    /// How long the host sleeps per tick while the window is inactive.
    pub inactive_sleep_ms: f64,
    /// Whether the OS cursor is visible over the window.
    pub is_mouse_visible: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            is_fixed_time_step: true,
            target_elapsed_ms: 1000.0 / 60.0,
            max_elapsed_ms: 500.0,
            inactive_sleep_ms: 20.0,
            is_mouse_visible: false,
        }
    }
}

impl GameConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.target_elapsed_ms.is_finite() || self.target_elapsed_ms <= 0.0 {
            return Err(TempoError::InvalidConfig(
                "target_elapsed_ms must be greater than zero".into(),
            ));
        }
        if !self.max_elapsed_ms.is_finite() || self.max_elapsed_ms < self.target_elapsed_ms {
            return Err(TempoError::InvalidConfig(
                "max_elapsed_ms must be at least target_elapsed_ms".into(),
            ));
        }
        if !self.inactive_sleep_ms.is_finite() || self.inactive_sleep_ms < 0.0 {
            return Err(TempoError::InvalidConfig(
                "inactive_sleep_ms must not be negative".into(),
            ));
        }
        Ok(())
    }

    pub fn target_elapsed_time(&self) -> Duration {
        Duration::from_secs_f64(self.target_elapsed_ms / 1000.0)
    }

    pub fn max_elapsed_time(&self) -> Duration {
        Duration::from_secs_f64(self.max_elapsed_ms / 1000.0)
    }

    pub fn inactive_sleep_time(&self) -> Duration {
        Duration::from_secs_f64(self.inactive_sleep_ms / 1000.0)
    }
}
