//! Engine tuning.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum absolute 1h change (percent) for a snapshot to be considered.
pub const THRESHOLD_PERCENT: f64 = 5.0;

/// Quiet period after a notification when neither direction nor level moved.
pub const NOTIFICATION_COOLDOWN_MS: i64 = 3_600_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid engine config: {0}")]
    Invalid(String),
}

/// Alert engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Snapshots below this absolute percent change are ignored.
    pub threshold_percent: f64,
    /// Cooldown in milliseconds before an unchanged asset notifies again.
    pub cooldown_ms: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold_percent: THRESHOLD_PERCENT,
            cooldown_ms: NOTIFICATION_COOLDOWN_MS,
        }
    }
}

impl EngineConfig {
    /// The threshold must be a finite positive percent and the cooldown non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold_percent.is_finite() || self.threshold_percent <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "threshold_percent must be > 0, got {}",
                self.threshold_percent
            )));
        }
        if self.cooldown_ms < 0 {
            return Err(ConfigError::Invalid(format!(
                "cooldown_ms must be >= 0, got {}",
                self.cooldown_ms
            )));
        }
        Ok(())
    }
}
