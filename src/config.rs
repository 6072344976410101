//! Board configuration
//!
//! ```json
//! { "rows": 13, "cols": 13, "tick_period_ms": 700, "animation_load_factor": 0.6 }
//! ```
//!
//! Missing fields take the defaults above; unknown fields are rejected.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{FungeError, Result};

/// Smallest accepted board edge
pub const MIN_DIMENSION: usize = 3;

/// Largest accepted board edge
pub const MAX_DIMENSION: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub rows: usize,
    pub cols: usize,
    /// Milliseconds between ticks
    pub tick_period_ms: u64,
    /// Fraction of a tick spent animating, in (0, 1]
    pub animation_load_factor: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: 13,
            cols: 13,
            tick_period_ms: 700,
            animation_load_factor: 0.6,
        }
    }
}

impl Config {
    /// Reject anything a board cannot be built from
    pub fn validate(&self) -> Result<()> {
        if self.rows < MIN_DIMENSION || self.cols < MIN_DIMENSION {
            return Err(FungeError::InvalidConfig(format!(
                "board must be at least {}x{}, got {}x{}",
                MIN_DIMENSION, MIN_DIMENSION, self.cols, self.rows
            )));
        }
        if self.rows > MAX_DIMENSION || self.cols > MAX_DIMENSION {
            return Err(FungeError::InvalidConfig(format!(
                "board must be at most {}x{}, got {}x{}",
                MAX_DIMENSION, MAX_DIMENSION, self.cols, self.rows
            )));
        }
        if self.tick_period_ms == 0 {
            return Err(FungeError::InvalidConfig("tick_period_ms must be positive".into()));
        }
        let a = self.animation_load_factor;
        if !a.is_finite() || a <= 0.0 || a > 1.0 {
            return Err(FungeError::InvalidConfig(format!(
                "animation_load_factor must be in (0, 1], got {}",
                a
            )));
        }
        if self.animation_duration().is_zero() {
            return Err(FungeError::InvalidConfig(
                "animation_duration rounds to zero; raise tick_period_ms or animation_load_factor"
                    .into(),
            ));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Time a pointer spends easing into its next cell
    pub fn animation_duration(&self) -> Duration {
        let nanos = self.tick_period().as_nanos() as f64 * self.animation_load_factor;
        Duration::from_nanos(nanos.round() as u64)
    }
}
