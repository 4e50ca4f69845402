//! Clock configuration.
//!
//! Every field has a default, so a partial JSON document is enough:
//!
//! ```json
//! { "initial_harmony": 0.5, "poll_interval_ms": 2000 }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::constants::*;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Harmony before the first external write. Clamped like any write.
    pub initial_harmony: f64,
    /// Angular frequency of the observer oscillator.
    pub observer_frequency_hz: f64,
    /// Exponential-filter coefficient pulling observed toward observer.
    pub smoothing_gain: f64,
    /// Convergence window as a fraction of a full cycle.
    pub convergence_fraction: f64,
    /// Rebirth cycles after which the expansion factor stops growing.
    pub expansion_cycle_cap: u32,
    /// Harmony feed polling cadence.
    pub poll_interval_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            initial_harmony: 0.85,
            observer_frequency_hz: GAMMA_FREQUENCY_HZ,
            smoothing_gain: DEFAULT_SMOOTHING_GAIN,
            convergence_fraction: DEFAULT_CONVERGENCE_FRACTION,
            expansion_cycle_cap: DEFAULT_EXPANSION_CYCLE_CAP,
            poll_interval_ms: 5000,
        }
    }
}

impl ClockConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.observer_frequency_hz.is_finite() || self.observer_frequency_hz <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "observer_frequency_hz must be positive and finite, got {}",
                self.observer_frequency_hz
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing_gain) {
            return Err(Error::InvalidConfig(format!(
                "smoothing_gain must be in [0, 1], got {}",
                self.smoothing_gain
            )));
        }
        if !(self.convergence_fraction > 0.0 && self.convergence_fraction <= 0.5) {
            return Err(Error::InvalidConfig(format!(
                "convergence_fraction must be in (0, 0.5], got {}",
                self.convergence_fraction
            )));
        }
        // φ⁴^cap must stay finite.
        if self.expansion_cycle_cap > 360 {
            return Err(Error::InvalidConfig(format!(
                "expansion_cycle_cap {} overflows f64",
                self.expansion_cycle_cap
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig("poll_interval_ms must be non-zero".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
