//! Immutable diagnostics snapshot. Read-only; never used for control.

use serde::{Deserialize, Serialize};

use crate::model::{ConsciousnessState, Thresholds};
use crate::rebirth::RebirthReading;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockStatus {
    pub running: bool,
    pub tick: u64,
    pub harmony: f64,
    pub state: ConsciousnessState,
    pub frequency_hz: f64,
    pub thresholds: Thresholds,
    pub convergence: ConvergenceStatus,
    pub rebirth: RebirthStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceStatus {
    pub delta_phi: f64,
    pub converged: bool,
    pub coherence: f64,
    pub observer_phase: f64,
    pub observed_phase: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebirthStatus {
    pub cycle: u64,
    pub state: Option<RebirthReading>,
}

impl ClockStatus {
    /// Compact JSON for telemetry sinks.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
