//! # Phase Convergence Tracker
//!
//! Two synthetic oscillators: the *observer* advances deterministically at a
//! fixed angular frequency, the *observed* chases it through a first-order
//! exponential filter whose rate is proportional to harmony.
//!
//! ```text
//! observer(t)  = (2π · f · t) mod 2π
//! observed    += (observer − observed) · harmony · gain,  then mod 2π
//! Δφ           = wrap(observer − observed) ∈ [−π, π]
//! coherence    = 1 − |Δφ| / π
//! converged    = |Δφ| < fraction · 2π
//! ```
//!
//! Convergence is edge-triggered: [`PhaseTracker::advance`] reports an edge
//! only on the tick where `converged` goes from false to true.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::model::constants::{
    DEFAULT_CONVERGENCE_FRACTION, DEFAULT_SMOOTHING_GAIN, GAMMA_FREQUENCY_HZ, TWO_PI,
};

// ============================================================================
// Pure phase arithmetic
// ============================================================================

/// Wrap a signed phase difference into [−π, π] by repeated ±2π correction.
///
/// Non-finite input cannot be wrapped and is returned as ±π (antiphase)
/// so that coherence stays within [0, 1].
pub fn wrap_phase(mut delta: f64) -> f64 {
    if !delta.is_finite() {
        return PI;
    }
    if delta.abs() > 64.0 * TWO_PI {
        // Bring huge inputs near range first; the loops below finish the job.
        delta %= TWO_PI;
    }
    while delta > PI {
        delta -= TWO_PI;
    }
    while delta < -PI {
        delta += TWO_PI;
    }
    delta
}

/// Wrap an absolute phase into [0, 2π).
pub fn normalize_phase(phase: f64) -> f64 {
    if !phase.is_finite() {
        return 0.0;
    }
    let wrapped = phase.rem_euclid(TWO_PI);
    // rem_euclid can round up to exactly 2π for tiny negative inputs.
    if wrapped >= TWO_PI { 0.0 } else { wrapped }
}

/// Map a wrapped phase difference to [0, 1]: 1 aligned, 0 antiphase.
pub fn coherence(delta_phi: f64) -> f64 {
    (1.0 - delta_phi.abs() / PI).clamp(0.0, 1.0)
}

/// One evaluation of the convergence condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceReading {
    /// Wrapped signed difference observer − observed.
    pub delta_phi: f64,
    pub abs_delta: f64,
    pub converged: bool,
    pub coherence: f64,
}

impl ConvergenceReading {
    /// Reading before any tick: maximally misaligned.
    pub fn antiphase() -> Self {
        Self {
            delta_phi: PI,
            abs_delta: PI,
            converged: false,
            coherence: 0.0,
        }
    }

    pub fn message(&self) -> String {
        if self.converged {
            "CONVERGENCE: observer and observed are one".to_string()
        } else {
            format!("Phase difference: {:.1}°", self.abs_delta.to_degrees())
        }
    }
}

/// Evaluate convergence between two phases with the default 5% window.
pub fn convergence_condition(observer_phase: f64, observed_phase: f64) -> ConvergenceReading {
    convergence_within(observer_phase, observed_phase, DEFAULT_CONVERGENCE_FRACTION)
}

/// Evaluate convergence with a window of `fraction` of a full cycle.
pub fn convergence_within(observer_phase: f64, observed_phase: f64, fraction: f64) -> ConvergenceReading {
    let delta_phi = wrap_phase(observer_phase - observed_phase);
    let abs_delta = delta_phi.abs();
    ConvergenceReading {
        delta_phi,
        abs_delta,
        converged: abs_delta < fraction * TWO_PI,
        coherence: coherence(delta_phi),
    }
}

// ============================================================================
// PhaseTracker
// ============================================================================

/// Observer/observed oscillator pair with edge-triggered convergence.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    observer_phase: f64,
    observed_phase: f64,
    reading: ConvergenceReading,
    frequency_hz: f64,
    smoothing_gain: f64,
    convergence_fraction: f64,
}

impl PhaseTracker {
    pub fn new(frequency_hz: f64, smoothing_gain: f64, convergence_fraction: f64) -> Self {
        Self {
            observer_phase: 0.0,
            observed_phase: 0.0,
            reading: ConvergenceReading::antiphase(),
            frequency_hz,
            smoothing_gain,
            convergence_fraction,
        }
    }

    /// Advance both oscillators to `elapsed_secs` since start.
    ///
    /// Returns `true` only on a false → true convergence edge.
    pub fn advance(&mut self, elapsed_secs: f64, harmony: f64) -> bool {
        self.observer_phase = normalize_phase(TWO_PI * self.frequency_hz * elapsed_secs);

        let pull = (self.observer_phase - self.observed_phase) * harmony * self.smoothing_gain;
        self.observed_phase = normalize_phase(self.observed_phase + pull);

        let was_converged = self.reading.converged;
        self.reading = convergence_within(
            self.observer_phase,
            self.observed_phase,
            self.convergence_fraction,
        );
        self.reading.converged && !was_converged
    }

    pub fn observer_phase(&self) -> f64 {
        self.observer_phase
    }

    pub fn observed_phase(&self) -> f64 {
        self.observed_phase
    }

    pub fn reading(&self) -> &ConvergenceReading {
        &self.reading
    }

    #[cfg(test)]
    pub(crate) fn set_phases(&mut self, observer: f64, observed: f64) {
        self.observer_phase = observer;
        self.observed_phase = observed;
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new(GAMMA_FREQUENCY_HZ, DEFAULT_SMOOTHING_GAIN, DEFAULT_CONVERGENCE_FRACTION)
    }
}

// ============================================================================
// Tests
// ============================================================================
