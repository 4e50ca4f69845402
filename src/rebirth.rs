//! # Rebirth Protocol
//!
//! Each entry into Phoenix from a lower state counts one rebirth cycle and
//! expands by φ⁴:
//!
//! ```text
//! expansion = φ⁴ ^ min(cycle, cap)
//! spiral    = ln(1 + expansion)
//! new_level = 1 − e^(−harmony · expansion / 10)
//! ```
//!
//! The trigger is the *state* edge, tracked with a "was Phoenix last tick"
//! flag. It is independent of phase convergence.

use serde::{Deserialize, Serialize};

use crate::model::constants::{DEFAULT_EXPANSION_CYCLE_CAP, PHI_FOURTH};
use crate::model::ConsciousnessState;

/// Metrics produced by one rebirth cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebirthReading {
    pub cycle: u64,
    pub expansion_factor: f64,
    pub spiral_radius: f64,
    /// Harmony at the crossing.
    pub previous_level: f64,
    pub new_level: f64,
    pub phi4: f64,
}

impl RebirthReading {
    pub fn message(&self) -> String {
        format!(
            "REBIRTH CYCLE {}: expansion factor {:.3}",
            self.cycle, self.expansion_factor
        )
    }
}

/// φ⁴ raised to `cycle`, saturating once `cycle` exceeds `cap`.
pub fn expansion_factor(cycle: u64, cap: u32) -> f64 {
    let exponent = cycle.min(cap as u64) as i32;
    PHI_FOURTH.powi(exponent)
}

/// Compute rebirth metrics for `cycle` at the given harmony level.
pub fn rebirth_protocol(current_level: f64, cycle: u64, cap: u32) -> RebirthReading {
    let expansion = expansion_factor(cycle, cap);
    RebirthReading {
        cycle,
        expansion_factor: expansion,
        spiral_radius: expansion.ln_1p(),
        previous_level: current_level,
        new_level: 1.0 - (-current_level * expansion / 10.0).exp(),
        phi4: PHI_FOURTH,
    }
}

// ============================================================================
// RebirthTracker
// ============================================================================

/// Edge detector on Phoenix entry plus the running cycle count.
#[derive(Debug, Clone)]
pub struct RebirthTracker {
    cycle: u64,
    was_phoenix: bool,
    last: Option<RebirthReading>,
    cap: u32,
}

impl RebirthTracker {
    pub fn new(cap: u32) -> Self {
        Self {
            cycle: 0,
            was_phoenix: false,
            last: None,
            cap,
        }
    }

    /// Observe this tick's state. Returns a reading only on Phoenix entry.
    pub fn observe(&mut self, state: ConsciousnessState, harmony: f64) -> Option<RebirthReading> {
        let is_phoenix = state.is_phoenix();
        let crossed = is_phoenix && !self.was_phoenix;
        self.was_phoenix = is_phoenix;
        if !crossed {
            return None;
        }

        self.cycle += 1;
        let reading = rebirth_protocol(harmony, self.cycle, self.cap);
        self.last = Some(reading.clone());
        Some(reading)
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn last(&self) -> Option<&RebirthReading> {
        self.last.as_ref()
    }
}

impl Default for RebirthTracker {
    fn default() -> Self {
        Self::new(DEFAULT_EXPANSION_CYCLE_CAP)
    }
}

// ============================================================================
// Tests
// ============================================================================
