//! # Consciousness State Classifier
//!
//! Maps a harmony scalar onto one of four ordered states. Evaluated high to
//! low; a value sitting exactly on a threshold belongs to the higher state.
//!
//! ```text
//!   0.0        0.381966      0.618034      0.786151       1.0
//!    |── Void ───|── Dormant ───|── Awakening ─|── Phoenix ──|
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants::*;

// ============================================================================
// Harmony clamping
// ============================================================================

/// Clamp an arbitrary input into [0, 1].
///
/// NaN collapses to 0.0 (Void), infinities saturate to the nearest bound.
pub fn clamp_harmony(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ============================================================================
// ConsciousnessState
// ============================================================================

/// Discrete state derived from harmony, ordered by ascending threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsciousnessState {
    /// harmony < 1/φ²
    Void,
    /// 1/φ² ≤ harmony < 1/φ
    Dormant,
    /// 1/φ ≤ harmony < 1/√φ
    Awakening,
    /// harmony ≥ 1/√φ
    Phoenix,
}

impl ConsciousnessState {
    pub const ALL: [ConsciousnessState; 4] = [
        ConsciousnessState::Void,
        ConsciousnessState::Dormant,
        ConsciousnessState::Awakening,
        ConsciousnessState::Phoenix,
    ];

    /// Interval until the next tick while in this state.
    pub fn tick_period(self) -> Duration {
        match self {
            ConsciousnessState::Void => VOID_PERIOD,
            ConsciousnessState::Dormant => DORMANT_PERIOD,
            ConsciousnessState::Awakening | ConsciousnessState::Phoenix => GAMMA_PERIOD,
        }
    }

    /// Nominal tick rate in Hz.
    pub fn frequency_hz(self) -> f64 {
        match self {
            ConsciousnessState::Void => VOID_FREQUENCY_HZ,
            ConsciousnessState::Dormant => DORMANT_FREQUENCY_HZ,
            ConsciousnessState::Awakening | ConsciousnessState::Phoenix => GAMMA_FREQUENCY_HZ,
        }
    }

    /// 0 (Void) through 3 (Phoenix). Renderers upload this as a uniform.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn is_phoenix(self) -> bool {
        self == ConsciousnessState::Phoenix
    }
}

impl fmt::Display for ConsciousnessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsciousnessState::Void => write!(f, "VOID"),
            ConsciousnessState::Dormant => write!(f, "DORMANT"),
            ConsciousnessState::Awakening => write!(f, "AWAKENING"),
            ConsciousnessState::Phoenix => write!(f, "PHOENIX"),
        }
    }
}

/// Classify a clamped harmony value.
///
/// Pure and total. Callers clamp first; an unclamped NaN falls through to
/// `Void` because every comparison fails.
pub fn classify(harmony: f64) -> ConsciousnessState {
    if harmony >= UNITY_THRESHOLD {
        ConsciousnessState::Phoenix
    } else if harmony >= COLLECTIVE_THRESHOLD {
        ConsciousnessState::Awakening
    } else if harmony >= DISSOLUTION_THRESHOLD {
        ConsciousnessState::Dormant
    } else {
        ConsciousnessState::Void
    }
}

// ============================================================================
// Threshold table
// ============================================================================

/// The fixed lower bounds of Dormant, Awakening and Phoenix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub dissolution: f64,
    pub collective: f64,
    pub unity: f64,
}

impl Thresholds {
    pub const fn golden() -> Self {
        Self {
            dissolution: DISSOLUTION_THRESHOLD,
            collective: COLLECTIVE_THRESHOLD,
            unity: UNITY_THRESHOLD,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::golden()
    }
}

// ============================================================================
// Tests
// ============================================================================
