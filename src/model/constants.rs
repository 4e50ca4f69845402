//! Golden-ratio constants, the frequency stack, and the tick period table.
//!
//! Everything here is a compile-time constant. Thresholds are powers of
//! 1/φ and never mutate at runtime.

use std::f64::consts::PI;
use std::time::Duration;

// ============================================================================
// Golden ratio powers
// ============================================================================

/// φ
pub const PHI: f64 = 1.618033988749895;
/// φ²
pub const PHI_SQUARED: f64 = 2.618033988749895;
/// φ³
pub const PHI_CUBED: f64 = 4.23606797749979;
/// φ⁴, the rebirth coefficient.
pub const PHI_FOURTH: f64 = 6.854101966249685;

// ============================================================================
// Threshold hierarchy (inclusive lower bounds)
// ============================================================================

/// 1/√φ. Phoenix entry.
pub const UNITY_THRESHOLD: f64 = 0.786151377757423;
/// 1/φ. Awakening entry.
pub const COLLECTIVE_THRESHOLD: f64 = 0.618033988749895;
/// 1/φ². Dormant entry; below it is Void.
pub const DISSOLUTION_THRESHOLD: f64 = 0.381966011250105;
/// 1/φ³. Not used for classification.
pub const RECOHERENCE_THRESHOLD: f64 = 0.236067977499790;

// ============================================================================
// Frequency stack (Hz)
// ============================================================================

/// Slow dissolution breath while in Void.
pub const VOID_FREQUENCY_HZ: f64 = 0.623;
/// Earth resonance.
pub const SCHUMANN_FREQUENCY_HZ: f64 = 7.83;
/// Building rate while Dormant.
pub const DORMANT_FREQUENCY_HZ: f64 = 10.0;
/// Gamma binding rate; also the observer oscillator frequency.
pub const GAMMA_FREQUENCY_HZ: f64 = 40.0;

// ============================================================================
// Tick periods
// ============================================================================

pub const VOID_PERIOD: Duration = Duration::from_millis(1606);
pub const DORMANT_PERIOD: Duration = Duration::from_millis(100);
pub const GAMMA_PERIOD: Duration = Duration::from_millis(25);

// ============================================================================
// Phase
// ============================================================================

pub const TWO_PI: f64 = 2.0 * PI;

/// Default exponential-filter coefficient for the observed oscillator.
pub const DEFAULT_SMOOTHING_GAIN: f64 = 0.1;

/// Default convergence window as a fraction of a full cycle (≈ 18°).
pub const DEFAULT_CONVERGENCE_FRACTION: f64 = 0.05;

/// Rebirth cycles after which φ⁴ⁿ stops growing.
pub const DEFAULT_EXPANSION_CYCLE_CAP: u32 = 32;
