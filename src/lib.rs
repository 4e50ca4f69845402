//! # pineal-clock — Adaptive-Rate Consciousness Clock
//!
//! A render-pacing clock whose tick rate follows a single scalar input,
//! *harmony*, with two edge-triggered detectors layered on top.
//!
//! ## Design Principles
//!
//! 1. **Classification is a pure function**: harmony → state via fixed 1/φⁿ thresholds
//! 2. **Self-rescheduling**: every tick re-reads the state to pick its own successor's delay
//! 3. **Two independent edges**: phase convergence and Phoenix entry never share a trigger
//! 4. **Observe, don't touch**: callers see snapshots and event payloads; only
//!    `set_harmony` mutates
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pineal_clock::PinealClock;
//!
//! # async fn example() -> pineal_clock::Result<()> {
//! let clock = PinealClock::new();
//! clock.on_tick(|t| println!("tick {} {} {:.3}", t.tick, t.state, t.convergence.coherence));
//! clock.on_rebirth(|r| println!("{}", r.message));
//!
//! clock.start()?;
//! clock.set_harmony(0.42); // Dormant: 10 Hz from the next wake-up
//! clock.stop();
//! # Ok(())
//! # }
//! ```
//!
//! ## Pacing
//!
//! | State | Harmony | Period |
//! |-------|---------|--------|
//! | Void | < 0.381966 | 1606 ms |
//! | Dormant | ≥ 0.381966 | 100 ms |
//! | Awakening | ≥ 0.618034 | 25 ms |
//! | Phoenix | ≥ 0.786151 | 25 ms |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod phase;
pub mod rebirth;
pub mod events;
pub mod clock;
pub mod status;
pub mod config;
pub mod feed;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{ConsciousnessState, Thresholds, clamp_harmony, classify};

// ============================================================================
// Re-exports: Detectors
// ============================================================================

pub use phase::{ConvergenceReading, PhaseTracker, convergence_condition, wrap_phase};
pub use rebirth::{RebirthReading, RebirthTracker, rebirth_protocol};

// ============================================================================
// Re-exports: Clock
// ============================================================================

pub use clock::{ClockCore, PinealClock};
pub use config::ClockConfig;
pub use events::{ConvergenceEvent, RebirthEvent, StateChange, Subscribers, TickEvent};
pub use feed::{HarmonyFeed, HarmonySource};
pub use status::{ClockStatus, ConvergenceStatus, RebirthStatus};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No async runtime: {0}")]
    NoRuntime(String),

    #[error("Harmony source error: {0}")]
    Source(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
