//! # Clock Model
//!
//! Constants and the state classifier. Pure data and pure functions:
//! no I/O, no time, no async.

pub mod constants;
pub mod state;

pub use state::{ConsciousnessState, Thresholds, clamp_harmony, classify};
