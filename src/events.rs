//! # Event Dispatch
//!
//! Payloads for the four event kinds and the typed subscription registry.
//!
//! | Kind | Fires |
//! |------|-------|
//! | tick | every cycle |
//! | state change | on classifier transition |
//! | convergence | on a false → true convergence edge |
//! | rebirth | on Phoenix entry |
//!
//! Each kind holds an ordered handler list. `set_*` installs a single
//! handler (replacing any others), `subscribe_*` appends. Dispatch is
//! synchronous and an empty list is a silent no-op.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ConsciousnessState;
use crate::phase::ConvergenceReading;
use crate::rebirth::RebirthReading;

// ============================================================================
// Payloads
// ============================================================================

/// Full per-tick payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickEvent {
    pub tick: u64,
    pub elapsed_secs: f64,
    pub delta_secs: f64,
    pub harmony: f64,
    pub state: ConsciousnessState,
    pub frequency_hz: f64,
    /// Unwrapped position in the 0.623 Hz dissolution breath.
    pub void_phase: f64,
    pub convergence: ConvergenceReading,
    pub rebirth_cycle: u64,
    /// Most recent rebirth, if any has happened.
    pub rebirth: Option<RebirthReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub from: ConsciousnessState,
    pub to: ConsciousnessState,
    pub harmony: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceEvent {
    pub tick: u64,
    pub elapsed_secs: f64,
    pub delta_phi: f64,
    pub coherence: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebirthEvent {
    pub tick: u64,
    pub elapsed_secs: f64,
    #[serde(flatten)]
    pub reading: RebirthReading,
    pub message: String,
}

/// Everything one pulse produced, in dispatch order.
#[derive(Debug, Clone, PartialEq)]
pub struct Pulse {
    pub convergence: Option<ConvergenceEvent>,
    pub rebirth: Option<RebirthEvent>,
    pub tick: TickEvent,
}

// ============================================================================
// Subscribers
// ============================================================================

pub type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Ordered handler list for one event kind.
pub struct HandlerList<T> {
    handlers: Vec<Handler<T>>,
}

impl<T> HandlerList<T> {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Replace every handler with `handler`.
    pub fn set(&mut self, handler: Handler<T>) {
        self.handlers.clear();
        self.handlers.push(handler);
    }

    pub fn push(&mut self, handler: Handler<T>) {
        self.handlers.push(handler);
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn emit(&self, event: &T) {
        for handler in &self.handlers {
            handler(event);
        }
    }
}

impl<T> Default for HandlerList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for HandlerList<T> {
    fn clone(&self) -> Self {
        Self { handlers: self.handlers.clone() }
    }
}

/// One handler list per event kind.
///
/// Cloning copies `Arc`s only; the clock clones before dispatch so that
/// handlers run without its lock held.
#[derive(Default, Clone)]
pub struct Subscribers {
    pub tick: HandlerList<TickEvent>,
    pub state_change: HandlerList<StateChange>,
    pub convergence: HandlerList<ConvergenceEvent>,
    pub rebirth: HandlerList<RebirthEvent>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch a pulse: convergence, then rebirth, then tick.
    pub fn dispatch_pulse(&self, pulse: &Pulse) {
        if let Some(event) = &pulse.convergence {
            self.convergence.emit(event);
        }
        if let Some(event) = &pulse.rebirth {
            self.rebirth.emit(event);
        }
        self.tick.emit(&pulse.tick);
    }

    pub fn dispatch_state_change(&self, change: &StateChange) {
        self.state_change.emit(change);
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("tick", &self.tick.len())
            .field("state_change", &self.state_change.len())
            .field("convergence", &self.convergence.len())
            .field("rebirth", &self.rebirth.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
