//! # Adaptive Scheduler
//!
//! `PinealClock` is a cloneable handle over a [`ClockCore`] and its
//! subscribers. `start()` spawns a self-rescheduling task on the current
//! tokio runtime:
//!
//! ```text
//! loop {
//!     lock core ─ still our run? ─ no ─▶ exit
//!         │ yes
//!     pulse(now) ─▶ unlock ─▶ dispatch convergence / rebirth / tick
//!     lock core ─ still our run? ─ no ─▶ exit
//!         │ yes
//!     sleep(period(current state))
//! }
//! ```
//!
//! The period is read fresh after every dispatch, so a harmony write that
//! lands between ticks re-paces the very next wake-up. Handlers run with no
//! lock held and may call back into the clock.
//!
//! `stop()` is cooperative: the pending sleep is not cancelled, but the
//! wake-up re-checks the run epoch before doing any work.

pub mod engine;

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::time::Instant;

use crate::config::ClockConfig;
use crate::events::{ConvergenceEvent, RebirthEvent, StateChange, Subscribers, TickEvent};
use crate::model::ConsciousnessState;
use crate::status::ClockStatus;
use crate::{Error, Result};

pub use engine::ClockCore;

struct Shared {
    core: Mutex<ClockCore>,
    subscribers: RwLock<Subscribers>,
}

/// Harmony-paced clock handle. Clones share one clock.
#[derive(Clone)]
pub struct PinealClock {
    shared: Arc<Shared>,
}

impl PinealClock {
    /// Clock with default configuration (harmony 0.85, Phoenix).
    pub fn new() -> Self {
        Self::from_core(ClockCore::default())
    }

    pub fn with_config(config: &ClockConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_core(ClockCore::new(config)))
    }

    fn from_core(core: ClockCore) -> Self {
        Self {
            shared: Arc::new(Shared {
                core: Mutex::new(core),
                subscribers: RwLock::new(Subscribers::new()),
            }),
        }
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Write a new harmony value. Takes effect immediately; the next tick
    /// observes it. A state transition is dispatched before this returns.
    pub fn set_harmony(&self, value: f64) {
        let change = self.shared.core.lock().set_harmony(value);
        if let Some(change) = change {
            tracing::debug!(
                from = %change.from,
                to = %change.to,
                harmony = change.harmony,
                "state transition"
            );
            let subscribers = self.shared.subscribers.read().clone();
            subscribers.dispatch_state_change(&change);
        }
    }

    /// Start ticking. No-op if already running.
    ///
    /// Fails only when called outside a tokio runtime.
    pub fn start(&self) -> Result<()> {
        let handle = Handle::try_current().map_err(|e| Error::NoRuntime(e.to_string()))?;

        let (epoch, state, harmony) = {
            let mut core = self.shared.core.lock();
            match core.start(Instant::now()) {
                Some(epoch) => (epoch, core.state(), core.harmony()),
                None => return Ok(()),
            }
        };

        tracing::info!(epoch, %state, harmony, "pineal clock started");
        handle.spawn(run_loop(self.shared.clone(), epoch));
        Ok(())
    }

    /// Stop ticking. No-op if already stopped.
    pub fn stop(&self) {
        if self.shared.core.lock().stop() {
            tracing::info!("pineal clock stopped");
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn status(&self) -> ClockStatus {
        self.shared.core.lock().status()
    }

    pub fn is_running(&self) -> bool {
        self.shared.core.lock().is_running()
    }

    pub fn state(&self) -> ConsciousnessState {
        self.shared.core.lock().state()
    }

    pub fn harmony(&self) -> f64 {
        self.shared.core.lock().harmony()
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Install the single tick handler, replacing any others.
    pub fn on_tick<F>(&self, handler: F)
    where
        F: Fn(&TickEvent) + Send + Sync + 'static,
    {
        self.shared.subscribers.write().tick.set(Arc::new(handler));
    }

    pub fn on_state_change<F>(&self, handler: F)
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.shared.subscribers.write().state_change.set(Arc::new(handler));
    }

    pub fn on_convergence<F>(&self, handler: F)
    where
        F: Fn(&ConvergenceEvent) + Send + Sync + 'static,
    {
        self.shared.subscribers.write().convergence.set(Arc::new(handler));
    }

    pub fn on_rebirth<F>(&self, handler: F)
    where
        F: Fn(&RebirthEvent) + Send + Sync + 'static,
    {
        self.shared.subscribers.write().rebirth.set(Arc::new(handler));
    }

    /// Append a tick handler after any existing ones.
    pub fn subscribe_tick<F>(&self, handler: F)
    where
        F: Fn(&TickEvent) + Send + Sync + 'static,
    {
        self.shared.subscribers.write().tick.push(Arc::new(handler));
    }

    pub fn subscribe_state_change<F>(&self, handler: F)
    where
        F: Fn(&StateChange) + Send + Sync + 'static,
    {
        self.shared.subscribers.write().state_change.push(Arc::new(handler));
    }

    pub fn subscribe_convergence<F>(&self, handler: F)
    where
        F: Fn(&ConvergenceEvent) + Send + Sync + 'static,
    {
        self.shared.subscribers.write().convergence.push(Arc::new(handler));
    }

    pub fn subscribe_rebirth<F>(&self, handler: F)
    where
        F: Fn(&RebirthEvent) + Send + Sync + 'static,
    {
        self.shared.subscribers.write().rebirth.push(Arc::new(handler));
    }

    /// Drop every handler of every kind.
    pub fn clear_subscribers(&self) {
        *self.shared.subscribers.write() = Subscribers::new();
    }
}

impl Default for PinealClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PinealClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinealClock")
            .field("core", &*self.shared.core.lock())
            .field("subscribers", &*self.shared.subscribers.read())
            .finish()
    }
}

// ============================================================================
// Run loop
// ============================================================================

async fn run_loop(shared: Arc<Shared>, epoch: u64) {
    loop {
        let pulse = {
            let mut core = shared.core.lock();
            if !core.is_current(epoch) {
                break;
            }
            core.pulse(Instant::now())
        };

        let subscribers = shared.subscribers.read().clone();
        subscribers.dispatch_pulse(&pulse);

        let period = {
            let core = shared.core.lock();
            if !core.is_current(epoch) {
                break;
            }
            core.tick_period()
        };

        tokio::time::sleep(period).await;
    }
    tracing::debug!(epoch, "clock loop exited");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_outside_runtime_fails() {
        let clock = PinealClock::new();
        assert!(matches!(clock.start(), Err(Error::NoRuntime(_))));
        assert!(!clock.is_running());
    }

    #[test]
    fn test_with_config_validates() {
        let bad = ClockConfig {
            smoothing_gain: -1.0,
            ..ClockConfig::default()
        };
        assert!(matches!(PinealClock::with_config(&bad), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_set_harmony_dispatches_state_change_without_running() {
        let clock = PinealClock::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        clock.on_state_change(move |c| s.lock().push((c.from, c.to)));

        clock.set_harmony(0.5);
        clock.set_harmony(0.55);
        assert_eq!(
            *seen.lock(),
            vec![(ConsciousnessState::Phoenix, ConsciousnessState::Dormant)]
        );
    }

    #[test]
    fn test_handler_may_reenter_clock() {
        let clock = PinealClock::new();
        let inner = clock.clone();
        clock.on_state_change(move |c| {
            // Reading status from inside a handler must not deadlock.
            assert_eq!(inner.status().state, c.to);
        });
        clock.set_harmony(0.1);
    }

    #[test]
    fn test_missing_subscribers_are_silent() {
        let clock = PinealClock::new();
        clock.on_tick(|_| {});
        clock.clear_subscribers();
        clock.set_harmony(0.0);
        clock.set_harmony(1.0);
        assert_eq!(clock.state(), ConsciousnessState::Phoenix);
    }
}
