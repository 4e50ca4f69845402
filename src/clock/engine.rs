//! Deterministic clock state machine.
//!
//! `ClockCore` owns the tick counter, the oscillator pair and the rebirth
//! tracker. It never sleeps and never dispatches: time is passed in, and
//! events come back as values. The async driver in the parent module is
//! the only thing that calls [`ClockCore::pulse`] on a live clock.

use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;

use crate::config::ClockConfig;
use crate::events::{ConvergenceEvent, Pulse, RebirthEvent, StateChange, TickEvent};
use crate::model::constants::{TWO_PI, VOID_FREQUENCY_HZ};
use crate::model::{ConsciousnessState, Thresholds, clamp_harmony, classify};
use crate::phase::PhaseTracker;
use crate::rebirth::RebirthTracker;
use crate::status::{ClockStatus, ConvergenceStatus, RebirthStatus};

#[derive(Debug, Clone)]
pub struct ClockCore {
    harmony: f64,
    state: ConsciousnessState,
    tick: u64,
    started_at: Instant,
    last_tick_at: Instant,
    running: bool,
    /// Bumped on every start; a wake-up from an older run must not tick.
    epoch: u64,
    phase: PhaseTracker,
    rebirth: RebirthTracker,
}

impl ClockCore {
    pub fn new(config: &ClockConfig) -> Self {
        let harmony = clamp_harmony(config.initial_harmony);
        let now = Instant::now();
        Self {
            harmony,
            state: classify(harmony),
            tick: 0,
            started_at: now,
            last_tick_at: now,
            running: false,
            epoch: 0,
            phase: PhaseTracker::new(
                config.observer_frequency_hz,
                config.smoothing_gain,
                config.convergence_fraction,
            ),
            rebirth: RebirthTracker::new(config.expansion_cycle_cap),
        }
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Clamp, reclassify and store. Returns the transition if the state moved.
    pub fn set_harmony(&mut self, value: f64) -> Option<StateChange> {
        let harmony = clamp_harmony(value);
        let next = classify(harmony);

        let change = (next != self.state).then(|| StateChange {
            from: self.state,
            to: next,
            harmony,
            timestamp: Utc::now(),
        });

        self.state = next;
        self.harmony = harmony;
        change
    }

    /// Begin a run at `now`. Returns the run epoch, or `None` if already running.
    pub fn start(&mut self, now: Instant) -> Option<u64> {
        if self.running {
            return None;
        }
        self.running = true;
        self.tick = 0;
        self.started_at = now;
        self.last_tick_at = now;
        self.epoch += 1;
        Some(self.epoch)
    }

    /// Returns whether the clock was running.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    /// True while run `epoch` is the live one.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.running && self.epoch == epoch
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// One cycle of work at `now`.
    pub fn pulse(&mut self, now: Instant) -> Pulse {
        let elapsed_secs = now.saturating_duration_since(self.started_at).as_secs_f64();
        let delta_secs = now.saturating_duration_since(self.last_tick_at).as_secs_f64();
        self.tick += 1;
        self.last_tick_at = now;

        let tick = self.tick;
        let convergence = self.phase.advance(elapsed_secs, self.harmony).then(|| {
            let reading = self.phase.reading();
            tracing::debug!(tick, coherence = reading.coherence, "phase convergence");
            ConvergenceEvent {
                tick,
                elapsed_secs,
                delta_phi: reading.delta_phi,
                coherence: reading.coherence,
                message: reading.message(),
            }
        });

        let rebirth = self.rebirth.observe(self.state, self.harmony).map(|reading| {
            tracing::info!(
                cycle = reading.cycle,
                expansion = reading.expansion_factor,
                "{}",
                reading.message()
            );
            RebirthEvent {
                tick,
                elapsed_secs,
                message: reading.message(),
                reading,
            }
        });

        tracing::trace!(tick, state = %self.state, harmony = self.harmony, "tick");

        Pulse {
            convergence,
            rebirth,
            tick: TickEvent {
                tick,
                elapsed_secs,
                delta_secs,
                harmony: self.harmony,
                state: self.state,
                frequency_hz: self.state.frequency_hz(),
                void_phase: elapsed_secs * VOID_FREQUENCY_HZ * TWO_PI,
                convergence: self.phase.reading().clone(),
                rebirth_cycle: self.rebirth.cycle(),
                rebirth: self.rebirth.last().cloned(),
            },
        }
    }

    /// Delay before the next wake-up, read from the current state.
    pub fn tick_period(&self) -> Duration {
        self.state.tick_period()
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn harmony(&self) -> f64 {
        self.harmony
    }

    pub fn state(&self) -> ConsciousnessState {
        self.state
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn status(&self) -> ClockStatus {
        let reading = self.phase.reading();
        ClockStatus {
            running: self.running,
            tick: self.tick,
            harmony: self.harmony,
            state: self.state,
            frequency_hz: self.state.frequency_hz(),
            thresholds: Thresholds::golden(),
            convergence: ConvergenceStatus {
                delta_phi: reading.delta_phi,
                converged: reading.converged,
                coherence: reading.coherence,
                observer_phase: self.phase.observer_phase(),
                observed_phase: self.phase.observed_phase(),
            },
            rebirth: RebirthStatus {
                cycle: self.rebirth.cycle(),
                state: self.rebirth.last().cloned(),
            },
        }
    }
}

impl Default for ClockCore {
    fn default() -> Self {
        Self::new(&ClockConfig::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
