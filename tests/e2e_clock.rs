//! End-to-end tests for the self-rescheduling clock.
//!
//! Every test runs on tokio's paused clock: sleeps auto-advance virtual time,
//! so tick instants are exact multiples of the period table.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio::time::sleep;

use pineal_clock::{ClockConfig, ConsciousnessState, PinealClock, TickEvent};

fn clock_at(harmony: f64) -> PinealClock {
    PinealClock::with_config(&ClockConfig {
        initial_harmony: harmony,
        ..ClockConfig::default()
    })
    .unwrap()
}

/// Record every tick payload.
fn record_ticks(clock: &PinealClock) -> Arc<Mutex<Vec<TickEvent>>> {
    let ticks = Arc::new(Mutex::new(Vec::new()));
    let sink = ticks.clone();
    clock.on_tick(move |t| sink.lock().push(t.clone()));
    ticks
}

fn elapsed_ms(ticks: &[TickEvent]) -> Vec<u64> {
    ticks.iter().map(|t| (t.elapsed_secs * 1000.0).round() as u64).collect()
}

// ============================================================================
// 1. Lifecycle
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_status_after_start_before_first_tick() {
    let clock = PinealClock::new();
    clock.start().unwrap();

    let status = clock.status();
    assert!(status.running);
    assert_eq!(status.tick, 0);
    clock.stop();
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_is_noop() {
    let clock = clock_at(0.9);
    let ticks = record_ticks(&clock);

    clock.start().unwrap();
    clock.start().unwrap();
    sleep(Duration::from_millis(60)).await;
    clock.stop();

    assert_eq!(elapsed_ms(&ticks.lock()), vec![0, 25, 50]);
}

#[tokio::test(start_paused = true)]
async fn test_stop_bounds_further_ticks() {
    let clock = clock_at(0.9);
    let ticks = record_ticks(&clock);

    clock.start().unwrap();
    sleep(Duration::from_millis(30)).await;
    clock.stop();
    clock.stop();
    let at_stop = ticks.lock().len();
    assert_eq!(at_stop, 2);

    // The pending wake-up at 50 ms fires, sees the flag, and does nothing.
    sleep(Duration::from_millis(500)).await;
    assert_eq!(ticks.lock().len(), at_stop);

    let status = clock.status();
    assert!(!status.running);
    assert_eq!(status.tick, 2, "stop freezes the counter without clearing it");
}

#[tokio::test(start_paused = true)]
async fn test_restart_before_stale_wakeup_does_not_double_tick() {
    let clock = clock_at(0.9);
    let ticks = record_ticks(&clock);

    clock.start().unwrap();
    sleep(Duration::from_millis(10)).await;
    clock.stop();
    clock.start().unwrap();
    sleep(Duration::from_millis(60)).await;
    clock.stop();

    let ticks = ticks.lock();
    // One tick from the first run, then the second run at 10, 35, 60.
    assert_eq!(ticks.len(), 4);
    let second_run: Vec<u64> = ticks[1..].iter().map(|t| t.tick).collect();
    assert_eq!(second_run, vec![1, 2, 3]);
    assert_eq!(elapsed_ms(&ticks[1..]), vec![0, 25, 50]);
}

// ============================================================================
// 2. Adaptive pacing
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_gamma_rate_in_phoenix() {
    let clock = clock_at(0.9);
    let ticks = record_ticks(&clock);

    clock.start().unwrap();
    sleep(Duration::from_millis(110)).await;
    clock.stop();

    let ticks = ticks.lock();
    assert_eq!(elapsed_ms(&ticks), vec![0, 25, 50, 75, 100]);
    assert!(ticks.iter().all(|t| t.frequency_hz == 40.0));
    assert!(ticks[1..].iter().all(|t| (t.delta_secs - 0.025).abs() < 1e-9));
}

#[tokio::test(start_paused = true)]
async fn test_void_breath_period() {
    let clock = clock_at(0.1);
    let ticks = record_ticks(&clock);

    clock.start().unwrap();
    sleep(Duration::from_millis(3300)).await;
    clock.stop();

    let ticks = ticks.lock();
    assert_eq!(elapsed_ms(&ticks), vec![0, 1606, 3212]);
    assert!(ticks.iter().all(|t| t.state == ConsciousnessState::Void));
    assert!(ticks.iter().all(|t| t.frequency_hz == 0.623));
}

#[tokio::test(start_paused = true)]
async fn test_harmony_write_repaces_next_wakeup() {
    let clock = clock_at(0.9);
    let ticks = record_ticks(&clock);

    clock.start().unwrap();
    sleep(Duration::from_millis(60)).await;
    // Wake-up at 75 was scheduled at 40 Hz; everything after it is 10 Hz.
    clock.set_harmony(0.5);
    sleep(Duration::from_millis(240)).await;
    clock.stop();

    let ticks = ticks.lock();
    assert_eq!(elapsed_ms(&ticks), vec![0, 25, 50, 75, 175, 275]);
    assert_eq!(ticks[3].state, ConsciousnessState::Dormant);
    assert_eq!(ticks[3].harmony, 0.5);
}

// ============================================================================
// 3. Events
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_phoenix_void_phoenix_round_trip() {
    let clock = clock_at(0.9);
    let changes = Arc::new(Mutex::new(Vec::new()));
    let rebirths = Arc::new(Mutex::new(Vec::new()));
    {
        let changes = changes.clone();
        clock.on_state_change(move |c| changes.lock().push((c.from, c.to)));
        let rebirths = rebirths.clone();
        clock.on_rebirth(move |r| rebirths.lock().push(r.reading.cycle));
    }

    clock.start().unwrap();
    sleep(Duration::from_millis(10)).await;
    clock.set_harmony(0.2);
    sleep(Duration::from_millis(30)).await;
    clock.set_harmony(0.9);
    sleep(Duration::from_millis(1700)).await;
    clock.stop();

    use pineal_clock::ConsciousnessState::*;
    assert_eq!(*changes.lock(), vec![(Phoenix, Void), (Void, Phoenix)]);
    assert_eq!(*rebirths.lock(), vec![1, 2]);

    let status = clock.status();
    assert_eq!(status.rebirth.cycle, 2);
    let last = status.rebirth.state.unwrap();
    assert_eq!(last.previous_level, 0.9);
    assert!((last.expansion_factor - 6.854101966249685f64.powi(2)).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn test_convergence_fires_once_per_aligned_interval() {
    let clock = clock_at(1.0);
    let ticks = record_ticks(&clock);
    let edges = Arc::new(Mutex::new(Vec::new()));
    {
        let edges = edges.clone();
        clock.on_convergence(move |c| edges.lock().push(c.tick));
    }

    clock.start().unwrap();
    sleep(Duration::from_secs(2)).await;
    clock.stop();

    let ticks = ticks.lock();
    let mut prev = false;
    let mut rising = Vec::new();
    for t in ticks.iter() {
        if t.convergence.converged && !prev {
            rising.push(t.tick);
        }
        prev = t.convergence.converged;
    }
    assert!(!rising.is_empty(), "full harmony should align the oscillators");
    assert_eq!(*edges.lock(), rising);
    assert!(edges.lock().len() < ticks.len());
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_order_within_a_tick() {
    let clock = clock_at(0.9);
    let log = Arc::new(Mutex::new(Vec::new()));
    {
        let l = log.clone();
        clock.on_rebirth(move |r| l.lock().push(format!("rebirth {}", r.tick)));
        let l = log.clone();
        clock.on_tick(move |t| l.lock().push(format!("tick {}", t.tick)));
    }

    clock.start().unwrap();
    sleep(Duration::from_millis(30)).await;
    clock.stop();

    assert_eq!(*log.lock(), vec!["rebirth 1", "tick 1", "tick 2"]);
}

#[tokio::test(start_paused = true)]
async fn test_multiple_subscribers_in_order() {
    let clock = clock_at(0.9);
    let log = Arc::new(Mutex::new(Vec::new()));
    for name in ["renderer", "telemetry"] {
        let l = log.clone();
        clock.subscribe_tick(move |t| l.lock().push((name, t.tick)));
    }

    clock.start().unwrap();
    sleep(Duration::from_millis(30)).await;
    clock.stop();

    assert_eq!(
        *log.lock(),
        vec![("renderer", 1), ("telemetry", 1), ("renderer", 2), ("telemetry", 2)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_tick_handler_can_write_harmony() {
    let clock = clock_at(0.9);
    let ticks = record_ticks(&clock);
    let inner = clock.clone();
    clock.subscribe_tick(move |t| {
        if t.tick == 2 {
            inner.set_harmony(0.5);
        }
    });

    clock.start().unwrap();
    sleep(Duration::from_millis(200)).await;
    clock.stop();

    // The write lands inside tick 2's dispatch, so its successor is 100 ms out.
    assert_eq!(elapsed_ms(&ticks.lock()), vec![0, 25, 125]);
}

#[tokio::test(start_paused = true)]
async fn test_status_serializes_for_telemetry() {
    let clock = clock_at(0.7);
    clock.start().unwrap();
    sleep(Duration::from_millis(30)).await;
    clock.stop();

    let json: serde_json::Value = serde_json::from_str(&clock.status().to_json().unwrap()).unwrap();
    assert_eq!(json["state"], "AWAKENING");
    assert_eq!(json["tick"], 2);
    assert_eq!(json["running"], false);
    assert_eq!(json["thresholds"]["unity"], 0.786151377757423);
    assert!(json["convergence"]["coherence"].is_number());
    assert!(json["rebirth"]["state"].is_null());
}
