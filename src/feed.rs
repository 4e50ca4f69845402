//! # Harmony Feed
//!
//! Periodic pull of harmony from an external producer (a remote score
//! service, a sensor, a test fixture). The feed is the only writer that runs
//! on its own cadence; the clock sees its writes as ordinary
//! [`PinealClock::set_harmony`] calls, last write wins.
//!
//! A failed or non-finite fetch never reaches the clock: the current harmony
//! stays in place until the next successful poll.

use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::clock::PinealClock;
use crate::{Error, Result};

/// Producer of harmony values.
#[async_trait]
pub trait HarmonySource: Send + Sync + 'static {
    /// Fetch the current harmony. Errors are logged by the feed and skipped.
    async fn fetch_harmony(&self) -> Result<f64>;
}

/// Pull `consciousness.harmony` out of a score-service JSON document.
///
/// ```text
/// { "consciousness": { "harmony": 0.81, ... }, ... }
/// ```
pub fn harmony_from_payload(payload: &serde_json::Value) -> Result<f64> {
    payload
        .pointer("/consciousness/harmony")
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| Error::Source("payload has no numeric consciousness.harmony".into()))
}

/// Poll `source` once and forward a valid value. Returns whether harmony was written.
pub async fn poll_once<S: HarmonySource + ?Sized>(clock: &PinealClock, source: &S) -> bool {
    match source.fetch_harmony().await {
        Ok(value) if value.is_finite() => {
            clock.set_harmony(value);
            true
        }
        Ok(value) => {
            tracing::warn!(value, "harmony source returned a non-finite value, ignoring");
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, "harmony fetch failed, keeping current harmony");
            false
        }
    }
}

/// Background polling task. Aborted on [`HarmonyFeed::stop`] or drop.
pub struct HarmonyFeed {
    task: JoinHandle<()>,
}

impl HarmonyFeed {
    /// Poll immediately, then every `interval`, on the current tokio runtime.
    pub fn spawn<S: HarmonySource>(clock: PinealClock, source: S, interval: Duration) -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| Error::NoRuntime(e.to_string()))?;
        let task: JoinHandle<()> = handle.spawn(async move {
            loop {
                poll_once(&clock, &source).await;
                tokio::time::sleep(interval).await;
            }
        });
        tracing::debug!(interval_ms = interval.as_millis() as u64, "harmony feed started");
        Ok(Self { task })
    }

    pub fn stop(self) {
        self.task.abort();
        tracing::debug!("harmony feed stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for HarmonyFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// Tests
// ============================================================================
