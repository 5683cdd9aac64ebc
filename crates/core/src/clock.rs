// SPDX-License-Identifier: MIT
//! Clock abstraction, injected wherever a component needs "now" so tests can
//! control time deterministically instead of sleeping on a wall clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns seconds-since-epoch as `f64`, matching the `ts` field on
/// [`crate::task::HistoryEntry`] and the activity log's `timestamp` field.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> f64;
}

/// Production clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}

/// Deterministic clock for tests: starts at a fixed instant and only
/// advances when told to.
#[derive(Debug, Clone)]
pub struct FakeClock {
    micros: Arc<AtomicU64>,
}

impl FakeClock {
    pub fn new(start_secs: f64) -> Self {
        Self {
            micros: Arc::new(AtomicU64::new((start_secs * 1_000_000.0) as u64)),
        }
    }

    pub fn advance(&self, secs: f64) {
        self.micros
            .fetch_add((secs * 1_000_000.0) as u64, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Clock for FakeClock {
    fn now(&self) -> f64 {
        self.micros.load(Ordering::SeqCst) as f64 / 1_000_000.0
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
