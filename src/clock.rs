//! Monotonic millisecond clocks used to stamp lifecycle events.

use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Source of monotonic timestamps, in fractional milliseconds since an
/// arbitrary epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> f64;
}

/// `Instant` backed clock. The epoch is the first time any `MonotonicClock`
/// is read in this process, so timestamps from different timers compare.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Mutex::new(start_ms),
        }
    }

    pub fn set(&self, ms: f64) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = ms;
    }

    pub fn advance(&self, ms: f64) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) += ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
