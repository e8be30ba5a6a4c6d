//! Timestamp sources
//!
//! All timestamps are microseconds since the Unix epoch (`ts_us`).

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Supplies the current time to the session layer.
pub trait Clock: Send + Sync {
    fn now_us(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_us(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_micros() as i64,
            // clock set before 1970
            Err(e) => -(e.duration().as_micros() as i64),
        }
    }
}

/// Clock that only moves when told to. Used for simulated sessions and
/// replay, where ticks are spaced by a fixed interval.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_us: AtomicI64,
}

impl ManualClock {
    pub fn new(start_us: i64) -> Self {
        Self {
            now_us: AtomicI64::new(start_us),
        }
    }

    pub fn set(&self, ts_us: i64) {
        self.now_us.store(ts_us, Ordering::SeqCst);
    }

    /// Advance by `delta_us` and return the new time.
    pub fn advance(&self, delta_us: i64) -> i64 {
        self.now_us.fetch_add(delta_us, Ordering::SeqCst) + delta_us
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> i64 {
        self.now_us.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_us(&self) -> i64 {
        (**self).now_us()
    }
}

/// Seconds between two microsecond timestamps.
#[inline]
pub fn dt_sec(later_us: i64, earlier_us: i64) -> f32 {
    (later_us - earlier_us) as f32 / 1_000_000.0
}
