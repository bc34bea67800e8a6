//! Time utilities and clock sources for the ledger.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::Duration;

/// Timing constants.
pub mod constants {
    use super::Duration;

    /// Default refund lock duration (24 hours).
    pub fn default_lock_duration() -> Duration {
        Duration::from_secs(24 * 60 * 60)
    }

    /// Maximum refund lock duration (30 days).
    pub fn max_lock_duration() -> Duration {
        Duration::from_secs(30 * 24 * 60 * 60)
    }
}

/// A timestamp with timezone (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Get the current wall-clock timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Time at which something created at `created_at` and locked for `lock`
/// becomes available. `None` if the result is not representable.
pub fn unlock_time(created_at: Timestamp, lock: Duration) -> Option<Timestamp> {
    let lock = chrono::Duration::from_std(lock).ok()?;
    created_at.checked_add_signed(lock)
}

/// Source of the current time.
///
/// Implementations must be monotonically non-decreasing.
pub trait Clock: Send + Sync {
    /// Get the current timestamp.
    fn now(&self) -> Timestamp;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        now()
    }
}

/// Manually driven clock for tests and simulation.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
}

impl ManualClock {
    /// Create a clock fixed at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    ///
    /// A step past the representable range is a caller bug: it panics in
    /// debug builds and leaves the clock unchanged otherwise.
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock();
        let next = unlock_time(*current, by);
        debug_assert!(next.is_some(), "clock advance by {:?} overflows", by);
        if let Some(next) = next {
            *current = next;
        }
    }

    /// Set the clock to `to` if it is not earlier than the current time.
    pub fn set(&self, to: Timestamp) {
        let mut current = self.current.lock();
        if to > *current {
            *current = to;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock()
    }
}
