//! # Ledger Clock
//!
//! The ledger never schedules anything -- lock maturity is evaluated lazily,
//! whenever a withdrawal happens to be attempted, against the execution
//! environment's notion of "now". That notion is injected through the
//! [`Clock`] trait so a test harness can march time forward deterministically
//! instead of sleeping through a 365-day lock.
//!
//! Production code uses [`SystemClock`]; tests use [`ManualClock`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Source of the ledger's current time.
///
/// Implementations must be monotone in spirit -- the ledger tolerates a
/// clock that stands still, but a clock that runs backwards will make
/// "early" withdrawals out of locks that were already matured.
pub trait Clock: Send + Sync {
    /// Returns the current time (UTC).
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A hand-cranked clock for tests.
///
/// Starts at a fixed instant and only moves when told to. Clone the
/// `Arc<ManualClock>` before handing it to the ledger so the test retains
/// a handle for advancing time.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at the given instant.
    pub fn starting_at(instant: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(instant),
        })
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance_secs(&self, seconds: u64) {
        let mut now = self.now.lock();
        *now = *now + Duration::seconds(seconds as i64);
    }

    /// Jumps the clock to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
