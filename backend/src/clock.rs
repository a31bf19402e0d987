//! Time source abstraction.
//!
//! Cache expiry and the default NEO feed date both read the clock through
//! this trait so tests can drive time by hand.

use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;

/// Source of monotonic time and of the current UTC calendar date.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    fn today(&self) -> NaiveDate;
}

/// Wall-clock implementation used by the server.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
    today: NaiveDate,
}

impl ManualClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
            today,
        }
    }

    /// Move time forward by `by`.
    pub fn advance(&self, by: Duration) {
        *self.elapsed.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock()
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
