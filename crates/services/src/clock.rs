//! Clocks for the posting pipeline.

use chrono::{DateTime, Duration, Utc};
use domains::Clock;
use parking_lot::Mutex;

pub use domains::SystemClock;

/// A clock that only moves when told to. Used to exercise the cooldown.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
