//! Arrival time source.

use chrono::Local;

/// Format used for arrival times (local wall clock).
pub const ARRIVAL_TIME_FORMAT: &str = "%H:%M:%S";

/// Produces formatted arrival timestamps.
pub trait Clock {
    fn now(&self) -> String;
}

/// Local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        Local::now().format(ARRIVAL_TIME_FORMAT).to_string()
    }
}

/// Clock returning one preset value; for tests and replays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedClock(pub String);

impl FixedClock {
    pub fn new(time: impl Into<String>) -> Self {
        Self(time.into())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}
