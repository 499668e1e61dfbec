//! The injected time source.

use chrono::{DateTime, Utc};

/// A source of the current wall-clock time.
///
/// The scheduler computes its arming delay and tick payloads from this
/// trait instead of calling `Utc::now()` ambiently, so tests can inject
/// a fixed clock.
pub trait Clock: Send + Sync {
    /// Return the current time in UTC.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}
