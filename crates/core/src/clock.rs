//! Clock abstraction so expiry logic is testable with a fixed time.

use crate::types::Timestamp;

/// Source of "now" for all expiry and timestamp decisions.
///
/// Production code uses [`SystemClock`]; tests inject [`FixedClock`]
/// to pin time at a known instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from `chrono::Utc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now()
    }
}

/// A clock pinned at a fixed instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
