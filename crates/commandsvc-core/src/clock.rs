//! Clock abstraction for event timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Source of event creation times.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// A clock whose readings strictly increase at nanosecond resolution.
///
/// Archive keys are derived from event time, so two events stamped with the
/// same nanosecond share a key. Within one process this clock hands out
/// `max(system_now, last + 1ns)`, which keeps keys distinct and ordered even
/// if the system clock stalls or steps backwards.
#[derive(Debug)]
pub struct MonotonicClock {
    last_nanos: AtomicI64,
}

impl MonotonicClock {
    /// Creates a clock with no previous reading.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_nanos: AtomicI64::new(i64::MIN),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> DateTime<Utc> {
        let system = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
        let mut next = system;
        // fetch_update retries until no other reader raced us.
        let _ = self
            .last_nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                next = system.max(last.saturating_add(1));
                Some(next)
            });
        DateTime::from_timestamp_nanos(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_readings_strictly_increase() {
        let clock = MonotonicClock::new();

        let readings: Vec<_> = (0..1_000).map(|_| clock.now()).collect();

        assert!(readings.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
