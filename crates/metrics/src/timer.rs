//! Timers: a duration histogram combined with a call-rate meter

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::histogram::{Distribution, Histogram};
use crate::meter::{Meter, MeterSnapshot};

/// Point-in-time view of a timer
///
/// `distribution` is in nanoseconds; `rates` is in calls per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub distribution: Distribution,
    pub rates: MeterSnapshot,
}

/// Measures how long something takes and how often it happens
#[derive(Debug, Default)]
pub struct Timer {
    durations: Histogram,
    calls: Meter,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call that took `elapsed`
    pub fn update(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.durations.update(nanos);
        self.calls.mark();
    }

    /// Start timing; the call is recorded when the guard is stopped or dropped
    pub fn time(&self) -> TimerContext<'_> {
        TimerContext {
            timer: self,
            started: Instant::now(),
            stopped: false,
        }
    }

    /// Time a closure
    pub fn time_fn<T>(&self, f: impl FnOnce() -> T) -> T {
        let _ctx = self.time();
        f()
    }

    /// Number of calls recorded
    pub fn count(&self) -> u64 {
        self.calls.count()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            distribution: self.durations.snapshot().distribution,
            rates: self.calls.snapshot(),
        }
    }
}

/// Guard returned by [`Timer::time`]
#[must_use = "dropping the guard immediately records a near-zero duration"]
pub struct TimerContext<'a> {
    timer: &'a Timer,
    started: Instant,
    stopped: bool,
}

impl TimerContext<'_> {
    /// Record the elapsed time now and return it
    pub fn stop(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        let elapsed = self.started.elapsed();
        if !self.stopped {
            self.stopped = true;
            self.timer.update(elapsed);
        }
        elapsed
    }
}

impl Drop for TimerContext<'_> {
    fn drop(&mut self) {
        self.record();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_feeds_both_halves() {
        let timer = Timer::new();
        timer.update(Duration::from_millis(2));
        timer.update(Duration::from_millis(4));

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.rates.count, 2);
        assert!(snapshot.distribution.min >= 1_990_000.0);
        assert!(snapshot.distribution.max <= 4_010_000.0);
    }

    #[test]
    fn test_stop_records_once() {
        let timer = Timer::new();
        let ctx = timer.time();
        let elapsed = ctx.stop();

        assert_eq!(timer.count(), 1);
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_drop_records() {
        let timer = Timer::new();
        {
            let _ctx = timer.time();
        }
        assert_eq!(timer.count(), 1);
    }

    #[test]
    fn test_time_fn_returns_value() {
        let timer = Timer::new();
        let out = timer.time_fn(|| 6 * 7);
        assert_eq!(out, 42);
        assert_eq!(timer.count(), 1);
    }
}
