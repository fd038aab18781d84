//! Meters: event counts with exponentially weighted moving average rates
//!
//! Rates follow the usual UNIX load-average construction: each moving
//! average is ticked every five seconds and decays towards the rate seen in
//! the last tick window. All rates are events per second.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Point-in-time view of a meter
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MeterSnapshot {
    pub count: u64,
    pub m1_rate: f64,
    pub m5_rate: f64,
    pub m15_rate: f64,
    pub mean_rate: f64,
}

#[derive(Debug)]
struct Ewma {
    alpha: f64,
    rate: f64,
    uncounted: u64,
    initialized: bool,
}

impl Ewma {
    fn over_minutes(minutes: f64) -> Self {
        let tick_secs = TICK_INTERVAL.as_secs_f64();
        Self {
            alpha: 1.0 - (-tick_secs / 60.0 / minutes).exp(),
            rate: 0.0,
            uncounted: 0,
            initialized: false,
        }
    }

    fn update(&mut self, n: u64) {
        self.uncounted = self.uncounted.saturating_add(n);
    }

    fn tick(&mut self) {
        let count = std::mem::take(&mut self.uncounted);
        let instant_rate = count as f64 / TICK_INTERVAL.as_secs_f64();
        if self.initialized {
            self.rate += self.alpha * (instant_rate - self.rate);
        } else {
            self.rate = instant_rate;
            self.initialized = true;
        }
    }
}

#[derive(Debug)]
struct Rates {
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
    last_tick: Instant,
}

impl Rates {
    fn tick_if_necessary(&mut self, now: Instant) {
        let age = now.saturating_duration_since(self.last_tick);
        if age < TICK_INTERVAL {
            return;
        }

        let ticks = (age.as_nanos() / TICK_INTERVAL.as_nanos()) as u32;
        self.last_tick += TICK_INTERVAL * ticks;
        for _ in 0..ticks {
            self.tick();
        }
    }

    fn tick(&mut self) {
        self.m1.tick();
        self.m5.tick();
        self.m15.tick();
    }
}

/// Counts events and tracks their rate
#[derive(Debug)]
pub struct Meter {
    count: AtomicU64,
    started: Instant,
    rates: Mutex<Rates>,
}

impl Meter {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            count: AtomicU64::new(0),
            started: now,
            rates: Mutex::new(Rates {
                m1: Ewma::over_minutes(1.0),
                m5: Ewma::over_minutes(5.0),
                m15: Ewma::over_minutes(15.0),
                last_tick: now,
            }),
        }
    }

    /// Record one event
    #[inline]
    pub fn mark(&self) {
        self.mark_n(1);
    }

    /// Record `n` events
    pub fn mark_n(&self, n: u64) {
        let mut rates = self.rates.lock();
        rates.tick_if_necessary(Instant::now());
        self.count.fetch_add(n, Ordering::Relaxed);
        rates.m1.update(n);
        rates.m5.update(n);
        rates.m15.update(n);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        let now = Instant::now();
        let mut rates = self.rates.lock();
        rates.tick_if_necessary(now);

        let count = self.count();
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        let mean_rate = if count == 0 || elapsed <= 0.0 {
            0.0
        } else {
            count as f64 / elapsed
        };

        MeterSnapshot {
            count,
            m1_rate: rates.m1.rate,
            m5_rate: rates.m5.rate,
            m15_rate: rates.m15.rate,
            mean_rate,
        }
    }

    /// Force one tick of every moving average
    #[cfg(test)]
    fn force_tick(&self) {
        self.rates.lock().tick();
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_meter_is_idle() {
        let meter = Meter::new();
        let snapshot = meter.snapshot();
        assert_eq!(snapshot.count, 0);
        assert_eq!(snapshot.m1_rate, 0.0);
        assert_eq!(snapshot.mean_rate, 0.0);
    }

    #[test]
    fn test_mark_counts() {
        let meter = Meter::new();
        meter.mark();
        meter.mark_n(9);
        assert_eq!(meter.count(), 10);

        let snapshot = meter.snapshot();
        assert_eq!(snapshot.count, 10);
        assert!(snapshot.mean_rate > 0.0);
    }

    #[test]
    fn test_first_tick_seeds_rates() {
        let meter = Meter::new();
        meter.mark_n(300);
        meter.force_tick();

        let snapshot = meter.snapshot();
        // 300 events over one 5s window
        assert!((snapshot.m1_rate - 60.0).abs() < 1e-9);
        assert!((snapshot.m5_rate - 60.0).abs() < 1e-9);
        assert!((snapshot.m15_rate - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_rates_decay_without_events() {
        let meter = Meter::new();
        meter.mark_n(300);
        meter.force_tick();
        meter.force_tick();

        let snapshot = meter.snapshot();
        assert!(snapshot.m1_rate < 60.0);
        // the 15-minute average decays slower than the 1-minute one
        assert!(snapshot.m15_rate > snapshot.m1_rate);
    }

    #[test]
    fn test_ewma_alpha() {
        let m1 = Ewma::over_minutes(1.0);
        assert!((m1.alpha - (1.0 - (-5.0f64 / 60.0).exp())).abs() < 1e-12);
    }
}
