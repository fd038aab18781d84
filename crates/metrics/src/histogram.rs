//! Histograms and distribution snapshots

use hdrhistogram::Histogram as HdrHistogram;
use parking_lot::Mutex;
use serde::Serialize;

/// Significant figures kept by every histogram
const HIST_SIGFIG: u8 = 3;

/// Trackable range; values above the ceiling are clamped to it
const HIST_LOW: u64 = 1;
const HIST_HIGH: u64 = u64::MAX;

/// Point-in-time view of a recorded distribution
///
/// All statistics are in the unit values were recorded in (timers record
/// nanoseconds). An empty histogram yields all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Distribution {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stddev: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub p98: f64,
    pub p99: f64,
    pub p999: f64,
}

impl Distribution {
    fn from_hdr(hist: &HdrHistogram<u64>) -> Self {
        if hist.len() == 0 {
            return Self::default();
        }

        Self {
            min: hist.min() as f64,
            max: hist.max() as f64,
            mean: hist.mean(),
            stddev: hist.stdev(),
            p50: hist.value_at_quantile(0.50) as f64,
            p75: hist.value_at_quantile(0.75) as f64,
            p95: hist.value_at_quantile(0.95) as f64,
            p98: hist.value_at_quantile(0.98) as f64,
            p99: hist.value_at_quantile(0.99) as f64,
            p999: hist.value_at_quantile(0.999) as f64,
        }
    }
}

/// Histogram snapshot as read by the reporter
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub distribution: Distribution,
}

/// Distribution of non-negative integer observations
///
/// Backed by an HDR histogram covering the whole `u64` range with three
/// significant figures of precision. Zero is recorded in the lowest bucket.
pub struct Histogram {
    inner: Mutex<HdrHistogram<u64>>,
}

impl Histogram {
    pub fn new() -> Self {
        let hist = HdrHistogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG)
            .expect("histogram bounds are valid");
        Self {
            inner: Mutex::new(hist),
        }
    }

    /// Record one observation
    #[inline]
    pub fn update(&self, value: u64) {
        self.inner.lock().saturating_record(value);
    }

    /// Number of observations recorded
    pub fn count(&self) -> u64 {
        self.inner.lock().len()
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        let hist = self.inner.lock();
        HistogramSnapshot {
            count: hist.len(),
            distribution: Distribution::from_hdr(&hist),
        }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("count", &self.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_histogram_is_zero() {
        let hist = Histogram::new();
        let snapshot = hist.snapshot();
        assert_eq!(snapshot.count, 0);
        assert_eq!(snapshot.distribution, Distribution::default());
    }

    #[test]
    fn test_snapshot_statistics() {
        let hist = Histogram::new();
        for v in 1..=100 {
            hist.update(v);
        }

        let snapshot = hist.snapshot();
        assert_eq!(snapshot.count, 100);

        let d = snapshot.distribution;
        assert_eq!(d.min, 1.0);
        assert_eq!(d.max, 100.0);
        assert!((d.mean - 50.5).abs() < 0.01);
        assert!((d.stddev - 28.87).abs() < 0.1);
        assert!((50.0..=51.0).contains(&d.p50));
        assert!((75.0..=76.0).contains(&d.p75));
        assert!((99.0..=100.0).contains(&d.p99));
        assert_eq!(d.p999, 100.0);
    }

    #[test]
    fn test_large_values_keep_three_figures() {
        let hist = Histogram::new();
        hist.update(123_456_789);

        let d = hist.snapshot().distribution;
        let relative_error = (d.max - 123_456_789.0).abs() / 123_456_789.0;
        assert!(relative_error < 0.001);
    }

    #[test]
    fn test_mixed_magnitudes_not_clamped() {
        let hist = Histogram::new();
        hist.update(2_000_000);
        hist.update(123_456_789);

        let d = hist.snapshot().distribution;
        assert!((d.min - 2_000_000.0).abs() / 2_000_000.0 < 0.001);
        assert!((d.max - 123_456_789.0).abs() / 123_456_789.0 < 0.001);
        assert!(d.mean > 60_000_000.0);
    }

    #[test]
    fn test_zero_and_max_recorded() {
        let hist = Histogram::new();
        hist.update(0);
        hist.update(u64::MAX);
        assert_eq!(hist.count(), 2);
        assert_eq!(hist.snapshot().distribution.min, 0.0);
    }
}
