//! N9E - Metrics
//!
//! In-process metric registry read by the N9E reporter.
//!
//! # Overview
//!
//! This crate provides:
//! - Five metric kinds: [`Counter`], [`Gauge`], [`Histogram`], [`Meter`], [`Timer`]
//! - A thread-safe [`MetricRegistry`] mapping names to metrics
//! - [`RegistrySnapshot`]: the read-only, name-ordered view a reporter consumes
//! - [`MetricFilter`] to select which metrics are snapshotted
//! - [`Clock`] so reporting timestamps can be controlled in tests
//!
//! # Design Principles
//!
//! - **Writers never wait on readers**: counters and meter counts are atomics;
//!   histograms hold a short mutex per update
//! - **Snapshots are values**: once taken, a snapshot does not change while
//!   the application keeps updating metrics
//! - **Closed set of kinds**: [`Metric`] is an enum, so consumers match
//!   exhaustively
//!
//! # Example
//!
//! ```
//! use n9e_metrics::{AllMetrics, MetricRegistry, MetricSource, Value};
//!
//! let registry = MetricRegistry::new();
//! registry.counter("jobs").unwrap().add(5);
//! registry.gauge("threads", || Some(Value::Int(8))).unwrap();
//!
//! let snapshot = registry.snapshot(&AllMetrics);
//! assert_eq!(snapshot.counters["jobs"], 5);
//! ```

mod clock;
mod error;
mod filter;
mod histogram;
mod meter;
mod registry;
mod snapshot;
mod timer;
mod value;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::RegistryError;
pub use filter::{AllMetrics, MetricFilter, NameFilter};
pub use histogram::{Distribution, Histogram, HistogramSnapshot};
pub use meter::{Meter, MeterSnapshot};
pub use registry::{MetricRegistry, name};
pub use snapshot::{MetricSource, RegistrySnapshot};
pub use timer::{Timer, TimerContext, TimerSnapshot};
pub use value::Value;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Atomic counter that can move in both directions
#[derive(Debug, Default)]
pub struct Counter(AtomicI64);

impl Counter {
    /// Create a new counter initialized to 0
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicI64::new(0))
    }

    /// Increment the counter by `val` (relaxed ordering for performance)
    #[inline]
    pub fn add(&self, val: i64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    /// Decrement the counter by `val`
    #[inline]
    pub fn sub(&self, val: i64) {
        self.0.fetch_sub(val, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc(&self) {
        self.add(1);
    }

    #[inline]
    pub fn dec(&self) {
        self.sub(1);
    }

    /// Get the current value (relaxed ordering)
    #[inline]
    pub fn count(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A value computed on demand each time the registry is snapshotted
///
/// The callback returns `None` when there is nothing to report; the reporter
/// skips such gauges silently.
pub struct Gauge {
    read: Box<dyn Fn() -> Option<Value> + Send + Sync>,
}

impl Gauge {
    pub fn new<F>(read: F) -> Self
    where
        F: Fn() -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            read: Box::new(read),
        }
    }

    /// Current value, if any
    #[inline]
    pub fn value(&self) -> Option<Value> {
        (self.read)()
    }
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gauge").finish_non_exhaustive()
    }
}

/// The kind of a registered metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Gauge,
    Counter,
    Histogram,
    Meter,
    Timer,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gauge => "gauge",
            Self::Counter => "counter",
            Self::Histogram => "histogram",
            Self::Meter => "meter",
            Self::Timer => "timer",
        })
    }
}

/// A registered metric handle
#[derive(Debug, Clone)]
pub enum Metric {
    Gauge(Arc<Gauge>),
    Counter(Arc<Counter>),
    Histogram(Arc<Histogram>),
    Meter(Arc<Meter>),
    Timer(Arc<Timer>),
}

impl Metric {
    pub fn kind(&self) -> MetricKind {
        match self {
            Self::Gauge(_) => MetricKind::Gauge,
            Self::Counter(_) => MetricKind::Counter,
            Self::Histogram(_) => MetricKind::Histogram,
            Self::Meter(_) => MetricKind::Meter,
            Self::Timer(_) => MetricKind::Timer,
        }
    }

    pub fn as_gauge(&self) -> Option<Arc<Gauge>> {
        match self {
            Self::Gauge(g) => Some(Arc::clone(g)),
            _ => None,
        }
    }

    pub fn as_counter(&self) -> Option<Arc<Counter>> {
        match self {
            Self::Counter(c) => Some(Arc::clone(c)),
            _ => None,
        }
    }

    pub fn as_histogram(&self) -> Option<Arc<Histogram>> {
        match self {
            Self::Histogram(h) => Some(Arc::clone(h)),
            _ => None,
        }
    }

    pub fn as_meter(&self) -> Option<Arc<Meter>> {
        match self {
            Self::Meter(m) => Some(Arc::clone(m)),
            _ => None,
        }
    }

    pub fn as_timer(&self) -> Option<Arc<Timer>> {
        match self {
            Self::Timer(t) => Some(Arc::clone(t)),
            _ => None,
        }
    }
}
