//! Registry snapshots
//!
//! A [`RegistrySnapshot`] is what the reporter consumes: five name-ordered
//! maps of already-read metric state. Anything that can produce one is a
//! [`MetricSource`].

use std::collections::BTreeMap;

use crate::filter::MetricFilter;
use crate::histogram::HistogramSnapshot;
use crate::meter::MeterSnapshot;
use crate::timer::TimerSnapshot;
use crate::{MetricKind, Value};

/// Everything a reporter needs for one cycle, grouped by metric kind
///
/// Maps are ordered by name. A gauge whose value was absent when read is
/// kept as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrySnapshot {
    pub gauges: BTreeMap<String, Option<Value>>,
    pub counters: BTreeMap<String, i64>,
    pub histograms: BTreeMap<String, HistogramSnapshot>,
    pub meters: BTreeMap<String, MeterSnapshot>,
    pub timers: BTreeMap<String, TimerSnapshot>,
}

impl RegistrySnapshot {
    /// Total number of metric entries across all kinds
    pub fn len(&self) -> usize {
        self.gauges.len()
            + self.counters.len()
            + self.histograms.len()
            + self.meters.len()
            + self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of this snapshot keeping only entries the filter accepts
    pub fn filtered(&self, filter: &dyn MetricFilter) -> Self {
        fn keep<V: Clone>(
            map: &BTreeMap<String, V>,
            kind: MetricKind,
            filter: &dyn MetricFilter,
        ) -> BTreeMap<String, V> {
            map.iter()
                .filter(|(name, _)| filter.matches(name, kind))
                .map(|(name, v)| (name.clone(), v.clone()))
                .collect()
        }

        Self {
            gauges: keep(&self.gauges, MetricKind::Gauge, filter),
            counters: keep(&self.counters, MetricKind::Counter, filter),
            histograms: keep(&self.histograms, MetricKind::Histogram, filter),
            meters: keep(&self.meters, MetricKind::Meter, filter),
            timers: keep(&self.timers, MetricKind::Timer, filter),
        }
    }
}

/// Read-only view of a metric registry
///
/// Implementations must tolerate concurrent writers; a snapshot only needs
/// to be consistent enough for one reporting pass.
pub trait MetricSource: Send + Sync {
    fn snapshot(&self, filter: &dyn MetricFilter) -> RegistrySnapshot;
}

/// A fixed snapshot is its own source
impl MetricSource for RegistrySnapshot {
    fn snapshot(&self, filter: &dyn MetricFilter) -> RegistrySnapshot {
        self.filtered(filter)
    }
}
