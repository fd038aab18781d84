//! Metric registry
//!
//! Name → metric map shared between the application (which registers and
//! updates metrics) and the reporter (which only reads snapshots).

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::RegistryError;
use crate::filter::MetricFilter;
use crate::histogram::Histogram;
use crate::meter::Meter;
use crate::snapshot::{MetricSource, RegistrySnapshot};
use crate::timer::Timer;
use crate::{Counter, Gauge, Metric, MetricKind, Value};

/// Join name components with dots, skipping empty ones
///
/// ```
/// let joined = n9e_metrics::name(&["queue", "", "pending-jobs", "size"]);
/// assert_eq!(joined, "queue.pending-jobs.size");
/// ```
pub fn name(parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts.iter().filter(|p| !p.is_empty()) {
        if !out.is_empty() {
            out.push('.');
        }
        out.push_str(part);
    }
    out
}

/// Thread-safe registry of named metrics
#[derive(Default)]
pub struct MetricRegistry {
    metrics: RwLock<BTreeMap<String, Metric>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the counter `name`
    pub fn counter(&self, name: &str) -> Result<Arc<Counter>, RegistryError> {
        self.get_or_insert(name, MetricKind::Counter, Metric::as_counter, || {
            Metric::Counter(Arc::new(Counter::new()))
        })
    }

    /// Get or create the histogram `name`
    pub fn histogram(&self, name: &str) -> Result<Arc<Histogram>, RegistryError> {
        self.get_or_insert(name, MetricKind::Histogram, Metric::as_histogram, || {
            Metric::Histogram(Arc::new(Histogram::new()))
        })
    }

    /// Get or create the meter `name`
    pub fn meter(&self, name: &str) -> Result<Arc<Meter>, RegistryError> {
        self.get_or_insert(name, MetricKind::Meter, Metric::as_meter, || {
            Metric::Meter(Arc::new(Meter::new()))
        })
    }

    /// Get or create the timer `name`
    pub fn timer(&self, name: &str) -> Result<Arc<Timer>, RegistryError> {
        self.get_or_insert(name, MetricKind::Timer, Metric::as_timer, || {
            Metric::Timer(Arc::new(Timer::new()))
        })
    }

    /// Get the gauge `name`, registering `read` if it does not exist yet
    pub fn gauge<F>(&self, name: &str, read: F) -> Result<Arc<Gauge>, RegistryError>
    where
        F: Fn() -> Option<Value> + Send + Sync + 'static,
    {
        self.get_or_insert(name, MetricKind::Gauge, Metric::as_gauge, || {
            Metric::Gauge(Arc::new(Gauge::new(read)))
        })
    }

    /// Register a metric under a name that must not be taken yet
    pub fn register(&self, name: &str, metric: Metric) -> Result<(), RegistryError> {
        let mut metrics = self.metrics.write();
        if metrics.contains_key(name) {
            return Err(RegistryError::AlreadyExists {
                name: name.to_string(),
            });
        }
        metrics.insert(name.to_string(), metric);
        Ok(())
    }

    /// Remove a metric; returns whether it existed
    pub fn remove(&self, name: &str) -> bool {
        self.metrics.write().remove(name).is_some()
    }

    /// Registered names in order
    pub fn names(&self) -> Vec<String> {
        self.metrics.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.metrics.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.read().is_empty()
    }

    fn get_or_insert<T>(
        &self,
        name: &str,
        kind: MetricKind,
        extract: impl Fn(&Metric) -> Option<Arc<T>>,
        create: impl FnOnce() -> Metric,
    ) -> Result<Arc<T>, RegistryError> {
        if let Some(existing) = self.metrics.read().get(name) {
            return extract(existing).ok_or_else(|| mismatch(name, existing.kind(), kind));
        }

        // Another writer may have won the race between the two locks
        let mut metrics = self.metrics.write();
        let entry = metrics.entry(name.to_string()).or_insert_with(create);
        extract(entry).ok_or_else(|| mismatch(name, entry.kind(), kind))
    }
}

fn mismatch(name: &str, registered: MetricKind, requested: MetricKind) -> RegistryError {
    RegistryError::KindMismatch {
        name: name.to_string(),
        registered,
        requested,
    }
}

impl MetricSource for MetricRegistry {
    fn snapshot(&self, filter: &dyn MetricFilter) -> RegistrySnapshot {
        // Clone the handles first so metric reads (gauge callbacks in
        // particular) run without holding the registry lock.
        let entries: Vec<(String, Metric)> = self
            .metrics
            .read()
            .iter()
            .filter(|(name, metric)| filter.matches(name, metric.kind()))
            .map(|(name, metric)| (name.clone(), metric.clone()))
            .collect();

        let mut snapshot = RegistrySnapshot::default();
        for (name, metric) in entries {
            match metric {
                Metric::Gauge(g) => {
                    snapshot.gauges.insert(name, g.value());
                }
                Metric::Counter(c) => {
                    snapshot.counters.insert(name, c.count());
                }
                Metric::Histogram(h) => {
                    snapshot.histograms.insert(name, h.snapshot());
                }
                Metric::Meter(m) => {
                    snapshot.meters.insert(name, m.snapshot());
                }
                Metric::Timer(t) => {
                    snapshot.timers.insert(name, t.snapshot());
                }
            }
        }
        snapshot
    }
}

impl std::fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("metrics", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AllMetrics, NameFilter};
    use std::thread;

    #[test]
    fn test_name_joins_non_empty_parts() {
        assert_eq!(name(&["a", "b", "c"]), "a.b.c");
        assert_eq!(name(&["", "jobs", "count"]), "jobs.count");
        assert_eq!(name(&[]), "");
    }

    #[test]
    fn test_get_or_create_returns_same_instance() {
        let registry = MetricRegistry::new();
        let a = registry.counter("jobs").unwrap();
        let b = registry.counter("jobs").unwrap();
        a.inc();
        assert_eq!(b.count(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_kind_mismatch() {
        let registry = MetricRegistry::new();
        registry.counter("jobs").unwrap();

        let err = registry.meter("jobs").unwrap_err();
        assert_eq!(
            err,
            RegistryError::KindMismatch {
                name: "jobs".into(),
                registered: MetricKind::Counter,
                requested: MetricKind::Meter,
            }
        );
        assert!(err.to_string().contains("is a counter, not a meter"));
    }

    #[test]
    fn test_register_and_remove() {
        let registry = MetricRegistry::new();
        let timer = Arc::new(Timer::new());
        registry.register("db.query", Metric::Timer(timer)).unwrap();

        let again = registry.register("db.query", Metric::Counter(Arc::new(Counter::new())));
        assert!(matches!(again, Err(RegistryError::AlreadyExists { .. })));

        assert!(registry.remove("db.query"));
        assert!(!registry.remove("db.query"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_groups_by_kind() {
        let registry = MetricRegistry::new();
        registry.counter("jobs").unwrap().add(5);
        registry.gauge("threads", || Some(Value::Int(8))).unwrap();
        registry.gauge("cache.hit_ratio", || None).unwrap();
        registry.histogram("payload.bytes").unwrap().update(512);
        registry.meter("requests").unwrap().mark_n(3);
        registry.timer("db.query").unwrap().update(std::time::Duration::from_millis(1));

        let snapshot = registry.snapshot(&AllMetrics);
        assert_eq!(snapshot.counters["jobs"], 5);
        assert_eq!(snapshot.gauges["threads"], Some(Value::Int(8)));
        assert_eq!(snapshot.gauges["cache.hit_ratio"], None);
        assert_eq!(snapshot.histograms["payload.bytes"].count, 1);
        assert_eq!(snapshot.meters["requests"].count, 3);
        assert_eq!(snapshot.timers["db.query"].rates.count, 1);
    }

    #[test]
    fn test_snapshot_respects_filter() {
        let registry = MetricRegistry::new();
        registry.counter("queue.pending").unwrap();
        registry.counter("http.requests").unwrap();

        let snapshot = registry.snapshot(&NameFilter::new(vec!["queue.".into()], vec![]));
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.counters.contains_key("queue.pending"));
    }

    #[test]
    fn test_concurrent_writers() {
        let registry = Arc::new(MetricRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        registry.counter("shared").unwrap().inc();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot(&AllMetrics).counters["shared"], 4000);
    }
}
