//! Metric filters
//!
//! A filter decides which registered metrics make it into a snapshot.

use crate::MetricKind;

/// Decides whether a metric is included in a snapshot
pub trait MetricFilter: Send + Sync {
    fn matches(&self, name: &str, kind: MetricKind) -> bool;
}

/// Accepts every metric
#[derive(Debug, Clone, Copy, Default)]
pub struct AllMetrics;

impl MetricFilter for AllMetrics {
    #[inline]
    fn matches(&self, _name: &str, _kind: MetricKind) -> bool {
        true
    }
}

impl<F> MetricFilter for F
where
    F: Fn(&str, MetricKind) -> bool + Send + Sync,
{
    fn matches(&self, name: &str, kind: MetricKind) -> bool {
        self(name, kind)
    }
}

/// Include/exclude by name prefix
///
/// An empty include list accepts every name. Exclusions win over inclusions.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl NameFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Whether this filter accepts everything
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

impl MetricFilter for NameFilter {
    fn matches(&self, name: &str, _kind: MetricKind) -> bool {
        if self.exclude.iter().any(|p| name.starts_with(p.as_str())) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| name.starts_with(p.as_str()))
    }
}
