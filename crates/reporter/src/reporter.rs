//! Scheduled reporter
//!
//! Reads the registry once per period, flattens every metric and pushes the
//! samples through the [`Sender`]. Each cycle ends with one terminal flush.
//!
//! A delivery failure never escapes a cycle: the first error stops the
//! cycle, is logged once at `warn`, and the next cycle starts from an empty
//! batch.

use std::sync::Arc;
use std::time::Duration;

use n9e_config::{ReporterConfig, TimeUnit};
use n9e_metrics::{
    AllMetrics, Clock, MetricFilter, MetricSource, NameFilter, RegistrySnapshot, SystemClock,
};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::flatten::Flattener;
use crate::sample::Sample;
use crate::sender::Sender;

/// Builder for [`Reporter`]
///
/// Defaults: system clock, no prefix, no tags, rates per second, durations
/// in milliseconds, every metric reported.
pub struct ReporterBuilder {
    source: Arc<dyn MetricSource>,
    clock: Arc<dyn Clock>,
    prefix: Option<String>,
    tags: String,
    rate_unit: TimeUnit,
    duration_unit: TimeUnit,
    filter: Arc<dyn MetricFilter>,
}

impl ReporterBuilder {
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Prefix every sample name with `prefix`
    pub fn prefixed_with(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Tag string (`k=v,k=v`) attached to every sample
    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn convert_rates_to(mut self, unit: TimeUnit) -> Self {
        self.rate_unit = unit;
        self
    }

    pub fn convert_durations_to(mut self, unit: TimeUnit) -> Self {
        self.duration_unit = unit;
        self
    }

    /// Only report metrics the filter accepts
    pub fn filter(mut self, filter: impl MetricFilter + 'static) -> Self {
        self.filter = Arc::new(filter);
        self
    }

    /// Apply prefix, tags, units and include/exclude lists from config
    pub fn with_config(mut self, config: &ReporterConfig) -> Self {
        self.prefix = config.prefix.clone();
        self.tags = config.tags.clone();
        self.rate_unit = config.rate_unit;
        self.duration_unit = config.duration_unit;

        let names = NameFilter::new(config.include.clone(), config.exclude.clone());
        if !names.is_empty() {
            self.filter = Arc::new(names);
        }
        self
    }

    pub fn build(self, sender: Sender) -> Reporter {
        Reporter {
            source: self.source,
            clock: self.clock,
            flattener: Flattener::new(self.prefix, self.rate_unit, self.duration_unit),
            tags: self.tags,
            filter: self.filter,
            sender,
        }
    }
}

/// Periodically flattens a metric source into samples and sends them
pub struct Reporter {
    source: Arc<dyn MetricSource>,
    clock: Arc<dyn Clock>,
    flattener: Flattener,
    tags: String,
    filter: Arc<dyn MetricFilter>,
    sender: Sender,
}

impl Reporter {
    /// Start building a reporter for `source`
    pub fn for_registry(source: Arc<dyn MetricSource>) -> ReporterBuilder {
        ReporterBuilder {
            source,
            clock: Arc::new(SystemClock),
            prefix: None,
            tags: String::new(),
            rate_unit: TimeUnit::Seconds,
            duration_unit: TimeUnit::Milliseconds,
            filter: Arc::new(AllMetrics),
        }
    }

    /// Run one reporting cycle over `snapshot`
    ///
    /// Every sample of the cycle carries the same timestamp. Errors are
    /// logged, never returned.
    pub async fn report(&mut self, snapshot: &RegistrySnapshot) {
        let timestamp = self.clock.now_millis() / 1000;

        match self.report_at(snapshot, timestamp).await {
            Ok(samples) => {
                debug!(endpoint = %self.sender.endpoint(), samples, timestamp, "Reported metrics");
            }
            Err(e) => {
                warn!(endpoint = %self.sender.endpoint(), error = %e, "Unable to report metrics");
            }
        }
    }

    async fn report_at(
        &mut self,
        snapshot: &RegistrySnapshot,
        timestamp: i64,
    ) -> Result<usize, TransportError> {
        let flat = self.flattener.snapshot(snapshot);
        let samples = flat.len();

        for (name, value) in flat {
            self.sender
                .push(Sample::new(name, self.tags.as_str(), value, timestamp))
                .await?;
        }
        self.sender.flush().await?;

        Ok(samples)
    }

    /// Snapshot the source through the filter and report it
    pub async fn report_now(&mut self) {
        let snapshot = self.source.snapshot(self.filter.as_ref());
        self.report(&snapshot).await;
    }

    /// Report every `period` until `cancel` fires
    ///
    /// The first report happens one period after the call. Ticks that fall
    /// behind are skipped rather than bunched up.
    pub async fn run(mut self, period: Duration, cancel: CancellationToken) {
        if period.is_zero() {
            warn!("Reporting period is zero, reporter not started");
            return;
        }

        info!(
            endpoint = %self.sender.endpoint(),
            period = ?period,
            "Metrics reporter started"
        );

        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => self.report_now().await,
            }
        }

        info!(endpoint = %self.sender.endpoint(), "Metrics reporter stopped");
    }

    /// Spawn [`Reporter::run`] on the current runtime
    pub fn start(self, period: Duration) -> ReporterHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(period, cancel.clone()));
        ReporterHandle { cancel, task }
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    pub fn tags(&self) -> &str {
        &self.tags
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("flattener", &self.flattener)
            .field("tags", &self.tags)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

/// Handle to a reporter running in the background
#[derive(Debug)]
pub struct ReporterHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ReporterHandle {
    /// Stop reporting and wait for the task to finish
    ///
    /// A cycle already in progress completes first.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Metrics reporter task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
#[path = "reporter_test.rs"]
mod reporter_test;
