//! Sample batcher and sender
//!
//! The sender accumulates samples and delivers them in batches. A batch is
//! flushed as soon as it reaches capacity, or when the caller asks (the
//! reporter flushes once at the end of every cycle).
//!
//! # Delivery semantics
//!
//! At most once. The batch is detached from the sender before the delivery
//! is attempted, so whatever the outcome the sender is empty afterwards and
//! the next `send` starts a fresh batch. A failed batch is lost.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use n9e_config::{ConfigError, SenderConfig, WireFormat, validate_batch_size, validate_endpoint};
use n9e_metrics::Value;
use tracing::debug;

use crate::encode::{Encoder, GraphiteLineEncoder, N9eJsonEncoder};
use crate::error::TransportError;
use crate::sample::Sample;
use crate::transport::{HttpTransport, TcpTransport, Transport};

/// Delivery counters, shared with whoever wants to watch the sender
#[derive(Debug, Default)]
pub struct SenderMetrics {
    /// Batches the transport accepted
    pub batches_delivered: AtomicU64,

    /// Batches that failed to encode or deliver
    pub batches_failed: AtomicU64,

    /// Samples inside delivered batches
    pub samples_delivered: AtomicU64,

    /// Samples lost with failed batches
    pub samples_dropped: AtomicU64,

    /// Samples the wire format cannot carry, never sent
    pub samples_skipped: AtomicU64,
}

impl SenderMetrics {
    pub const fn new() -> Self {
        Self {
            batches_delivered: AtomicU64::new(0),
            batches_failed: AtomicU64::new(0),
            samples_delivered: AtomicU64::new(0),
            samples_dropped: AtomicU64::new(0),
            samples_skipped: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn batch_delivered(&self, samples: u64) {
        self.batches_delivered.fetch_add(1, Ordering::Relaxed);
        self.samples_delivered.fetch_add(samples, Ordering::Relaxed);
    }

    #[inline]
    pub fn batch_failed(&self, samples: u64) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.samples_dropped.fetch_add(samples, Ordering::Relaxed);
    }

    #[inline]
    pub fn samples_skipped(&self, samples: u64) {
        self.samples_skipped.fetch_add(samples, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SenderStats {
        SenderStats {
            batches_delivered: self.batches_delivered.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            samples_delivered: self.samples_delivered.load(Ordering::Relaxed),
            samples_dropped: self.samples_dropped.load(Ordering::Relaxed),
            samples_skipped: self.samples_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of sender counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderStats {
    pub batches_delivered: u64,
    pub batches_failed: u64,
    pub samples_delivered: u64,
    pub samples_dropped: u64,
    pub samples_skipped: u64,
}

/// Batches samples and hands full batches to a transport
pub struct Sender {
    encoder: Box<dyn Encoder>,
    transport: Box<dyn Transport>,
    batch: Vec<Sample>,
    capacity: usize,
    metrics: Arc<SenderMetrics>,
}

impl Sender {
    /// Create a sender for `endpoint` with default timeout and wire format
    pub fn new(endpoint: &str, batch_size: usize) -> Result<Self, ConfigError> {
        Self::from_config(&SenderConfig {
            endpoint: endpoint.to_string(),
            batch_size,
            ..Default::default()
        })
    }

    /// Create a sender from configuration
    ///
    /// The endpoint scheme picks the transport (`http`/`https` or `tcp`)
    /// and `format` picks the encoder. A `nid` query parameter on the
    /// endpoint is copied into every N9E item.
    pub fn from_config(config: &SenderConfig) -> Result<Self, ConfigError> {
        validate_batch_size(config.batch_size)?;
        validate_endpoint(&config.endpoint)?;

        let url = reqwest::Url::parse(config.endpoint.trim())
            .map_err(|e| ConfigError::invalid_value("sender", "endpoint", e.to_string()))?;

        let encoder: Box<dyn Encoder> = match config.format {
            WireFormat::N9e => {
                let nid = url
                    .query_pairs()
                    .find(|(key, _)| key == "nid")
                    .map(|(_, value)| value.into_owned());
                match nid {
                    Some(nid) => Box::new(N9eJsonEncoder::new().with_nid(nid)),
                    None => Box::new(N9eJsonEncoder::new()),
                }
            }
            WireFormat::Graphite => Box::new(GraphiteLineEncoder::new()),
        };

        let transport: Box<dyn Transport> = match url.scheme() {
            "tcp" => {
                let (Some(host), Some(port)) = (url.host_str(), url.port()) else {
                    return Err(ConfigError::invalid_value(
                        "sender",
                        "endpoint",
                        "tcp endpoints need host and port",
                    ));
                };
                Box::new(TcpTransport::new(format!("{}:{}", host, port), config.timeout))
            }
            _ => Box::new(HttpTransport::new(url, config.timeout).map_err(|e| {
                ConfigError::invalid_value("sender", "endpoint", e.to_string())
            })?),
        };

        Ok(Self::build(encoder, transport, config.batch_size))
    }

    /// Create a sender with a custom encoder and transport
    pub fn with_transport(
        encoder: impl Encoder + 'static,
        transport: impl Transport + 'static,
        batch_size: usize,
    ) -> Result<Self, ConfigError> {
        validate_batch_size(batch_size)?;
        Ok(Self::build(Box::new(encoder), Box::new(transport), batch_size))
    }

    fn build(encoder: Box<dyn Encoder>, transport: Box<dyn Transport>, capacity: usize) -> Self {
        Self {
            encoder,
            transport,
            batch: Vec::with_capacity(capacity),
            capacity,
            metrics: Arc::new(SenderMetrics::new()),
        }
    }

    /// Append one sample, flushing if the batch is now full
    ///
    /// # Errors
    ///
    /// Returns the flush error when this sample completed a batch. The batch
    /// is empty either way.
    pub async fn send(
        &mut self,
        name: impl Into<String>,
        tags: impl Into<String>,
        value: impl Into<Value>,
        timestamp: i64,
    ) -> Result<(), TransportError> {
        self.push(Sample::new(name, tags, value, timestamp)).await
    }

    /// Append an already built sample
    pub async fn push(&mut self, sample: Sample) -> Result<(), TransportError> {
        self.batch.push(sample);
        if self.batch.len() >= self.capacity {
            self.flush().await?;
        }
        Ok(())
    }

    /// Deliver whatever is pending; a no-op when nothing is
    ///
    /// Only samples that reached the transport count as delivered or
    /// dropped. Samples the encoder cannot represent count as skipped, and a
    /// batch with nothing encodable makes no delivery at all.
    pub async fn flush(&mut self) -> Result<(), TransportError> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let batch = std::mem::replace(&mut self.batch, Vec::with_capacity(self.capacity));
        let total = batch.len() as u64;

        match self.deliver(&batch).await {
            Ok(Some(sent)) => {
                self.metrics.batch_delivered(sent);
                self.metrics.samples_skipped(total - sent);
                Ok(())
            }
            Ok(None) => {
                self.metrics.samples_skipped(total);
                Ok(())
            }
            Err(e) => {
                let lost = (e.samples() as u64).min(total);
                self.metrics.batch_failed(lost);
                self.metrics.samples_skipped(total - lost);
                Err(e)
            }
        }
    }

    /// Encode and hand the batch to the transport
    ///
    /// Returns how many samples went out, or `None` when none were encodable.
    async fn deliver(&self, batch: &[Sample]) -> Result<Option<u64>, TransportError> {
        let payload = self
            .encoder
            .encode(batch)
            .map_err(|e| TransportError::Encode {
                endpoint: self.transport.endpoint().to_string(),
                samples: batch.len(),
                message: e.to_string(),
            })?;

        if payload.is_empty() {
            debug!(
                endpoint = %self.transport.endpoint(),
                skipped = batch.len(),
                "Nothing encodable in batch"
            );
            return Ok(None);
        }

        let sent = payload.samples as u64;
        debug!(
            endpoint = %self.transport.endpoint(),
            format = self.encoder.name(),
            samples = sent,
            skipped = batch.len() as u64 - sent,
            bytes = payload.body.len(),
            "Flushing batch"
        );
        self.transport.deliver(payload).await?;
        Ok(Some(sent))
    }

    /// Samples waiting for the next flush
    pub fn pending(&self) -> &[Sample] {
        &self.batch
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Current delivery counters
    pub fn stats(&self) -> SenderStats {
        self.metrics.snapshot()
    }

    /// Shared handle to the delivery counters
    pub fn metrics(&self) -> Arc<SenderMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl std::fmt::Debug for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender")
            .field("endpoint", &self.transport.endpoint())
            .field("format", &self.encoder.name())
            .field("pending", &self.batch.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
#[path = "sender_test.rs"]
mod sender_test;
