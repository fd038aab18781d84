//! Delivery transports
//!
//! A transport performs exactly one delivery attempt per flush. Retries are
//! deliberately absent: a failed batch is dropped and the next cycle starts
//! fresh.
//!
//! - [`HttpTransport`]: POST to the N9E push API (or any HTTP collector)
//! - [`TcpTransport`]: write the body to a plaintext socket (Graphite)
//! - [`StdoutTransport`]: print the body, for dry runs
//! - [`MemoryTransport`]: record payloads in memory, for tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::encode::Payload;
use crate::error::TransportError;

/// Trait for delivery transports
#[async_trait]
pub trait Transport: Send + Sync {
    /// Destination, as shown in logs and errors
    fn endpoint(&self) -> &str;

    /// Deliver one encoded batch
    async fn deliver(&self, payload: Payload) -> Result<(), TransportError>;
}

// =============================================================================
// HTTP
// =============================================================================

/// POSTs each payload to a fixed URL
pub struct HttpTransport {
    client: reqwest::Client,
    url: reqwest::Url,
    endpoint: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with a request timeout
    pub fn new(url: reqwest::Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: url.to_string(),
            url,
            timeout,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn deliver(&self, payload: Payload) -> Result<(), TransportError> {
        let samples = payload.samples;
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, payload.content_type)
            .body(payload.body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout {
                        endpoint: self.endpoint.clone(),
                        samples,
                        timeout: self.timeout,
                    }
                } else {
                    TransportError::network(&self.endpoint, samples, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Server {
                endpoint: self.endpoint.clone(),
                samples,
                status: status.as_u16(),
            });
        }

        trace!(endpoint = %self.endpoint, samples, status = status.as_u16(), "Batch accepted");
        Ok(())
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// =============================================================================
// TCP
// =============================================================================

/// Opens a connection per payload, writes it, and closes
#[derive(Debug, Clone)]
pub struct TcpTransport {
    addr: String,
    endpoint: String,
    timeout: Duration,
}

impl TcpTransport {
    /// `addr` is `host:port`
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        let addr = addr.into();
        Self {
            endpoint: format!("tcp://{}", addr),
            addr,
            timeout,
        }
    }

    async fn write(&self, body: &[u8]) -> std::io::Result<()> {
        let mut stream = TcpStream::connect(&self.addr).await?;
        stream.write_all(body).await?;
        stream.flush().await?;
        stream.shutdown().await
    }
}

#[async_trait]
impl Transport for TcpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn deliver(&self, payload: Payload) -> Result<(), TransportError> {
        let samples = payload.samples;
        match tokio::time::timeout(self.timeout, self.write(&payload.body)).await {
            Ok(Ok(())) => {
                trace!(endpoint = %self.endpoint, samples, "Batch written");
                Ok(())
            }
            Ok(Err(e)) => Err(TransportError::network(&self.endpoint, samples, e.to_string())),
            Err(_) => Err(TransportError::Timeout {
                endpoint: self.endpoint.clone(),
                samples,
                timeout: self.timeout,
            }),
        }
    }
}

// =============================================================================
// Stdout
// =============================================================================

/// Writes every payload to standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutTransport;

#[async_trait]
impl Transport for StdoutTransport {
    fn endpoint(&self) -> &str {
        "stdout"
    }

    async fn deliver(&self, payload: Payload) -> Result<(), TransportError> {
        let mut out = tokio::io::stdout();
        let write = async {
            out.write_all(&payload.body).await?;
            if payload.body.last() != Some(&b'\n') {
                out.write_all(b"\n").await?;
            }
            out.flush().await
        };
        write
            .await
            .map_err(|e| TransportError::network("stdout", payload.samples, e.to_string()))
    }
}

// =============================================================================
// Memory
// =============================================================================

/// Records payloads instead of sending them
///
/// Clones share the same record, so a test can keep one handle while the
/// sender owns another. [`MemoryTransport::set_failing`] makes every
/// delivery fail with a network error until switched back.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    payloads: Arc<Mutex<Vec<Payload>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Every payload delivered so far
    pub fn payloads(&self) -> Vec<Payload> {
        self.payloads.lock().clone()
    }

    /// Number of successful deliveries
    pub fn deliveries(&self) -> usize {
        self.payloads.lock().len()
    }

    /// Drain the record
    pub fn take(&self) -> Vec<Payload> {
        std::mem::take(&mut *self.payloads.lock())
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn endpoint(&self) -> &str {
        "memory"
    }

    async fn deliver(&self, payload: Payload) -> Result<(), TransportError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(TransportError::network(
                "memory",
                payload.samples,
                "delivery disabled",
            ));
        }
        debug!(samples = payload.samples, bytes = payload.body.len(), "Recorded payload");
        self.payloads.lock().push(payload);
        Ok(())
    }
}
