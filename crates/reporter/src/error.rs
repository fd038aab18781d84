//! Delivery error types

use std::time::Duration;

use thiserror::Error;

/// Errors raised while flushing a batch
///
/// Every variant names the endpoint and how many samples were lost with it.
/// None of them is fatal: the reporter logs the error and tries again next
/// cycle with fresh samples.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The batch could not be serialized
    #[error("failed to encode {samples} samples for {endpoint}: {message}")]
    Encode {
        endpoint: String,
        samples: usize,
        message: String,
    },

    /// Connect or write failed
    #[error("network error sending {samples} samples to {endpoint}: {message}")]
    Network {
        endpoint: String,
        samples: usize,
        message: String,
    },

    /// The transport gave up after its configured timeout
    #[error("timed out after {timeout:?} sending {samples} samples to {endpoint}")]
    Timeout {
        endpoint: String,
        samples: usize,
        timeout: Duration,
    },

    /// The collector answered with a non-2xx status
    #[error("{endpoint} rejected {samples} samples: HTTP {status}")]
    Server {
        endpoint: String,
        samples: usize,
        status: u16,
    },
}

impl TransportError {
    /// Create a Network error
    pub fn network(endpoint: &str, samples: usize, message: impl Into<String>) -> Self {
        Self::Network {
            endpoint: endpoint.to_string(),
            samples,
            message: message.into(),
        }
    }

    /// Number of samples the failed delivery carried
    pub fn samples(&self) -> usize {
        match self {
            Self::Encode { samples, .. }
            | Self::Network { samples, .. }
            | Self::Timeout { samples, .. }
            | Self::Server { samples, .. } => *samples,
        }
    }

    /// Endpoint the delivery was addressed to
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Encode { endpoint, .. }
            | Self::Network { endpoint, .. }
            | Self::Timeout { endpoint, .. }
            | Self::Server { endpoint, .. } => endpoint,
        }
    }
}
