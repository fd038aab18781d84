//! Sender configuration
//!
//! Where batches go, how large they may grow, and how they are encoded.

use serde::Deserialize;
use std::time::Duration;

/// Endpoint used when none is configured (local N9E transfer, collector 1)
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1/api/collector/push?nid=1";

/// Wire format of one flushed batch
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// N9E push API: JSON array of sample objects (default)
    #[default]
    N9e,
    /// Graphite plaintext protocol with tags
    Graphite,
}

/// Sender configuration
///
/// # Example
///
/// ```toml
/// [sender]
/// endpoint = "http://n9e-transfer:8008/api/collector/push?nid=12"
/// batch_size = 200
/// timeout = "5s"
/// format = "n9e"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Collector URL: `http://`, `https://` or `tcp://host:port`
    pub endpoint: String,

    /// Samples buffered before an automatic flush
    /// Default: 100
    pub batch_size: usize,

    /// Deadline for one delivery attempt
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Default: n9e
    pub format: WireFormat,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            batch_size: 100,
            timeout: Duration::from_secs(10),
            format: WireFormat::N9e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SenderConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.format, WireFormat::N9e);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
endpoint = "tcp://graphite:2003"
batch_size = 500
timeout = "2s"
format = "graphite"
"#;
        let config: SenderConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.endpoint, "tcp://graphite:2003");
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.format, WireFormat::Graphite);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result: Result<SenderConfig, _> = toml::from_str("format = \"statsd\"");
        assert!(result.is_err());
    }
}
