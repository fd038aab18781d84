//! Configuration validation
//!
//! Validates config consistency:
//! - Sender batch size is positive
//! - Sender endpoint names a supported scheme and a host
//! - Reporter interval is positive when reporting is enabled

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::reporter::ReporterConfig;
use crate::sender::SenderConfig;

/// Endpoint schemes a sender can deliver to
pub const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "tcp"];

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_reporter(&config.reporter)?;
    validate_sender(&config.sender)?;
    Ok(())
}

/// Validate the reporter section
pub fn validate_reporter(reporter: &ReporterConfig) -> Result<()> {
    if reporter.enabled && reporter.interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "reporter",
            "interval",
            "must be greater than zero",
        ));
    }
    Ok(())
}

/// Validate the sender section
pub fn validate_sender(sender: &SenderConfig) -> Result<()> {
    validate_batch_size(sender.batch_size)?;
    validate_endpoint(&sender.endpoint)
}

/// Reject a zero batch capacity
pub fn validate_batch_size(batch_size: usize) -> Result<()> {
    if batch_size == 0 {
        return Err(ConfigError::invalid_value(
            "sender",
            "batch_size",
            "must be at least 1",
        ));
    }
    Ok(())
}

/// Check the scheme and authority of an endpoint string
///
/// This is a shape check only; the sender parses the full URL when it
/// builds its transport.
pub fn validate_endpoint(endpoint: &str) -> Result<()> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(ConfigError::missing_field("sender", "endpoint"));
    }

    let Some((scheme, rest)) = endpoint.split_once("://") else {
        return Err(ConfigError::invalid_value(
            "sender",
            "endpoint",
            format!("'{}' is not a URL", endpoint),
        ));
    };

    let scheme = scheme.to_ascii_lowercase();
    if !SUPPORTED_SCHEMES.contains(&scheme.as_str()) {
        return Err(ConfigError::invalid_value(
            "sender",
            "endpoint",
            format!(
                "unsupported scheme '{}' (expected one of: {})",
                scheme,
                SUPPORTED_SCHEMES.join(", ")
            ),
        ));
    }

    let authority = rest.split(['/', '?']).next().unwrap_or_default();
    if authority.is_empty() {
        return Err(ConfigError::invalid_value(
            "sender",
            "endpoint",
            format!("'{}' has no host", endpoint),
        ));
    }

    if scheme == "tcp" && !authority.contains(':') {
        return Err(ConfigError::invalid_value(
            "sender",
            "endpoint",
            format!("'{}' needs an explicit port", endpoint),
        ));
    }

    Ok(())
}
