//! Errors raised while loading reporter configuration
//!
//! Messages name the TOML section and key so a bad `reporter.toml` can be
//! fixed without reading code, e.g. `[sender].batch_size is invalid: must be
//! at least 1`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Not TOML, or a key has the wrong type
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("[{section}] needs a value for '{field}'")]
    MissingField {
        section: &'static str,
        field: &'static str,
    },

    /// Parsed fine but cannot be used, e.g. a zero batch size or an endpoint
    /// with an unsupported scheme
    #[error("[{section}].{field} is invalid: {message}")]
    InvalidValue {
        section: &'static str,
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    pub fn missing_field(section: &'static str, field: &'static str) -> Self {
        Self::MissingField { section, field }
    }

    pub fn invalid_value(
        section: &'static str,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            section,
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_section_and_key() {
        let err = ConfigError::missing_field("sender", "endpoint");
        assert_eq!(err.to_string(), "[sender] needs a value for 'endpoint'");
    }

    #[test]
    fn test_invalid_value_message() {
        let err = ConfigError::invalid_value("sender", "batch_size", "must be at least 1");
        assert_eq!(err.to_string(), "[sender].batch_size is invalid: must be at least 1");
    }

    #[test]
    fn test_read_error_names_path() {
        let err = ConfigError::Read {
            path: PathBuf::from("/etc/n9e/reporter.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().starts_with("cannot read config file /etc/n9e/reporter.toml"));
    }
}
