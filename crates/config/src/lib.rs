//! N9E reporter configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file is a valid configuration: it reports every metric once a
//! minute to a local N9E transfer.
//!
//! # Parsing
//!
//! ```
//! use n9e_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[sender]\nbatch_size = 50").unwrap();
//! assert_eq!(config.sender.batch_size, 50);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [reporter]
//! interval = "60s"
//! prefix = "judge"
//! tags = "service=n9e-judge,region=bj"
//!
//! [sender]
//! endpoint = "http://127.0.0.1/api/collector/push?nid=1"
//! batch_size = 100
//! ```

mod error;
mod logging;
mod reporter;
mod sender;
mod units;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use reporter::ReporterConfig;
pub use sender::{DEFAULT_ENDPOINT, SenderConfig, WireFormat};
pub use units::TimeUnit;
pub use validation::{
    SUPPORTED_SCHEMES, validate_batch_size, validate_endpoint, validate_reporter,
    validate_sender,
};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Flattening and scheduling
    pub reporter: ReporterConfig,

    /// Batching and delivery
    pub sender: SenderConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::Parse)?;
        validation::validate_config(&config)?;
        Ok(config)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
