//! Reporter configuration
//!
//! Controls how often the registry is flattened and what every sample is
//! named and tagged with.
//!
//! # Defaults
//!
//! - `enabled`: true
//! - `interval`: 60s
//! - `prefix`: none
//! - `tags`: empty
//! - `rate_unit`: seconds
//! - `duration_unit`: milliseconds
//! - `include` / `exclude`: empty (every metric is reported)

use serde::Deserialize;
use std::time::Duration;

use crate::units::TimeUnit;

/// Reporter configuration
///
/// # Example
///
/// ```toml
/// [reporter]
/// interval = "1m"
/// prefix = "judge"
/// tags = "service=n9e-judge,region=bj"
/// rate_unit = "seconds"
/// duration_unit = "milliseconds"
/// exclude = ["jvm."]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Enable periodic reporting
    /// Default: true
    pub enabled: bool,

    /// Time between reporting cycles
    /// Default: 60s
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Dotted prefix prepended to every sample name
    pub prefix: Option<String>,

    /// Tag string attached verbatim to every sample ("k=v,k=v")
    pub tags: String,

    /// Unit meter rates are expressed in (events per unit)
    pub rate_unit: TimeUnit,

    /// Unit timer durations are expressed in
    pub duration_unit: TimeUnit,

    /// Only report metrics whose name starts with one of these prefixes.
    /// Empty means every metric.
    pub include: Vec<String>,

    /// Never report metrics whose name starts with one of these prefixes
    pub exclude: Vec<String>,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
            prefix: None,
            tags: String::new(),
            rate_unit: TimeUnit::Seconds,
            duration_unit: TimeUnit::Milliseconds,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}
