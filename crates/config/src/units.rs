//! Time units used for rate and duration conversion

use serde::Deserialize;

const NANOS_PER_MICRO: f64 = 1_000.0;
const NANOS_PER_MILLI: f64 = 1_000_000.0;
const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// A unit of time.
///
/// Rates recorded by meters are per second and durations recorded by timers
/// are in nanoseconds; the reporter rescales both into the configured unit.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Length of one unit in nanoseconds
    pub fn as_nanos(self) -> f64 {
        match self {
            Self::Nanoseconds => 1.0,
            Self::Microseconds => NANOS_PER_MICRO,
            Self::Milliseconds => NANOS_PER_MILLI,
            Self::Seconds => NANOS_PER_SECOND,
            Self::Minutes => 60.0 * NANOS_PER_SECOND,
            Self::Hours => 3_600.0 * NANOS_PER_SECOND,
            Self::Days => 86_400.0 * NANOS_PER_SECOND,
        }
    }

    /// Length of one unit in seconds
    pub fn as_secs_f64(self) -> f64 {
        self.as_nanos() / NANOS_PER_SECOND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        unit: TimeUnit,
    }

    #[test]
    fn test_seconds_per_unit() {
        assert_eq!(TimeUnit::Seconds.as_secs_f64(), 1.0);
        assert_eq!(TimeUnit::Minutes.as_secs_f64(), 60.0);
        assert_eq!(TimeUnit::Milliseconds.as_secs_f64(), 0.001);
        assert_eq!(TimeUnit::Days.as_secs_f64(), 86_400.0);
    }

    #[test]
    fn test_nanos_per_unit() {
        assert_eq!(TimeUnit::Nanoseconds.as_nanos(), 1.0);
        assert_eq!(TimeUnit::Milliseconds.as_nanos(), 1_000_000.0);
        assert_eq!(TimeUnit::Hours.as_nanos(), 3.6e12);
    }

    #[test]
    fn test_deserialize_lowercase() {
        let w: Wrapper = toml::from_str("unit = \"microseconds\"").unwrap();
        assert_eq!(w.unit, TimeUnit::Microseconds);
        assert!(toml::from_str::<Wrapper>("unit = \"fortnights\"").is_err());
    }
}
