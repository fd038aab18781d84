//! Registry error types

use thiserror::Error;

use crate::MetricKind;

/// Errors returned when registering metrics
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The name is already registered as another kind of metric
    #[error("metric '{name}' is a {registered}, not a {requested}")]
    KindMismatch {
        name: String,
        registered: MetricKind,
        requested: MetricKind,
    },

    /// Explicit registration of a name that is already taken
    #[error("metric '{name}' is already registered")]
    AlreadyExists { name: String },
}
