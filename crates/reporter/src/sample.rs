//! The flat unit of transmission

use n9e_metrics::Value;
use serde::Serialize;

/// One named, tagged, timestamped value ready to be batched
///
/// `tags` is the reporter's tag string, attached verbatim.
/// `timestamp` is in seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub name: String,
    pub tags: String,
    pub value: Value,
    pub timestamp: i64,
}

impl Sample {
    pub fn new(
        name: impl Into<String>,
        tags: impl Into<String>,
        value: impl Into<Value>,
        timestamp: i64,
    ) -> Self {
        Self {
            name: name.into(),
            tags: tags.into(),
            value: value.into(),
            timestamp,
        }
    }
}
