//! N9E push API encoder
//!
//! # Example Output
//!
//! ```json
//! [
//!   {"metric": "app.jobs.count", "tags": "env=prod", "value": 5, "timestamp": 1700000000, "nid": "1"}
//! ]
//! ```

use serde::Serialize;

use super::{EncodeError, Encoder, Payload};
use crate::sample::Sample;
use n9e_metrics::Value;

const CONTENT_TYPE: &str = "application/json";

/// Encodes a batch as the JSON array accepted by `/api/collector/push`
///
/// NaN and infinite floats are left out; JSON has no representation for them.
#[derive(Debug, Clone, Default)]
pub struct N9eJsonEncoder {
    nid: Option<String>,
}

impl N9eJsonEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the collector node id to every item
    pub fn with_nid(mut self, nid: impl Into<String>) -> Self {
        self.nid = Some(nid.into());
        self
    }

    pub fn nid(&self) -> Option<&str> {
        self.nid.as_deref()
    }
}

#[derive(Serialize)]
struct PushItem<'a> {
    metric: &'a str,
    tags: &'a str,
    value: &'a Value,
    timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    nid: Option<&'a str>,
}

impl Encoder for N9eJsonEncoder {
    fn encode(&self, samples: &[Sample]) -> Result<Payload, EncodeError> {
        let items: Vec<PushItem<'_>> = samples
            .iter()
            .filter(|s| !s.value.is_non_finite())
            .map(|s| PushItem {
                metric: &s.name,
                tags: &s.tags,
                value: &s.value,
                timestamp: s.timestamp,
                nid: self.nid.as_deref(),
            })
            .collect();

        Ok(Payload {
            body: serde_json::to_vec(&items)?,
            content_type: CONTENT_TYPE,
            samples: items.len(),
        })
    }

    fn name(&self) -> &'static str {
        "n9e"
    }
}
