//! Wire encoders
//!
//! An encoder turns one batch of samples into one request body. The sender
//! picks the encoder from `[sender] format`.

mod json;
mod line;

pub use json::N9eJsonEncoder;
pub use line::GraphiteLineEncoder;

use thiserror::Error;

use crate::sample::Sample;

/// A batch serialized for one delivery
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub body: Vec<u8>,
    pub content_type: &'static str,
    /// Number of samples carried by `body`
    pub samples: usize,
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }
}

/// Encoding failures
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Trait for batch encoders
pub trait Encoder: Send + Sync {
    /// Encode a whole batch into one body
    fn encode(&self, samples: &[Sample]) -> Result<Payload, EncodeError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
