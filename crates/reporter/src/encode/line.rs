//! Graphite plaintext encoder
//!
//! One line per sample: `name;k=v;k=v value timestamp`. The reporter's tag
//! string (`k=v,k=v`) becomes Graphite tags. Entries without `=` are dropped.

use std::fmt::Write;

use super::{EncodeError, Encoder, Payload};
use crate::sample::Sample;
use n9e_metrics::Value;

const CONTENT_TYPE: &str = "text/plain";

/// Encodes a batch as Graphite plaintext protocol lines
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphiteLineEncoder;

impl GraphiteLineEncoder {
    pub fn new() -> Self {
        Self
    }
}

/// Graphite paths cannot contain whitespace or the tag separator
fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_whitespace() || c == ';' { '_' } else { c })
        .collect()
}

fn write_tags(line: &mut String, tags: &str) {
    for tag in tags.split(',').map(str::trim) {
        let Some((key, value)) = tag.split_once('=') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        line.push(';');
        line.push_str(&sanitize(key));
        line.push('=');
        line.push_str(&sanitize(value));
    }
}

impl Encoder for GraphiteLineEncoder {
    fn encode(&self, samples: &[Sample]) -> Result<Payload, EncodeError> {
        let mut body = String::with_capacity(samples.len() * 64);
        let mut written = 0;

        for sample in samples {
            // Plaintext carries finite numbers only
            if sample.value.is_non_finite() {
                continue;
            }
            let value = match &sample.value {
                Value::Text(_) => continue,
                Value::Bool(b) => u8::from(*b).to_string(),
                other => other.to_string(),
            };

            body.push_str(&sanitize(&sample.name));
            write_tags(&mut body, &sample.tags);
            let _ = writeln!(body, " {} {}", value, sample.timestamp);
            written += 1;
        }

        Ok(Payload {
            body: body.into_bytes(),
            content_type: CONTENT_TYPE,
            samples: written,
        })
    }

    fn name(&self) -> &'static str {
        "graphite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(samples: &[Sample]) -> (String, usize) {
        let payload = GraphiteLineEncoder::new().encode(samples).unwrap();
        (String::from_utf8(payload.body).unwrap(), payload.samples)
    }

    #[test]
    fn test_encode_lines_with_tags() {
        let (body, count) = encode(&[
            Sample::new("app.jobs.count", "env=prod, region=bj", 5i64, 100),
            Sample::new("app.latency.p99", "env=prod, region=bj", 48.5, 100),
        ]);

        assert_eq!(count, 2);
        assert_eq!(
            body,
            "app.jobs.count;env=prod;region=bj 5 100\napp.latency.p99;env=prod;region=bj 48.5 100\n"
        );
    }

    #[test]
    fn test_text_skipped_and_bool_numeric() {
        let (body, count) = encode(&[
            Sample::new("build.version", "", "1.2.3", 7),
            Sample::new("feature.enabled", "", true, 7),
        ]);

        assert_eq!(count, 1);
        assert_eq!(body, "feature.enabled 1 7\n");
    }

    #[test]
    fn test_non_finite_skipped() {
        let (body, count) = encode(&[
            Sample::new("queue.ratio", "", f64::NAN, 7),
            Sample::new("queue.rate", "", f64::NEG_INFINITY, 7),
            Sample::new("queue.size", "", 2.5, 7),
        ]);

        assert_eq!(count, 1);
        assert_eq!(body, "queue.size 2.5 7\n");
    }

    #[test]
    fn test_malformed_tags_dropped_and_names_sanitized() {
        let (body, _) = encode(&[Sample::new("queue size", "broken,,k=v,=x", 1u64, 3)]);
        assert_eq!(body, "queue_size;k=v 1 3\n");
    }
}
