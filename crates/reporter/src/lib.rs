//! N9E - Reporter
//!
//! Pushes in-process metrics to a Nightingale (N9E) collector.
//!
//! # Overview
//!
//! Once per period the [`Reporter`] reads a [`RegistrySnapshot`], flattens
//! every metric into named, tagged, timestamped [`Sample`]s and pushes them
//! into a [`Sender`]. The sender batches samples, encodes full batches
//! (N9E JSON or Graphite plaintext) and hands them to a [`Transport`] (HTTP,
//! TCP, stdout or memory).
//!
//! ```text
//! tick → snapshot → flatten → Sender::send ─(capacity)→ flush → Transport
//!                                  └──────(end of cycle)→ flush ─┘
//! ```
//!
//! Delivery is best effort: one attempt per batch, failed batches are
//! dropped and logged, and the reporter carries on with the next cycle.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use n9e_metrics::MetricRegistry;
//! use n9e_reporter::{Reporter, Sender};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(MetricRegistry::new());
//! registry.counter("queue.pending-jobs.size")?.inc();
//!
//! let sender = Sender::new("http://127.0.0.1/api/collector/push?nid=1", 100)?;
//! let handle = Reporter::for_registry(registry)
//!     .prefixed_with("judge")
//!     .with_tags("service=n9e-judge,region=bj")
//!     .build(sender)
//!     .start(Duration::from_secs(60));
//!
//! // ...
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod encode;
pub mod flatten;
pub mod transport;

mod error;
mod reporter;
mod sample;
mod sender;

pub use encode::{Encoder, GraphiteLineEncoder, N9eJsonEncoder, Payload};
pub use error::TransportError;
pub use flatten::Flattener;
pub use reporter::{Reporter, ReporterBuilder, ReporterHandle};
pub use sample::Sample;
pub use sender::{Sender, SenderMetrics, SenderStats};
pub use transport::{HttpTransport, MemoryTransport, StdoutTransport, TcpTransport, Transport};

pub use n9e_config::TimeUnit;
pub use n9e_metrics::RegistrySnapshot;
