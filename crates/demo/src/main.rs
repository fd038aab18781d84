//! N9E demo - a job queue whose backlog is pushed to Nightingale
//!
//! # Usage
//!
//! ```bash
//! # Report to the local N9E transfer once a minute
//! n9e-demo
//! n9e-demo --config configs/demo.toml
//!
//! # Print payloads instead of sending them
//! n9e-demo --dry-run --log-level debug
//! ```

mod queue;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use n9e_config::{Config, LogFormat, SenderConfig, WireFormat, validate_sender};
use n9e_metrics::MetricRegistry;
use n9e_reporter::{GraphiteLineEncoder, N9eJsonEncoder, Reporter, Sender, StdoutTransport};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::queue::{JobQueue, Step};

/// Registry name of the backlog counter
const PENDING_JOBS: &str = "queue.pending-jobs.size";

/// Upper bound on queued jobs
const QUEUE_CAPACITY: usize = 10_000;

/// Time between producer/consumer steps
const STEP_INTERVAL: Duration = Duration::from_millis(200);

/// Job queue demo reporting to N9E
#[derive(Parser, Debug)]
#[command(name = "n9e-demo")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long)]
    log_level: Option<String>,

    /// Collector endpoint. Overrides config file.
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Write payloads to stdout instead of sending them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(endpoint) = cli.endpoint {
        config.sender.endpoint = endpoint;
        validate_sender(&config.sender).context("invalid --endpoint")?;
    }

    let log_level = cli
        .log_level
        .unwrap_or_else(|| config.log.level.as_str().to_string());
    init_logging(&log_level, config.log.format)?;

    let registry = Arc::new(MetricRegistry::new());
    let queue = JobQueue::new(QUEUE_CAPACITY, registry.counter(PENDING_JOBS)?);

    let sender = build_sender(&config.sender, cli.dry_run)?;
    let sender_metrics = sender.metrics();

    let reporter = Reporter::for_registry(registry)
        .with_config(&config.reporter)
        .with_tags(with_instance_tag(&config.reporter.tags, &local_hostname()))
        .build(sender);
    info!(
        endpoint = %reporter.sender().endpoint(),
        tags = %reporter.tags(),
        dry_run = cli.dry_run,
        "Starting job queue demo"
    );

    let handle = if config.reporter.enabled {
        Some(reporter.start(config.reporter.interval))
    } else {
        info!("Reporting disabled in config");
        None
    };

    run_jobs(&queue).await;

    if let Some(handle) = handle {
        handle.stop().await;
    }

    let stats = sender_metrics.snapshot();
    info!(
        pending = queue.len(),
        batches_delivered = stats.batches_delivered,
        batches_failed = stats.batches_failed,
        samples_delivered = stats.samples_delivered,
        samples_dropped = stats.samples_dropped,
        samples_skipped = stats.samples_skipped,
        "Demo stopped"
    );
    Ok(())
}

/// Produce and consume jobs until Ctrl+C
async fn run_jobs(queue: &JobQueue) {
    let mut interval = tokio::time::interval(STEP_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl+C");
                }
                break;
            }
            _ = interval.tick() => {
                match queue.step(rand::random::<f64>()) {
                    Step::Submitted(job) => debug!(job = job.id, "Job submitted"),
                    Step::Took(job) => debug!(job = job.id, "Job taken"),
                    Step::Idle => {}
                    Step::Full => warn!(capacity = QUEUE_CAPACITY, "Job queue full"),
                }
            }
        }
    }
}

fn build_sender(config: &SenderConfig, dry_run: bool) -> Result<Sender> {
    let batch_size = config.batch_size;
    let sender = if dry_run {
        match config.format {
            WireFormat::N9e => {
                Sender::with_transport(N9eJsonEncoder::new(), StdoutTransport, batch_size)?
            }
            WireFormat::Graphite => {
                Sender::with_transport(GraphiteLineEncoder::new(), StdoutTransport, batch_size)?
            }
        }
    } else {
        Sender::from_config(config)?
    };
    Ok(sender)
}

fn local_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// Append `instance=<host>` unless the tags already name an instance
fn with_instance_tag(tags: &str, host: &str) -> String {
    let tags = tags.trim().trim_end_matches(',');
    let has_instance = tags
        .split(',')
        .any(|t| t.split_once('=').is_some_and(|(k, _)| k.trim() == "instance"));

    if has_instance {
        tags.to_string()
    } else if tags.is_empty() {
        format!("instance={}", host)
    } else {
        format!("{},instance={}", tags, host)
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Console => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }

    Ok(())
}
