//! End-to-end delivery to an HTTP collector

use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use n9e_config::{SenderConfig, WireFormat};
use n9e_metrics::{ManualClock, MetricRegistry};
use n9e_reporter::{Reporter, Sender, TransportError};
use serde_json::json;

const NOW_MILLIS: i64 = 1_700_000_000_000;

#[tokio::test]
async fn test_report_posts_n9e_json_with_nid() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/collector/push")
        .match_query(Matcher::UrlEncoded("nid".into(), "7".into()))
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!([
            {"metric": "app.jobs.count", "tags": "env=prod", "value": 5, "timestamp": 1_700_000_000, "nid": "7"}
        ])))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let registry = Arc::new(MetricRegistry::new());
    registry.counter("jobs").unwrap().add(5);

    let endpoint = format!("{}/api/collector/push?nid=7", server.url());
    let sender = Sender::new(&endpoint, 100).unwrap();
    let mut reporter = Reporter::for_registry(registry)
        .with_clock(Arc::new(ManualClock::new(NOW_MILLIS)))
        .prefixed_with("app")
        .with_tags("env=prod")
        .build(sender);

    reporter.report_now().await;

    mock.assert_async().await;
    assert_eq!(reporter.sender().stats().batches_delivered, 1);
}

#[tokio::test]
async fn test_server_error_is_reported_and_batch_dropped() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/push")
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let mut sender = Sender::new(&format!("{}/push", server.url()), 100).unwrap();

    sender.send("jobs.count", "", 1i64, 1).await.unwrap();
    let err = sender.flush().await.unwrap_err();
    assert!(matches!(
        err,
        TransportError::Server {
            status: 503,
            samples: 1,
            ..
        }
    ));
    assert!(sender.pending().is_empty());

    // The reporter swallows the same failure
    let registry = Arc::new(MetricRegistry::new());
    registry.counter("jobs").unwrap().inc();
    let mut reporter = Reporter::for_registry(registry).build(sender);
    reporter.report_now().await;

    mock.assert_async().await;
    let stats = reporter.sender().stats();
    assert_eq!(stats.batches_failed, 2);
    assert_eq!(stats.samples_dropped, 2);
}

#[tokio::test]
async fn test_graphite_over_http() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/metrics")
        .match_header("content-type", "text/plain")
        .match_body("jobs.count;env=prod 3 1700000000\n")
        .with_status(204)
        .create_async()
        .await;

    let mut sender = Sender::from_config(&SenderConfig {
        endpoint: format!("{}/metrics", server.url()),
        batch_size: 10,
        timeout: Duration::from_secs(5),
        format: WireFormat::Graphite,
    })
    .unwrap();

    sender
        .send("jobs.count", "env=prod", 3i64, 1_700_000_000)
        .await
        .unwrap();
    sender.flush().await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_collector_is_network_error() {
    // Port 9 (discard) on localhost is closed in test environments
    let mut sender = Sender::from_config(&SenderConfig {
        endpoint: "http://127.0.0.1:9/api/collector/push".into(),
        batch_size: 10,
        timeout: Duration::from_secs(2),
        format: WireFormat::N9e,
    })
    .unwrap();

    sender.send("jobs.count", "", 1i64, 1).await.unwrap();
    let err = sender.flush().await.unwrap_err();
    assert!(matches!(
        err,
        TransportError::Network { .. } | TransportError::Timeout { .. }
    ));
}
