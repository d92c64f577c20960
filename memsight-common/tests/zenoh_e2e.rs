//! End-to-end tests with Zenoh pub/sub.
//!
//! These tests verify that metric batches can be published and received through Zenoh.
//!
//! Note: Zenoh requires multi-thread tokio runtime.
//! Each test uses a unique key prefix to avoid interference.

use std::time::Duration;
use memsight_common::{
    Format, MetricBatch, MetricRecord, Unit, batch_key, decode_auto, encode, parse_batch_key,
};

/// Generate a unique test prefix to avoid test interference.
fn unique_prefix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test_{}", nanos)
}

fn batch(source: &str) -> MetricBatch {
    MetricBatch {
        namespace: "System/Linux".to_string(),
        source: source.to_string(),
        records: vec![MetricRecord::new(
            "MemoryUtilization",
            1_700_000_000_000,
            Unit::Percent,
            42.0,
        )],
    }
}

/// Test publishing and subscribing to a metric batch through Zenoh.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_zenoh_pubsub_batch() {
    let prefix = unique_prefix();

    let session = zenoh::open(zenoh::Config::default())
        .await
        .expect("Failed to open Zenoh session");

    let subscriber = session
        .declare_subscriber(format!("{}/**", prefix))
        .await
        .expect("Failed to create subscriber");

    // Give subscriber time to set up
    tokio::time::sleep(Duration::from_millis(100)).await;

    let key = batch_key(&prefix, "System/Linux", "host-a");
    let encoded = encode(&batch("host-a"), Format::Json).expect("Failed to encode");

    session.put(&key, encoded).await.expect("Failed to publish");

    let received = tokio::time::timeout(Duration::from_secs(5), subscriber.recv_async())
        .await
        .expect("Timeout waiting for message")
        .expect("Failed to receive message");

    let received_key = received.key_expr().as_str().to_string();
    let parsed = parse_batch_key(&prefix, &received_key).expect("Unexpected key");
    assert_eq!(parsed.namespace, "System/Linux");
    assert_eq!(parsed.source, "host-a");

    let payload = received.payload().to_bytes();
    let decoded: MetricBatch = decode_auto(&payload).expect("Failed to decode");
    assert_eq!(decoded, batch("host-a"));

    drop(subscriber);
    session.close().await.expect("Failed to close session");
}

/// Test that CBOR-encoded batches can be received and decoded.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_zenoh_cbor_batch() {
    let prefix = unique_prefix();

    let session = zenoh::open(zenoh::Config::default())
        .await
        .expect("Failed to open Zenoh session");

    let subscriber = session
        .declare_subscriber(format!("{}/**", prefix))
        .await
        .expect("Failed to create subscriber");

    tokio::time::sleep(Duration::from_millis(100)).await;

    let key = batch_key(&prefix, "System/Linux", "host-b");
    let encoded = encode(&batch("host-b"), Format::Cbor).expect("Failed to encode CBOR");

    session.put(&key, encoded).await.expect("Failed to publish");

    let received = tokio::time::timeout(Duration::from_secs(5), subscriber.recv_async())
        .await
        .expect("Timeout")
        .expect("Failed to receive");

    let payload = received.payload().to_bytes();
    let decoded: MetricBatch = decode_auto(&payload).expect("Failed to auto-decode CBOR");

    assert_eq!(decoded.source, "host-b");
    assert!((decoded.records[0].value - 42.0).abs() < f64::EPSILON);

    drop(subscriber);
    session.close().await.expect("Failed to close session");
}
