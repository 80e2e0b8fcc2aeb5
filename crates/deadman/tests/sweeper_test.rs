//! Integration tests for the Sweeper component

use deadman::types::Alert;
use deadman::{Sweeper, WatchRegistry, WatchedAlert};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Helper to create an alert with a fingerprint
fn alert(fingerprint: &str) -> Alert {
    Alert {
        status: "firing".to_string(),
        fingerprint: fingerprint.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_sweeper_evicts_and_forwards() {
    let registry = Arc::new(WatchRegistry::new());
    let (evicted_tx, mut evicted_rx) = mpsc::channel::<WatchedAlert>(16);

    registry.upsert(alert("abc"), Duration::from_millis(50));

    let sweeper = Sweeper::new(registry.clone(), evicted_tx, Duration::from_millis(20));
    sweeper.start();

    let watched = tokio::time::timeout(Duration::from_secs(2), evicted_rx.recv())
        .await
        .expect("Timeout waiting for eviction")
        .expect("Channel closed");

    assert_eq!(watched.alert.fingerprint, "abc");
    assert!(registry.is_empty());

    sweeper.stop();
}

#[tokio::test]
async fn test_sweeper_leaves_fresh_alerts_alone() {
    let registry = Arc::new(WatchRegistry::new());
    let (evicted_tx, mut evicted_rx) = mpsc::channel::<WatchedAlert>(16);

    registry.upsert(alert("abc"), Duration::from_secs(60));

    let sweeper = Sweeper::new(registry.clone(), evicted_tx, Duration::from_millis(20));
    sweeper.start();

    let result = tokio::time::timeout(Duration::from_millis(200), evicted_rx.recv()).await;
    assert!(result.is_err(), "Fresh alert must not be evicted");
    assert!(registry.contains("abc"));

    sweeper.stop();
}

#[tokio::test]
async fn test_sweeper_notifies_at_most_once() {
    let registry = Arc::new(WatchRegistry::new());
    let (evicted_tx, mut evicted_rx) = mpsc::channel::<WatchedAlert>(16);

    registry.upsert(alert("abc"), Duration::from_millis(30));

    let sweeper = Sweeper::new(registry.clone(), evicted_tx, Duration::from_millis(20));
    sweeper.start();

    let first = tokio::time::timeout(Duration::from_secs(2), evicted_rx.recv())
        .await
        .expect("Timeout waiting for eviction")
        .expect("Channel closed");
    assert_eq!(first.alert.fingerprint, "abc");

    // Ticks keep coming but the record is gone; nothing further arrives.
    let second = tokio::time::timeout(Duration::from_millis(200), evicted_rx.recv()).await;
    assert!(second.is_err(), "Evicted alert must not be notified twice");

    sweeper.stop();
}

#[tokio::test]
async fn test_sweeper_handles_multiple_expirations() {
    let registry = Arc::new(WatchRegistry::new());
    let (evicted_tx, mut evicted_rx) = mpsc::channel::<WatchedAlert>(16);

    registry.upsert(alert("one"), Duration::from_millis(30));
    registry.upsert(alert("two"), Duration::from_millis(30));
    registry.upsert(alert("three"), Duration::from_secs(60));

    let sweeper = Sweeper::new(registry.clone(), evicted_tx, Duration::from_millis(20));
    sweeper.start();

    let mut fingerprints = Vec::new();
    for _ in 0..2 {
        let watched = tokio::time::timeout(Duration::from_secs(2), evicted_rx.recv())
            .await
            .expect("Timeout waiting for eviction")
            .expect("Channel closed");
        fingerprints.push(watched.alert.fingerprint);
    }
    fingerprints.sort();

    assert_eq!(fingerprints, vec!["one", "two"]);
    assert!(registry.contains("three"));

    sweeper.stop();
}

#[tokio::test]
async fn test_refreshed_alert_survives_sweeps() {
    let registry = Arc::new(WatchRegistry::new());
    let (evicted_tx, mut evicted_rx) = mpsc::channel::<WatchedAlert>(16);

    registry.upsert(alert("abc"), Duration::from_millis(60));

    let sweeper = Sweeper::new(registry.clone(), evicted_tx, Duration::from_millis(20));
    sweeper.start();

    // Keep refreshing faster than the grace period for a while.
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(30)).await;
        registry.upsert(alert("abc"), Duration::from_millis(60));
    }

    assert!(registry.contains("abc"));

    // Stop refreshing; the sweeper evicts within one grace period plus
    // one poll interval.
    let watched = tokio::time::timeout(Duration::from_secs(2), evicted_rx.recv())
        .await
        .expect("Timeout waiting for eviction")
        .expect("Channel closed");
    assert_eq!(watched.alert.fingerprint, "abc");

    sweeper.stop();
}

#[tokio::test]
async fn test_stopped_sweeper_evicts_nothing() {
    let registry = Arc::new(WatchRegistry::new());
    let (evicted_tx, mut evicted_rx) = mpsc::channel::<WatchedAlert>(16);

    let sweeper = Sweeper::new(registry.clone(), evicted_tx, Duration::from_millis(20));
    sweeper.start();
    sweeper.stop();

    // Give the stop a moment to land before arming the alert.
    tokio::time::sleep(Duration::from_millis(50)).await;
    registry.upsert(alert("abc"), Duration::from_millis(10));

    let result = tokio::time::timeout(Duration::from_millis(200), evicted_rx.recv()).await;
    assert!(matches!(result, Err(_) | Ok(None)));
    assert!(registry.contains("abc"));
}
