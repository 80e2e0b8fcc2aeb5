//! Fingerprint-keyed registry of watched heartbeat alerts.

use crate::types::Alert;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// A heartbeat alert under watch.
///
/// Holds the last received payload (kept only for the eventual expiry
/// notification) and the absolute deadline after which the heartbeat is
/// considered missing.
#[derive(Debug, Clone)]
pub struct WatchedAlert {
    pub alert: Alert,
    pub expires_at: Instant,
}

/// Registry of watched alerts keyed by fingerprint.
///
/// The registry exclusively owns its records and is shared behind an
/// `Arc` between the ingest handlers and the expiry sweeper. All methods
/// take `&self`; the underlying `DashMap` locks per shard, so a sweep
/// never serializes ingest of unrelated fingerprints.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    alerts: DashMap<String, WatchedAlert>,
}

impl WatchRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            alerts: DashMap::new(),
        }
    }

    /// Insert or refresh a watched alert, using the current instant as the
    /// refresh time.
    pub fn upsert(&self, alert: Alert, ttl: Duration) {
        self.upsert_at(Instant::now(), alert, ttl);
    }

    /// Insert or refresh a watched alert relative to an explicit instant.
    ///
    /// A refresh replaces the stored payload and moves the deadline to
    /// `now + ttl`. A zero `ttl` is applied as-is and simply expires on
    /// the next sweep. Never fails.
    pub fn upsert_at(&self, now: Instant, alert: Alert, ttl: Duration) {
        let fingerprint = alert.fingerprint.clone();
        let watched = WatchedAlert {
            alert,
            expires_at: now + ttl,
        };

        if self.alerts.insert(fingerprint.clone(), watched).is_some() {
            debug!(fingerprint = %fingerprint, "Refreshing alert expiry");
        } else {
            info!(fingerprint = %fingerprint, "Registering new alert");
        }
    }

    /// Remove and return every record whose deadline has passed.
    ///
    /// Eviction is atomic per record: the deadline is re-checked under the
    /// shard lock, so a refresh that races with the sweep keeps its record
    /// and a record is never removed without appearing in the result. The
    /// order of the returned records is unspecified.
    pub fn sweep_expired(&self, now: Instant) -> Vec<WatchedAlert> {
        let candidates: Vec<String> = self
            .alerts
            .iter()
            .filter(|entry| entry.expires_at < now)
            .map(|entry| entry.key().clone())
            .collect();

        let mut evicted = Vec::with_capacity(candidates.len());
        for fingerprint in candidates {
            if let Some((_, watched)) = self
                .alerts
                .remove_if(&fingerprint, |_, watched| watched.expires_at < now)
            {
                evicted.push(watched);
            }
        }

        evicted
    }

    /// Get a snapshot of a watched alert.
    pub fn get(&self, fingerprint: &str) -> Option<WatchedAlert> {
        self.alerts.get(fingerprint).map(|entry| entry.value().clone())
    }

    /// Whether a fingerprint is currently under watch.
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.alerts.contains_key(fingerprint)
    }

    /// Number of alerts currently under watch.
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
