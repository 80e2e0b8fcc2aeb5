//! Recurring expiry sweep task.

use crate::registry::{WatchRegistry, WatchedAlert};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::time::{Instant, interval};
use tracing::{debug, info, warn};

/// Recurring task that evicts expired alerts from the registry and hands
/// them off for notification.
///
/// The poll interval is fixed and independent of per-alert grace periods;
/// it bounds the worst-case notification latency to one interval. Evicted
/// records are forwarded over a bounded channel so notification I/O never
/// runs on the sweep path.
pub struct Sweeper {
    registry: Arc<WatchRegistry>,
    evicted_tx: mpsc::Sender<WatchedAlert>,
    poll_interval: Duration,
    stop_signal: Arc<Notify>,
}

impl Sweeper {
    /// Create a new sweeper.
    pub fn new(
        registry: Arc<WatchRegistry>,
        evicted_tx: mpsc::Sender<WatchedAlert>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            registry,
            evicted_tx,
            poll_interval,
            stop_signal: Arc::new(Notify::new()),
        }
    }

    /// Start the sweep loop as a background task.
    pub fn start(&self) {
        let registry = self.registry.clone();
        let evicted_tx = self.evicted_tx.clone();
        let poll_interval = self.poll_interval;
        let stop_signal = self.stop_signal.clone();

        tokio::spawn(async move {
            info!(poll_interval = ?poll_interval, "Sweeper task started");

            let mut tick = interval(poll_interval);
            tick.tick().await; // Skip first immediate tick

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        Self::sweep_once(&registry, &evicted_tx, Instant::now());
                    }
                    _ = stop_signal.notified() => {
                        info!("Sweeper task stopping");
                        break;
                    }
                }
            }
        });
    }

    /// Stop the sweep loop.
    pub fn stop(&self) {
        self.stop_signal.notify_one();
    }

    /// One sweep pass: evict expired records and forward them without
    /// blocking on the consumer.
    fn sweep_once(
        registry: &WatchRegistry,
        evicted_tx: &mpsc::Sender<WatchedAlert>,
        now: Instant,
    ) {
        let evicted = registry.sweep_expired(now);
        if evicted.is_empty() {
            debug!(watched = registry.len(), "Sweep found no expired alerts");
            return;
        }

        for watched in evicted {
            let fingerprint = watched.alert.fingerprint.clone();
            info!(
                fingerprint = %fingerprint,
                "Alert has expired and is now considered missing, triggering notifiers"
            );

            // A saturated dispatcher must not stall the tick; notification
            // is best-effort.
            if let Err(e) = evicted_tx.try_send(watched) {
                warn!(
                    fingerprint = %fingerprint,
                    error = %e,
                    "Dropping expiry notification"
                );
            }
        }
    }
}
