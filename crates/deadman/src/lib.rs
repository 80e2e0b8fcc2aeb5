//! Deadman receiver core library.
//!
//! Expiry tracking for "still alive" watchdog alerts: a monitoring
//! pipeline posts recurring heartbeat alerts, and this library keeps a
//! volatile registry of the ones currently under watch. When a heartbeat
//! stops being refreshed within its grace period, the sweeper evicts it
//! and hands it off for notification.
//!
//! # Components
//!
//! - **types**: Alertmanager webhook wire types
//! - **registry**: fingerprint-keyed map of watched alerts
//! - **sweeper**: recurring task that evicts expired alerts
//!
//! The registry is an explicitly owned value shared behind an `Arc`; the
//! HTTP ingest surface and the notifier transports live in the
//! `deadman-server` crate.

pub mod registry;
pub mod sweeper;
pub mod types;

pub use registry::{WatchRegistry, WatchedAlert};
pub use sweeper::Sweeper;
pub use types::{Alert, STATUS_FIRING, WebhookMessage};
