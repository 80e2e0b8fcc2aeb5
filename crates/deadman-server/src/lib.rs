//! Deadman watchdog receiver service.
//!
//! Accepts Alertmanager webhook events that act as heartbeats, tracks
//! them in the in-memory registry from the `deadman` crate and notifies
//! configured transports when a heartbeat stops being refreshed within
//! its grace period.
//!
//! # Components
//!
//! - **config**: environment-sourced runtime configuration
//! - **api**: axum ingest surface (`POST /webhook`, `GET /ping`)
//! - **notifier**: Slack and PagerDuty transports plus dispatch fan-out
//! - **server**: task wiring and process lifecycle
//!
//! Registry state is volatile: a restart silently re-arms all watches
//! from empty.

pub mod api;
pub mod config;
pub mod notifier;
pub mod server;

pub use config::{Config, ConfigError};
pub use notifier::{Dispatcher, Notifier, NotifyError};
pub use server::DeadmanServer;
