//! Main deadman server wiring.

use crate::api::{self, AppState};
use crate::config::Config;
use crate::notifier::{Dispatcher, build_notifiers};
use common::{Error, Result};
use deadman::{Sweeper, WatchRegistry, WatchedAlert};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

/// Buffer between the sweeper and the notifier dispatcher.
const EVICTED_CHANNEL_SIZE: usize = 1024;

/// Deadman watchdog receiver server.
pub struct DeadmanServer {
    config: Config,
}

impl DeadmanServer {
    /// Create a new server from its runtime configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the server.
    ///
    /// Initializes the notifier transports, starts the sweep and dispatch
    /// tasks and serves the ingest API for the process lifetime. Startup
    /// failures (transport auth, port binding) are fatal before any
    /// traffic is served.
    pub async fn run(self) -> Result<()> {
        let registry = Arc::new(WatchRegistry::new());

        let notifiers = build_notifiers(&self.config)
            .await
            .map_err(Error::notifier)?;

        let (evicted_tx, evicted_rx) = mpsc::channel::<WatchedAlert>(EVICTED_CHANNEL_SIZE);

        let dispatcher = Dispatcher::new(evicted_rx, notifiers);
        tokio::spawn(async move {
            dispatcher.run().await;
        });

        let sweeper = Sweeper::new(registry.clone(), evicted_tx, self.config.check_interval);
        sweeper.start();

        let app = api::create_router(AppState {
            registry,
            expire_duration: self.config.expire_duration,
        });

        let addr = format!("0.0.0.0:{}", self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::server(format!("could not bind {addr}: {e}")))?;
        info!(addr = %addr, "Deadman receiver listening");

        axum::serve(listener, app).await.map_err(Error::server)?;

        Ok(())
    }
}
