//! Deadman receiver binary.

use deadman_server::{Config, DeadmanServer};

#[tokio::main]
async fn main() -> common::Result<()> {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Tracing is not initialized yet.
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    common::logging::init(config.debug);

    tracing::info!("Starting Alertmanager deadman receiver");
    config.log_summary();

    DeadmanServer::new(config).run().await
}
