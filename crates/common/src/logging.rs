//! Logging utilities for the deadman receiver components.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize tracing with sensible defaults.
///
/// Uses the RUST_LOG environment variable to control log levels when set.
/// Otherwise the default level is DEBUG when `debug` is true, INFO when not.
pub fn init(debug: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(default_filter(debug))
        .init();
}

/// Initialize tracing with JSON formatting (useful for structured logging).
pub fn init_json(debug: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(default_filter(debug))
        .init();
}

fn default_filter(debug: bool) -> EnvFilter {
    let fallback = if debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}
