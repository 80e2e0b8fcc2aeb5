//! Common error types for the deadman receiver components.

use std::fmt;

/// A specialized Result type for deadman receiver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for deadman receiver operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Notifier error: {0}")]
    Notifier(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown error: {0}")]
    Other(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl fmt::Display) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new notifier error.
    pub fn notifier(msg: impl fmt::Display) -> Self {
        Error::Notifier(msg.to_string())
    }

    /// Create a new server error.
    pub fn server(msg: impl fmt::Display) -> Self {
        Error::Server(msg.to_string())
    }

    /// Create a new other error.
    pub fn other(msg: impl fmt::Display) -> Self {
        Error::Other(msg.to_string())
    }
}
