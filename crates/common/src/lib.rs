//! Common utilities and types shared across deadman receiver components.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
