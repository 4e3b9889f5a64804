//! Logging setup.
//!
//! The library only emits `tracing` events. Binaries and tests that want to
//! see them call [`init`] once at startup.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The fallback filter directive could not be parsed.
    #[error("Invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },
}

/// Install a formatting subscriber filtered by `RUST_LOG`.
///
/// Falls back to `default_filter` (e.g. `"geocache=debug"`) when `RUST_LOG`
/// is unset or invalid. Returns `Ok(false)` if a global subscriber was
/// already installed, so repeated calls are harmless.
///
/// # Errors
///
/// Returns [`LoggingError::InvalidFilter`] if `default_filter` is needed and
/// cannot be parsed.
pub fn init(default_filter: &str) -> Result<bool, LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter).map_err(|e| LoggingError::InvalidFilter {
            filter: default_filter.to_string(),
            message: e.to_string(),
        })?,
    };

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok())
}
