//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised when validating or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Resolution of zero or above what the indexer supports.
    #[error("Invalid resolution {resolution} (must be 1..={max})")]
    InvalidResolution { resolution: u8, max: u8 },

    /// Cell capacity of zero.
    #[error("Cache limit must be greater than zero")]
    InvalidCacheLimit,

    /// Ring radius above [`crate::config::MAX_RING_K`].
    #[error("Invalid ring radius {k} (must be at most {max})")]
    InvalidRingRadius { k: u32, max: u32 },

    /// Cache variant tag that would break backend naming.
    #[error("Invalid cache tag {0:?} (must be non-empty and contain no ':')")]
    InvalidTag(String),

    /// A settings file value that does not parse.
    #[error("Invalid value {value:?} for [{section}] {key}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },

    /// The settings file could not be read or parsed as INI.
    #[error("Failed to load settings from {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// Settings text could not be parsed as INI.
    #[error("Failed to parse settings: {0}")]
    Parse(String),
}
