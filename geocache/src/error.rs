//! Write-path error type.
//!
//! Reads never fail: an unreachable or corrupt cell is served as a miss.
//! Writes surface every failure so callers can decide whether to retry.

use thiserror::Error;

use crate::cache::BackendError;
use crate::codec::CodecError;

/// Errors returned by `store`.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend rejected or failed the write.
    #[error("Backend write failed: {0}")]
    Backend(#[from] BackendError),

    /// A merged cell payload could not be encoded.
    #[error("Failed to encode cell payload: {0}")]
    Codec(#[from] CodecError),
}
