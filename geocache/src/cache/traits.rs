//! Core traits for the key-value backend.
//!
//! The `Backend` trait provides a domain-agnostic key-value interface over
//! opaque bytes. Cell payloads are encoded by a codec before they reach the
//! backend, so providers never see records.
//!
//! # Design Principles
//!
//! - **String keys**: Human-readable cell names, easy to inspect in a shell
//! - **Vec<u8> values**: Raw bytes, no serialization opinions imposed
//! - **Batched calls**: `mget`/`mset` let one query touch many cells in one round trip
//! - **No transactions**: Nothing is atomic across keys
//! - **Dyn-compatible**: Uses `Pin<Box<dyn Future>>` for trait object support
//!
//! # Example
//!
//! ```ignore
//! use geocache::cache::{Backend, MemoryBackend};
//!
//! let backend = MemoryBackend::new(512 * 1024 * 1024, None);
//! backend.set("ring:6:6/25/54", vec![1, 2, 3]).await?;
//! let values = backend.mget(&["ring:6:6/25/54".to_string()]).await?;
//! ```

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Errors that can occur during backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend could not be reached.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend is shutting down.
    #[error("Backend is shutting down")]
    ShuttingDown,

    /// Value exceeds maximum allowed size.
    #[error("Value too large: {size} bytes (max: {max})")]
    ValueTooLarge { size: usize, max: usize },

    /// Provider-specific error.
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Generic key-value backend over opaque bytes.
///
/// # Absence
///
/// A missing key is `None`, which is distinct from a present empty value
/// `Some(vec![])`. `mget` preserves this per key.
///
/// # Batching
///
/// `mget` and `mset` default to issuing one `get`/`set` per key. Providers
/// that can batch natively (a networked store with multi-key commands)
/// override them so a batch costs one round trip.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use across async tasks.
pub trait Backend: Send + Sync {
    /// Store a value with the given key, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the backend rejects or cannot perform the write.
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), BackendError>>;

    /// Retrieve a value by key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(data))` if the key exists
    /// - `Ok(None)` if the key is not found
    /// - `Err(_)` if an error occurs
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, BackendError>>;

    /// Retrieve several values at once.
    ///
    /// The result has one slot per requested key, in request order.
    fn mget(&self, keys: &[String]) -> BoxFuture<'_, Result<Vec<Option<Vec<u8>>>, BackendError>> {
        let keys = keys.to_vec();
        Box::pin(async move {
            let mut values = Vec::with_capacity(keys.len());
            for key in &keys {
                values.push(self.get(key).await?);
            }
            Ok(values)
        })
    }

    /// Store several values at once.
    ///
    /// There is no atomicity: on error, a prefix of the entries may have
    /// been written.
    fn mset(&self, entries: Vec<(String, Vec<u8>)>) -> BoxFuture<'_, Result<(), BackendError>> {
        Box::pin(async move {
            for (key, value) in entries {
                self.set(&key, value).await?;
            }
            Ok(())
        })
    }

    /// Get the current number of entries in the backend.
    fn entry_count(&self) -> u64;

    /// Get the current size of the stored values in bytes.
    fn size_bytes(&self) -> u64;
}
