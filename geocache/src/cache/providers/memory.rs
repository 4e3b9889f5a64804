//! In-memory backend using moka.
//!
//! This provider wraps `moka::future::Cache` to provide an async-safe,
//! lock-free in-memory key-value store with size-bounded eviction and an
//! optional time-to-live.
//!
//! # Why moka?
//!
//! - Lock-free reads (common case)
//! - Concurrent writes without blocking
//! - Automatic eviction without explicit locking
//! - Memory-bounded with configurable limits
//! - Designed for async contexts

use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::cache::traits::{Backend, BackendError, BoxFuture};

/// In-memory backend using moka.
///
/// Stands in for a networked byte store: values are opaque, writes replace,
/// and entries may disappear through eviction or TTL expiry.
pub struct MemoryBackend {
    /// The underlying moka cache.
    cache: MokaCache<String, Vec<u8>>,

    /// Maximum size in bytes.
    max_size_bytes: u64,
}

impl MemoryBackend {
    /// Create a new memory backend.
    ///
    /// # Arguments
    ///
    /// * `max_size_bytes` - Maximum total value size in bytes
    /// * `ttl` - Optional time-to-live for entries
    pub fn new(max_size_bytes: u64, ttl: Option<Duration>) -> Self {
        let mut builder = MokaCache::builder()
            // Weight each entry by its data size
            .weigher(|_key: &String, value: &Vec<u8>| -> u32 {
                // moka uses u32 for weights, cap at u32::MAX for very large entries
                value.len().min(u32::MAX as usize) as u32
            })
            .max_capacity(max_size_bytes);

        if let Some(ttl_duration) = ttl {
            builder = builder.time_to_live(ttl_duration);
        }

        Self {
            cache: builder.build(),
            max_size_bytes,
        }
    }

    /// Get the maximum configured size in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Run pending eviction and expiry work so size statistics are current.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Backend for MemoryBackend {
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), BackendError>> {
        let key = key.to_string();
        Box::pin(async move {
            if value.len() as u64 > self.max_size_bytes {
                return Err(BackendError::ValueTooLarge {
                    size: value.len(),
                    max: self.max_size_bytes as usize,
                });
            }
            self.cache.insert(key, value).await;
            Ok(())
        })
    }

    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, BackendError>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.cache.get(&key).await) })
    }

    fn mget(&self, keys: &[String]) -> BoxFuture<'_, Result<Vec<Option<Vec<u8>>>, BackendError>> {
        let keys = keys.to_vec();
        Box::pin(async move {
            let mut values = Vec::with_capacity(keys.len());
            for key in &keys {
                values.push(self.cache.get(key).await);
            }
            Ok(values)
        })
    }

    fn mset(&self, entries: Vec<(String, Vec<u8>)>) -> BoxFuture<'_, Result<(), BackendError>> {
        Box::pin(async move {
            // Reject the whole batch up front rather than writing a prefix.
            if let Some((_, value)) = entries
                .iter()
                .find(|(_, value)| value.len() as u64 > self.max_size_bytes)
            {
                return Err(BackendError::ValueTooLarge {
                    size: value.len(),
                    max: self.max_size_bytes as usize,
                });
            }
            for (key, value) in entries {
                self.cache.insert(key, value).await;
            }
            Ok(())
        })
    }

    fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    fn size_bytes(&self) -> u64 {
        self.cache.weighted_size()
    }
}
