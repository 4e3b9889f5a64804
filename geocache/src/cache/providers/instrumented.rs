//! Round-trip counting decorator.
//!
//! Wraps any [`Backend`] and counts the calls that would be network round
//! trips against a remote store. A batched `mget`/`mset` counts once no
//! matter how many keys it carries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::cache::traits::{Backend, BackendError, BoxFuture};

/// Point-in-time copy of [`InstrumentedBackend`] counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundTrips {
    /// Single-key reads.
    pub gets: u64,
    /// Single-key writes.
    pub sets: u64,
    /// Batched reads.
    pub mgets: u64,
    /// Batched writes.
    pub msets: u64,
}

impl RoundTrips {
    /// Total calls of any kind.
    pub fn total(&self) -> u64 {
        self.gets + self.sets + self.mgets + self.msets
    }
}

/// Backend decorator that counts round trips.
pub struct InstrumentedBackend {
    inner: Arc<dyn Backend>,
    gets: AtomicU64,
    sets: AtomicU64,
    mgets: AtomicU64,
    msets: AtomicU64,
}

impl InstrumentedBackend {
    /// Wrap `inner`.
    pub fn new(inner: Arc<dyn Backend>) -> Self {
        Self {
            inner,
            gets: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            mgets: AtomicU64::new(0),
            msets: AtomicU64::new(0),
        }
    }

    /// Current counter values.
    pub fn round_trips(&self) -> RoundTrips {
        RoundTrips {
            gets: self.gets.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            mgets: self.mgets.load(Ordering::Relaxed),
            msets: self.msets.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.gets.store(0, Ordering::Relaxed);
        self.sets.store(0, Ordering::Relaxed);
        self.mgets.store(0, Ordering::Relaxed);
        self.msets.store(0, Ordering::Relaxed);
    }
}

impl Backend for InstrumentedBackend {
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), BackendError>> {
        self.sets.fetch_add(1, Ordering::Relaxed);
        self.inner.set(key, value)
    }

    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, BackendError>> {
        self.gets.fetch_add(1, Ordering::Relaxed);
        self.inner.get(key)
    }

    fn mget(&self, keys: &[String]) -> BoxFuture<'_, Result<Vec<Option<Vec<u8>>>, BackendError>> {
        self.mgets.fetch_add(1, Ordering::Relaxed);
        self.inner.mget(keys)
    }

    fn mset(&self, entries: Vec<(String, Vec<u8>)>) -> BoxFuture<'_, Result<(), BackendError>> {
        self.msets.fetch_add(1, Ordering::Relaxed);
        self.inner.mset(entries)
    }

    fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    fn size_bytes(&self) -> u64 {
        self.inner.size_bytes()
    }
}
