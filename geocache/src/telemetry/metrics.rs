//! Atomic cache counters.

use std::sync::atomic::{AtomicU64, Ordering};

use super::MetricsSnapshot;

/// Counters shared by one or more strategies.
///
/// All updates use relaxed ordering: counters are independent and only read
/// through [`CacheMetrics::snapshot`].
#[derive(Debug, Default)]
pub struct CacheMetrics {
    lookups: AtomicU64,
    keys_requested: AtomicU64,
    keys_hit: AtomicU64,
    cells_read: AtomicU64,
    cells_absent: AtomicU64,
    decode_failures: AtomicU64,
    backend_read_failures: AtomicU64,
    stores: AtomicU64,
    cells_written: AtomicU64,
    pairs_written: AtomicU64,
    entries_evicted: AtomicU64,
    backend_write_failures: AtomicU64,
}

impl CacheMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one lookup over `requested` wanted keys that produced `hits`.
    pub fn lookup(&self, requested: usize, hits: usize) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.keys_requested
            .fetch_add(requested as u64, Ordering::Relaxed);
        self.keys_hit.fetch_add(hits as u64, Ordering::Relaxed);
    }

    /// Record `read` cells fetched, of which `absent` had no entry.
    pub fn cells_read(&self, read: usize, absent: usize) {
        self.cells_read.fetch_add(read as u64, Ordering::Relaxed);
        self.cells_absent.fetch_add(absent as u64, Ordering::Relaxed);
    }

    /// Record a cell payload that failed to decode.
    pub fn decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed backend read.
    pub fn backend_read_failure(&self) {
        self.backend_read_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful store.
    pub fn store(&self, cells: usize, pairs: usize, evicted: usize) {
        self.stores.fetch_add(1, Ordering::Relaxed);
        self.cells_written.fetch_add(cells as u64, Ordering::Relaxed);
        self.pairs_written.fetch_add(pairs as u64, Ordering::Relaxed);
        self.entries_evicted
            .fetch_add(evicted as u64, Ordering::Relaxed);
    }

    /// Record a failed backend write.
    pub fn backend_write_failure(&self) {
        self.backend_write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lookups: self.lookups.load(Ordering::Relaxed),
            keys_requested: self.keys_requested.load(Ordering::Relaxed),
            keys_hit: self.keys_hit.load(Ordering::Relaxed),
            cells_read: self.cells_read.load(Ordering::Relaxed),
            cells_absent: self.cells_absent.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            backend_read_failures: self.backend_read_failures.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            cells_written: self.cells_written.load(Ordering::Relaxed),
            pairs_written: self.pairs_written.load(Ordering::Relaxed),
            entries_evicted: self.entries_evicted.load(Ordering::Relaxed),
            backend_write_failures: self.backend_write_failures.load(Ordering::Relaxed),
        }
    }
}
