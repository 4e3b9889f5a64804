//! Point-in-time view of cache counters.

use std::fmt;

/// Copy of [`super::CacheMetrics`] at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Lookups served.
    pub lookups: u64,
    /// Wanted keys across all lookups.
    pub keys_requested: u64,
    /// Wanted keys found in the cache.
    pub keys_hit: u64,
    /// Cells fetched from the backend.
    pub cells_read: u64,
    /// Fetched cells that had no entry.
    pub cells_absent: u64,
    /// Cell payloads that failed to decode and were treated as empty.
    pub decode_failures: u64,
    /// Backend reads that failed and were treated as misses.
    pub backend_read_failures: u64,
    /// Stores that reached the backend.
    pub stores: u64,
    /// Cell payloads written.
    pub cells_written: u64,
    /// New pairs written.
    pub pairs_written: u64,
    /// Entries dropped by merges to respect cache limits.
    pub entries_evicted: u64,
    /// Backend writes that failed.
    pub backend_write_failures: u64,
}

impl MetricsSnapshot {
    /// Wanted keys not found in the cache.
    pub fn keys_missed(&self) -> u64 {
        self.keys_requested.saturating_sub(self.keys_hit)
    }

    /// Fraction of wanted keys served from the cache (0.0 when nothing was requested).
    pub fn hit_ratio(&self) -> f64 {
        if self.keys_requested == 0 {
            0.0
        } else {
            self.keys_hit as f64 / self.keys_requested as f64
        }
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lookups: {}, req: {}, hit: {}, miss: {}, ratio: {:.3}, cells: {} ({} absent), \
             stores: {}, written: {} pairs in {} cells, evicted: {}, errors: {} decode / {} read / {} write",
            self.lookups,
            self.keys_requested,
            self.keys_hit,
            self.keys_missed(),
            self.hit_ratio(),
            self.cells_read,
            self.cells_absent,
            self.stores,
            self.pairs_written,
            self.cells_written,
            self.entries_evicted,
            self.decode_failures,
            self.backend_read_failures,
            self.backend_write_failures,
        )
    }
}
