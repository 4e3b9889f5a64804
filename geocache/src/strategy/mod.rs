//! Spatial caching strategies.
//!
//! A strategy decides which backend cells a query reads and where newly
//! fetched records are written. Each query runs as a pair of calls:
//!
//! ```text
//! lookup(location, wanted) ──► Lookup { hits, snapshot }
//!                                          │
//!            fetch misses elsewhere        │
//!                    │                     ▼
//!                    └──────► store(location, snapshot, new_pairs)
//! ```
//!
//! The [`ReadSnapshot`] carries the raw bytes the read observed so the write
//! can merge against them without reading the same cells again. It is a
//! per-query value; strategies hold no per-query state and can be shared
//! across tasks behind an `Arc`.
//!
//! # Available Strategies
//!
//! - [`FixedCellStrategy`]: one cell per query, truncating merge
//! - [`RingExpansionStrategy`]: the k-ring around the query, records filed
//!   under their own cell, collision-aware merge
//!
//! # Failure Model
//!
//! Reads are fail-soft: an unreachable backend or an undecodable cell is
//! logged and served as a miss. Writes are fail-hard and return
//! [`CacheError`].

mod fixed;
pub mod merge;
mod ring;

pub use fixed::FixedCellStrategy;
pub use merge::{CollisionAwareMerge, MergeOutcome, MergePolicy, TruncatingMerge};
pub use ring::RingExpansionStrategy;

use std::collections::HashSet;

use tracing::warn;

use crate::cache::{Backend, BoxFuture};
use crate::codec::Codec;
use crate::coord::Location;
use crate::error::CacheError;
use crate::keys::CacheName;
use crate::telemetry::CacheMetrics;

/// Raw results of one read, keyed by cache name.
///
/// A name is present only if the backend answered for it. `None` bytes mean
/// the backend reported no entry. A name missing from the snapshot was never
/// observed (outside the read set, or the read failed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadSnapshot {
    entries: Vec<(CacheName, Option<Vec<u8>>)>,
}

impl ReadSnapshot {
    /// A snapshot that observed nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of observed cells.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no cell was observed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Observed cell names, in read order.
    pub fn names(&self) -> impl Iterator<Item = &CacheName> {
        self.entries.iter().map(|(name, _)| name)
    }

    /// What the read saw for `name`.
    ///
    /// Returns `None` if the cell was not observed, `Some(None)` if it was
    /// observed absent, and `Some(Some(bytes))` otherwise.
    pub fn get(&self, name: &CacheName) -> Option<Option<&[u8]>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, raw)| raw.as_deref())
    }

    /// Whether `name` was observed.
    pub fn contains(&self, name: &CacheName) -> bool {
        self.get(name).is_some()
    }

    pub(crate) fn observe(&mut self, name: CacheName, raw: Option<Vec<u8>>) {
        self.entries.push((name, raw));
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&CacheName, Option<&[u8]>)> {
        self.entries
            .iter()
            .map(|(name, raw)| (name, raw.as_deref()))
    }
}

/// Result of a lookup: the hits plus the raw read for the paired store.
#[derive(Debug, Clone)]
pub struct Lookup<R> {
    hits: Vec<(String, R)>,
    snapshot: ReadSnapshot,
}

impl<R> Lookup<R> {
    pub(crate) fn new(hits: Vec<(String, R)>, snapshot: ReadSnapshot) -> Self {
        Self { hits, snapshot }
    }

    /// Wanted pairs found in the cache.
    pub fn hits(&self) -> &[(String, R)] {
        &self.hits
    }

    /// The raw read, to pass to `store`.
    pub fn snapshot(&self) -> &ReadSnapshot {
        &self.snapshot
    }

    /// Keys of `wanted` that were not hit.
    pub fn misses(&self, wanted: &HashSet<String>) -> HashSet<String> {
        let hit: HashSet<&str> = self.hits.iter().map(|(k, _)| k.as_str()).collect();
        wanted
            .iter()
            .filter(|key| !hit.contains(key.as_str()))
            .cloned()
            .collect()
    }

    /// Split into hits and snapshot.
    pub fn into_parts(self) -> (Vec<(String, R)>, ReadSnapshot) {
        (self.hits, self.snapshot)
    }
}

/// A spatial partitioning strategy over a key-value backend.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; concurrent queries share one
/// instance. Concurrent stores to the same cell race and the last write wins.
pub trait SpatialStrategy<R: Send + 'static>: Send + Sync {
    /// Find the `wanted` keys cached near `location`.
    ///
    /// Never fails: backend and decode errors are logged and become misses.
    fn lookup<'a>(
        &'a self,
        location: Location,
        wanted: &'a HashSet<String>,
    ) -> BoxFuture<'a, Lookup<R>>;

    /// Write `new_pairs` fetched for a query at `location`.
    ///
    /// `snapshot` must come from the `lookup` of the same query. An empty
    /// `new_pairs` is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if a payload cannot be encoded or the backend
    /// write fails.
    fn store<'a>(
        &'a self,
        location: Location,
        snapshot: ReadSnapshot,
        new_pairs: Vec<(String, R)>,
    ) -> BoxFuture<'a, Result<(), CacheError>>;
}

/// Decode one cell's raw bytes.
///
/// Absent and empty entries decode to an empty payload without touching the
/// codec. A decode failure is logged, counted, and also yields an empty
/// payload so that one corrupt cell never hides the others.
pub(crate) fn decode_cell<R>(
    codec: &dyn Codec<R>,
    metrics: &CacheMetrics,
    name: &CacheName,
    raw: Option<&[u8]>,
) -> Vec<(String, R)> {
    let bytes = match raw {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Vec::new(),
    };

    match codec.decode(bytes) {
        Ok(pairs) => pairs,
        Err(e) => {
            metrics.decode_failure();
            warn!(
                cell = %name,
                bytes = bytes.len(),
                error = %e,
                "Failed to decode cell payload, treating as empty"
            );
            Vec::new()
        }
    }
}

/// Batch-read `names` into a snapshot.
///
/// A failed read, or a reply with the wrong number of slots, is logged and
/// yields an empty snapshot.
pub(crate) async fn read_cells(
    backend: &dyn Backend,
    metrics: &CacheMetrics,
    names: Vec<CacheName>,
) -> ReadSnapshot {
    let mut snapshot = ReadSnapshot::empty();
    if names.is_empty() {
        return snapshot;
    }

    let keys: Vec<String> = names.iter().map(|n| n.as_str().to_string()).collect();
    let values = match backend.mget(&keys).await {
        Ok(values) if values.len() == names.len() => values,
        Ok(values) => {
            metrics.backend_read_failure();
            warn!(
                requested = names.len(),
                returned = values.len(),
                "Backend returned wrong number of values, treating cells as misses"
            );
            return snapshot;
        }
        Err(e) => {
            metrics.backend_read_failure();
            warn!(
                cells = names.len(),
                error = %e,
                "Backend read failed, treating cells as misses"
            );
            return snapshot;
        }
    };

    let absent = values.iter().filter(|v| v.is_none()).count();
    metrics.cells_read(names.len(), absent);

    for (name, raw) in names.into_iter().zip(values) {
        snapshot.observe(name, raw);
    }
    snapshot
}

/// Read a single cell into a snapshot. Failures yield an empty snapshot.
pub(crate) async fn read_cell(
    backend: &dyn Backend,
    metrics: &CacheMetrics,
    name: CacheName,
) -> ReadSnapshot {
    let mut snapshot = ReadSnapshot::empty();

    match backend.get(name.as_str()).await {
        Ok(raw) => {
            metrics.cells_read(1, usize::from(raw.is_none()));
            snapshot.observe(name, raw);
        }
        Err(e) => {
            metrics.backend_read_failure();
            warn!(cell = %name, error = %e, "Backend read failed, treating cell as a miss");
        }
    }
    snapshot
}
