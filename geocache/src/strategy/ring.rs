//! Ring-expansion strategy.
//!
//! Points near a cell edge have their true neighbours in the adjacent cells,
//! so a query reads every cell within `k` steps of its own cell in one batched
//! call. Writes file each record under its *home cell*, the cell containing
//! the record's own location, so a record is found by any later query whose
//! ring covers that cell.
//!
//! With `k = 0` the read touches a single cell like [`super::FixedCellStrategy`],
//! but writes still go to home cells.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::merge::{CollisionAwareMerge, MergeOutcome, MergePolicy};
use super::{decode_cell, read_cells, Lookup, ReadSnapshot, SpatialStrategy};
use crate::cache::{Backend, BoxFuture};
use crate::codec::Codec;
use crate::config::{ConfigError, RingConfig};
use crate::coord::Location;
use crate::error::CacheError;
use crate::index::SpatialIndexer;
use crate::keys::{CacheKeyBuilder, CacheName};
use crate::record::Record;
use crate::telemetry::CacheMetrics;

/// Caches records in their home cells and reads the k-ring around a query.
///
/// Reads are one `mget`, writes are one `mset` (plus one `mget` when a record
/// lands in a cell the read did not cover). Payloads are merged with
/// [`CollisionAwareMerge`] and can exceed `cache_limit` after a single large
/// write.
pub struct RingExpansionStrategy<R, I: SpatialIndexer> {
    config: RingConfig,
    indexer: I,
    keys: CacheKeyBuilder,
    backend: Arc<dyn Backend>,
    codec: Arc<dyn Codec<R>>,
    metrics: Arc<CacheMetrics>,
}

impl<R, I: SpatialIndexer> RingExpansionStrategy<R, I> {
    /// Create a strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid for `indexer`.
    pub fn new(
        config: RingConfig,
        indexer: I,
        backend: Arc<dyn Backend>,
        codec: Arc<dyn Codec<R>>,
    ) -> Result<Self, ConfigError> {
        config.validate(indexer.max_resolution())?;
        let keys = CacheKeyBuilder::new(config.tag.clone())?;

        Ok(Self {
            config,
            indexer,
            keys,
            backend,
            codec,
            metrics: Arc::new(CacheMetrics::new()),
        })
    }

    /// Report into shared counters instead of private ones.
    pub fn with_metrics(mut self, metrics: Arc<CacheMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// The strategy configuration.
    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    /// Counters this strategy reports into.
    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }

    /// Backend entry name for the cell containing `location`.
    pub fn cell_name(&self, location: &Location) -> CacheName {
        let cell = self.indexer.cell_of(location, self.config.resolution);
        self.keys.name(self.config.resolution, &cell)
    }

    /// Backend entry names of the k-ring around `location`, center first.
    pub fn ring_names(&self, location: &Location) -> Vec<CacheName> {
        let center = self.indexer.cell_of(location, self.config.resolution);
        self.indexer
            .ring(&center, self.config.k)
            .iter()
            .map(|cell| self.keys.name(self.config.resolution, cell))
            .collect()
    }
}

impl<R, I: SpatialIndexer> fmt::Display for RingExpansionStrategy<R, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RingExpansionStrategy({}, res={}, limit={}, k={})",
            self.keys.tag(),
            self.config.resolution,
            self.config.cache_limit,
            self.config.k
        )
    }
}

impl<R, I> SpatialStrategy<R> for RingExpansionStrategy<R, I>
where
    R: Record,
    I: SpatialIndexer,
{
    fn lookup<'a>(
        &'a self,
        location: Location,
        wanted: &'a HashSet<String>,
    ) -> BoxFuture<'a, Lookup<R>> {
        Box::pin(async move {
            let names = self.ring_names(&location);
            let cells = names.len();
            let snapshot = read_cells(&*self.backend, &self.metrics, names).await;

            // A key can sit in several ring cells; every occurrence is returned.
            let mut hits = Vec::new();
            for (name, raw) in snapshot.iter() {
                let payload = decode_cell(&*self.codec, &self.metrics, name, raw);
                hits.extend(payload.into_iter().filter(|(key, _)| wanted.contains(key)));
            }

            let distinct_hits = hits
                .iter()
                .map(|(key, _)| key.as_str())
                .collect::<HashSet<_>>()
                .len();
            self.metrics.lookup(wanted.len(), distinct_hits);
            debug!(
                cells,
                observed = snapshot.len(),
                wanted = wanted.len(),
                hits = distinct_hits,
                "Ring lookup"
            );

            Lookup::new(hits, snapshot)
        })
    }

    fn store<'a>(
        &'a self,
        _location: Location,
        snapshot: ReadSnapshot,
        new_pairs: Vec<(String, R)>,
    ) -> BoxFuture<'a, Result<(), CacheError>> {
        Box::pin(async move {
            if new_pairs.is_empty() {
                return Ok(());
            }
            if self.config.read_only {
                debug!(pairs = new_pairs.len(), "Read-only cache, skipping store");
                return Ok(());
            }

            let pairs = new_pairs.len();
            let groups = self.group_by_home_cell(new_pairs);

            let unobserved: Vec<CacheName> = groups
                .iter()
                .map(|(name, _)| name)
                .filter(|name| !snapshot.contains(name))
                .cloned()
                .collect();
            let extra = if unobserved.is_empty() {
                ReadSnapshot::empty()
            } else {
                debug!(
                    cells = unobserved.len(),
                    "Reading home cells outside the query ring"
                );
                read_cells(&*self.backend, &self.metrics, unobserved).await
            };

            let cells = groups.len();
            let mut entries = Vec::with_capacity(cells);
            let mut dropped_total = 0;
            for (name, incoming) in groups {
                let raw = snapshot.get(&name).or_else(|| extra.get(&name)).flatten();
                let previous = decode_cell(&*self.codec, &self.metrics, &name, raw);

                let MergeOutcome { payload, dropped } =
                    CollisionAwareMerge.merge(previous, incoming, self.config.cache_limit);
                dropped_total += dropped;

                let bytes = self.codec.encode(&payload)?;
                entries.push((name.into_string(), bytes));
            }

            if let Err(e) = self.backend.mset(entries).await {
                self.metrics.backend_write_failure();
                warn!(cells, pairs, error = %e, "Backend write failed");
                return Err(e.into());
            }

            self.metrics.store(cells, pairs, dropped_total);
            debug!(cells, pairs, dropped = dropped_total, "Stored ring cells");
            Ok(())
        })
    }
}

impl<R: Record, I: SpatialIndexer> RingExpansionStrategy<R, I> {
    /// Group pairs under the cell containing each record, in first-seen order.
    fn group_by_home_cell(&self, pairs: Vec<(String, R)>) -> Vec<(CacheName, Vec<(String, R)>)> {
        let mut groups: Vec<(CacheName, Vec<(String, R)>)> = Vec::new();
        let mut index: HashMap<CacheName, usize> = HashMap::new();

        for (key, record) in pairs {
            let name = self.cell_name(&record.location());
            let slot = *index.entry(name.clone()).or_insert_with(|| {
                groups.push((name, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push((key, record));
        }

        groups
    }
}
