//! Fixed-cell strategy.
//!
//! Every query reads and writes exactly one cell: the cell containing the
//! query location. Records are filed under the query's cell regardless of
//! where they actually are.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::merge::{MergeOutcome, MergePolicy, TruncatingMerge};
use super::{decode_cell, read_cell, Lookup, ReadSnapshot, SpatialStrategy};
use crate::cache::{Backend, BoxFuture};
use crate::codec::Codec;
use crate::config::{ConfigError, FixedCellConfig};
use crate::coord::Location;
use crate::error::CacheError;
use crate::index::SpatialIndexer;
use crate::keys::{CacheKeyBuilder, CacheName};
use crate::telemetry::CacheMetrics;

/// Caches records in the single cell containing the query location.
///
/// Reads are one `get`, writes are one `set`. The cell payload is bounded by
/// `cache_limit` through [`TruncatingMerge`].
///
/// A lookup returns one pair per wanted key: the most recently written copy,
/// even when older copies of that key are still in the payload.
pub struct FixedCellStrategy<R, I: SpatialIndexer> {
    config: FixedCellConfig,
    indexer: I,
    keys: CacheKeyBuilder,
    backend: Arc<dyn Backend>,
    codec: Arc<dyn Codec<R>>,
    metrics: Arc<CacheMetrics>,
}

impl<R, I: SpatialIndexer> FixedCellStrategy<R, I> {
    /// Create a strategy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid for `indexer`.
    pub fn new(
        config: FixedCellConfig,
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
    pub fn config(&self) -> &FixedCellConfig {
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
}

impl<R, I: SpatialIndexer> fmt::Display for FixedCellStrategy<R, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FixedCellStrategy({}, res={}, limit={})",
            self.keys.tag(),
            self.config.resolution,
            self.config.cache_limit
        )
    }
}

impl<R, I> SpatialStrategy<R> for FixedCellStrategy<R, I>
where
    R: Send + Sync + 'static,
    I: SpatialIndexer,
{
    fn lookup<'a>(
        &'a self,
        location: Location,
        wanted: &'a HashSet<String>,
    ) -> BoxFuture<'a, Lookup<R>> {
        Box::pin(async move {
            let name = self.cell_name(&location);
            let snapshot = read_cell(&*self.backend, &self.metrics, name.clone()).await;
            let payload = decode_cell(
                &*self.codec,
                &self.metrics,
                &name,
                snapshot.get(&name).flatten(),
            );

            // Most recent copy of a key sits first in the payload.
            let mut seen = HashSet::new();
            let hits: Vec<(String, R)> = payload
                .into_iter()
                .filter(|(key, _)| wanted.contains(key) && seen.insert(key.clone()))
                .collect();

            self.metrics.lookup(wanted.len(), hits.len());
            debug!(
                cell = %name,
                wanted = wanted.len(),
                hits = hits.len(),
                "Fixed-cell lookup"
            );

            Lookup::new(hits, snapshot)
        })
    }

    fn store<'a>(
        &'a self,
        location: Location,
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

            let name = self.cell_name(&location);
            let snapshot = if snapshot.contains(&name) {
                snapshot
            } else {
                read_cell(&*self.backend, &self.metrics, name.clone()).await
            };
            let previous = decode_cell(
                &*self.codec,
                &self.metrics,
                &name,
                snapshot.get(&name).flatten(),
            );

            let pairs = new_pairs.len();
            let MergeOutcome { payload, dropped } =
                TruncatingMerge.merge(previous, new_pairs, self.config.cache_limit);
            let payload_len = payload.len();
            let bytes = self.codec.encode(&payload)?;

            if let Err(e) = self.backend.set(name.as_str(), bytes).await {
                self.metrics.backend_write_failure();
                warn!(cell = %name, pairs, error = %e, "Backend write failed");
                return Err(e.into());
            }

            self.metrics.store(1, pairs, dropped);
            debug!(
                cell = %name,
                pairs,
                payload = payload_len,
                dropped,
                "Stored fixed cell"
            );
            Ok(())
        })
    }
}
