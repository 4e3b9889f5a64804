//! Read-through queries.
//!
//! [`read_through`] runs one query end to end: look up the wanted keys, fetch
//! the misses from a [`RecordSource`], store what was fetched, and return
//! everything.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::BoxFuture;
use crate::coord::Location;
use crate::error::CacheError;
use crate::strategy::SpatialStrategy;

/// Errors raised by a [`RecordSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source could not be reached.
    #[error("Record source unavailable: {0}")]
    Unavailable(String),

    /// The source does not know some of the requested keys.
    #[error("Unknown keys: {0:?}")]
    UnknownKeys(Vec<String>),
}

/// Errors returned by [`read_through`].
#[derive(Debug, Error)]
pub enum QueryError {
    /// Fetching the misses failed.
    #[error("Failed to fetch missing records: {0}")]
    Source(#[from] SourceError),

    /// Writing the fetched records back failed.
    #[error("Failed to store fetched records: {0}")]
    Store(#[from] CacheError),
}

/// The authoritative store the cache sits in front of.
pub trait RecordSource<R>: Send + Sync {
    /// Fetch records for `keys`.
    ///
    /// Every returned pair should be keyed by one of `keys`.
    fn fetch<'a>(
        &'a self,
        keys: &'a HashSet<String>,
    ) -> BoxFuture<'a, Result<Vec<(String, R)>, SourceError>>;
}

/// Result of a read-through query.
#[derive(Debug, Clone)]
pub struct QueryOutcome<R> {
    /// Cached hits followed by fetched records, one pair per key.
    pub records: Vec<(String, R)>,
    /// Number of wanted keys.
    pub requested: usize,
    /// Wanted keys served from the cache.
    pub hits: usize,
    /// Wanted keys fetched from the source.
    pub misses: usize,
}

impl<R> QueryOutcome<R> {
    /// Fraction of wanted keys served from the cache (0.0 when nothing was requested).
    pub fn hit_ratio(&self) -> f64 {
        if self.requested == 0 {
            0.0
        } else {
            self.hits as f64 / self.requested as f64
        }
    }
}

/// Serve `wanted` at `location`, filling the cache from `source` on a miss.
///
/// The cache may hold a key in more than one cell; the outcome keeps only the
/// first occurrence so each wanted key appears once.
///
/// # Errors
///
/// Returns [`QueryError::Source`] if the misses cannot be fetched and
/// [`QueryError::Store`] if they cannot be written back. Cache read failures
/// are not errors; they only turn hits into misses.
pub async fn read_through<R, S, Src>(
    strategy: &S,
    source: &Src,
    location: Location,
    wanted: &HashSet<String>,
) -> Result<QueryOutcome<R>, QueryError>
where
    R: Clone + Send + 'static,
    S: SpatialStrategy<R> + ?Sized,
    Src: RecordSource<R> + ?Sized,
{
    let lookup = strategy.lookup(location, wanted).await;
    let misses = lookup.misses(wanted);
    let (cached, snapshot) = lookup.into_parts();

    let mut seen = HashSet::with_capacity(wanted.len());
    let mut records: Vec<(String, R)> = cached
        .into_iter()
        .filter(|(key, _)| seen.insert(key.clone()))
        .collect();
    let hits = records.len();

    if !misses.is_empty() {
        let fetched = source.fetch(&misses).await?;
        if fetched.len() < misses.len() {
            warn!(
                requested = misses.len(),
                returned = fetched.len(),
                "Record source returned fewer records than requested"
            );
        }

        if let Err(e) = strategy.store(location, snapshot, fetched.clone()).await {
            warn!(error = %e, pairs = fetched.len(), "Failed to store fetched records");
            return Err(e.into());
        }
        records.extend(fetched);
    }

    debug!(
        location = %location,
        requested = wanted.len(),
        hits,
        misses = misses.len(),
        "Read-through query"
    );

    Ok(QueryOutcome {
        records,
        requested: wanted.len(),
        hits,
        misses: misses.len(),
    })
}
