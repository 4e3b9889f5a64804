//! Integration tests for the spatial cache.
//!
//! These tests drive both strategies through the public API against the
//! in-memory backend, covering:
//! - Store/lookup round trips and eviction behaviour
//! - Home-cell placement of records in the ring strategy
//! - Fail-soft reads and fail-hard writes under injected faults
//! - Read-through queries, including concurrent ones
//!
//! Run with: `cargo test --test spatial_cache_integration`

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use geocache::cache::{Backend, BackendError, BoxFuture, InstrumentedBackend, MemoryBackend};
use geocache::coord::{tile_to_lat_lon_center, TileCoord};
use geocache::{
    read_through, BincodeCodec, CacheError, CacheMetrics, CacheSettings, FixedCellConfig,
    FixedCellStrategy, Location, ReadSnapshot, Record, RecordSource, RingConfig,
    RingExpansionStrategy, SourceError, SpatialStrategy, TileGridIndexer, ZlibBincodeCodec,
};

// ============================================================================
// Helper Types
// ============================================================================

/// Point of interest used as the cached record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Poi {
    id: String,
    location: Location,
}

impl Record for Poi {
    fn location(&self) -> Location {
        self.location
    }
}

/// Faults the flaky backend should inject.
#[derive(Debug, Default)]
struct Faults {
    fail_reads: bool,
    fail_writes: bool,
}

/// Memory backend with switchable read/write failures.
struct FlakyBackend {
    inner: MemoryBackend,
    faults: Mutex<Faults>,
}

impl FlakyBackend {
    fn new() -> Self {
        Self {
            inner: MemoryBackend::new(64 * 1024 * 1024, None),
            faults: Mutex::new(Faults::default()),
        }
    }

    fn set_faults(&self, fail_reads: bool, fail_writes: bool) {
        let mut faults = self.faults.lock();
        faults.fail_reads = fail_reads;
        faults.fail_writes = fail_writes;
    }
}

impl Backend for FlakyBackend {
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), BackendError>> {
        let fail = self.faults.lock().fail_writes;
        let key = key.to_string();
        Box::pin(async move {
            if fail {
                return Err(BackendError::Unavailable("connection reset".into()));
            }
            self.inner.set(&key, value).await
        })
    }

    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, BackendError>> {
        let fail = self.faults.lock().fail_reads;
        let key = key.to_string();
        Box::pin(async move {
            if fail {
                return Err(BackendError::Unavailable("connection reset".into()));
            }
            self.inner.get(&key).await
        })
    }

    fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    fn size_bytes(&self) -> u64 {
        self.inner.size_bytes()
    }
}

/// Source that fabricates a record for every requested key at one location.
struct FixedLocationSource {
    location: Location,
}

impl RecordSource<Poi> for FixedLocationSource {
    fn fetch<'a>(
        &'a self,
        keys: &'a HashSet<String>,
    ) -> BoxFuture<'a, Result<Vec<(String, Poi)>, SourceError>> {
        Box::pin(async move {
            let records: Vec<(String, Poi)> = keys.iter().map(|k| poi(k, self.location)).collect();
            Ok(records)
        })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Zoom 16 tile over lower Manhattan.
const ZOOM: u8 = 16;
const ROW: u32 = 24640;
const COL: u32 = 19295;

fn tile_center(row: u32, col: u32) -> Location {
    let (lat, lng) = tile_to_lat_lon_center(&TileCoord {
        row,
        col,
        zoom: ZOOM,
    });
    Location::new(lat, lng).unwrap()
}

fn near(dr: i32, dc: i32) -> Location {
    tile_center((ROW as i32 + dr) as u32, (COL as i32 + dc) as u32)
}

fn poi(id: &str, location: Location) -> (String, Poi) {
    (
        id.to_string(),
        Poi {
            id: id.to_string(),
            location,
        },
    )
}

fn keys(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

fn memory() -> Arc<dyn Backend> {
    Arc::new(MemoryBackend::new(64 * 1024 * 1024, None))
}

fn ring(
    backend: Arc<dyn Backend>,
    limit: usize,
    k: u32,
) -> RingExpansionStrategy<Poi, TileGridIndexer> {
    RingExpansionStrategy::new(
        RingConfig::new(ZOOM, limit, k),
        TileGridIndexer::new(),
        backend,
        Arc::new(ZlibBincodeCodec::new()),
    )
    .unwrap()
}

fn fixed(backend: Arc<dyn Backend>, limit: usize) -> FixedCellStrategy<Poi, TileGridIndexer> {
    FixedCellStrategy::new(
        FixedCellConfig::new(ZOOM, limit),
        TileGridIndexer::new(),
        backend,
        Arc::new(BincodeCodec::new()),
    )
    .unwrap()
}

/// Run one lookup + store cycle for `pairs` as a query at `location`.
async fn cache_pairs<S>(strategy: &S, location: Location, pairs: Vec<(String, Poi)>)
where
    S: SpatialStrategy<Poi>,
{
    let wanted: HashSet<String> = pairs.iter().map(|(k, _)| k.clone()).collect();
    let lookup = strategy.lookup(location, &wanted).await;
    let (_, snapshot) = lookup.into_parts();
    strategy.store(location, snapshot, pairs).await.unwrap();
}

/// Sorted distinct keys found by a lookup.
async fn found<S>(strategy: &S, location: Location, ids: &[&str]) -> Vec<String>
where
    S: SpatialStrategy<Poi>,
{
    let wanted = keys(ids);
    let lookup = strategy.lookup(location, &wanted).await;
    let mut hits: Vec<String> = lookup
        .hits()
        .iter()
        .map(|(k, _)| k.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    hits.sort();
    hits
}

// ============================================================================
// Eviction Behaviour
// ============================================================================

/// Ring cache with limit 2: a three-key batch into the same home cell evicts
/// the earlier entry, and the batch itself is kept whole.
#[tokio::test]
async fn test_ring_batch_over_limit_evicts_previous_entries() {
    let strategy = ring(memory(), 2, 1);
    let c1 = near(0, 0);

    cache_pairs(&strategy, c1, vec![poi("A", c1)]).await;
    cache_pairs(
        &strategy,
        c1,
        vec![poi("B", c1), poi("C", c1), poi("D", c1)],
    )
    .await;

    // Queried from a neighbouring cell whose ring covers C1.
    assert_eq!(
        found(&strategy, near(1, 1), &["A", "B", "C", "D"]).await,
        vec!["B", "C", "D"]
    );
}

#[tokio::test]
async fn test_ring_batch_at_limit_keeps_previous_entries() {
    let strategy = ring(memory(), 2, 1);
    let c1 = near(0, 0);

    cache_pairs(&strategy, c1, vec![poi("A", c1)]).await;
    cache_pairs(&strategy, c1, vec![poi("B", c1), poi("C", c1)]).await;

    assert_eq!(
        found(&strategy, c1, &["A", "B", "C"]).await,
        vec!["A", "B", "C"]
    );
}

#[tokio::test]
async fn test_fixed_overflow_keeps_leading_pairs() {
    let strategy = fixed(memory(), 4);
    let here = near(0, 0);
    let ids: Vec<String> = (0..7).map(|i| format!("p{i}")).collect();
    let batch: Vec<_> = ids.iter().map(|id| poi(id, here)).collect();

    cache_pairs(&strategy, here, batch).await;

    let wanted: Vec<&str> = ids.iter().map(String::as_str).collect();
    assert_eq!(
        found(&strategy, here, &wanted).await,
        vec!["p0", "p1", "p2", "p3"]
    );
}

#[tokio::test]
async fn test_fixed_repeated_store_does_not_error() {
    let strategy = fixed(memory(), 10);
    let here = near(0, 0);

    for _ in 0..3 {
        strategy
            .store(here, ReadSnapshot::empty(), vec![poi("A", here)])
            .await
            .unwrap();
    }

    let wanted = keys(&["A"]);
    let lookup = strategy.lookup(here, &wanted).await;
    assert_eq!(lookup.hits().len(), 1);
}

// ============================================================================
// Round Trips
// ============================================================================

/// Randomly scattered records, each cached by a query at its own location,
/// are all found again when nothing is evicted.
#[tokio::test]
async fn test_disjoint_stores_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let ring = ring(memory(), 10_000, 1);
    let fixed = fixed(memory(), 10_000);

    let mut pairs = Vec::new();
    for i in 0..200 {
        let location = near(rng.random_range(-6..=6), rng.random_range(-6..=6));
        pairs.push(poi(&format!("poi-{i}"), location));
    }

    for (key, record) in &pairs {
        cache_pairs(&ring, record.location, vec![(key.clone(), record.clone())]).await;
        cache_pairs(&fixed, record.location, vec![(key.clone(), record.clone())]).await;
    }

    for (key, record) in &pairs {
        let wanted: HashSet<String> = [key.clone(), "absent".to_string()].into();

        for lookup in [
            ring.lookup(record.location, &wanted).await,
            fixed.lookup(record.location, &wanted).await,
        ] {
            assert_eq!(lookup.hits().len(), 1, "{key} should be cached once");
            assert_eq!(&lookup.hits()[0].1, record);
            assert_eq!(lookup.misses(&wanted), keys(&["absent"]));
        }
    }
}

/// A record is filed under the cell holding its own location, so queries
/// from elsewhere find it whenever their ring covers that cell.
#[tokio::test]
async fn test_ring_record_found_from_covering_rings() {
    let strategy = ring(memory(), 100, 1);
    let home = near(0, 1);

    cache_pairs(&strategy, near(0, 0), vec![poi("A", home)]).await;

    for (dr, dc) in [(0, 0), (1, 1), (-1, 2), (0, 2), (1, 0)] {
        assert_eq!(
            found(&strategy, near(dr, dc), &["A"]).await,
            vec!["A"],
            "query at offset ({dr}, {dc})"
        );
    }
    assert!(found(&strategy, near(0, 3), &["A"]).await.is_empty());
}

#[tokio::test]
async fn test_ring_k_zero_writes_home_cell() {
    let strategy = ring(memory(), 100, 0);

    cache_pairs(&strategy, near(0, 0), vec![poi("A", near(0, 1))]).await;

    assert!(found(&strategy, near(0, 0), &["A"]).await.is_empty());
    assert_eq!(found(&strategy, near(0, 1), &["A"]).await, vec!["A"]);
}

#[tokio::test]
async fn test_strategies_share_backend_without_aliasing() {
    let backend = memory();
    let ring = ring(backend.clone(), 100, 0);
    let fixed = fixed(backend.clone(), 100);
    let here = near(0, 0);

    let mut ring_copy = poi("A", here);
    ring_copy.1.id = "from-ring".to_string();
    let mut fixed_copy = poi("A", here);
    fixed_copy.1.id = "from-fixed".to_string();

    cache_pairs(&ring, here, vec![ring_copy]).await;
    cache_pairs(&fixed, here, vec![fixed_copy]).await;

    let wanted = keys(&["A"]);
    assert_eq!(ring.lookup(here, &wanted).await.hits()[0].1.id, "from-ring");
    assert_eq!(fixed.lookup(here, &wanted).await.hits()[0].1.id, "from-fixed");
}

// ============================================================================
// Failure Handling
// ============================================================================

#[tokio::test]
async fn test_corrupt_cell_does_not_hide_neighbours() {
    let backend = memory();
    let strategy = ring(backend.clone(), 100, 1);

    cache_pairs(&strategy, near(0, 0), vec![poi("A", near(1, 1))]).await;
    for (dr, dc) in [(0, 0), (-1, -1), (0, 1)] {
        let name = strategy.cell_name(&near(dr, dc));
        backend.set(name.as_str(), vec![0x00, 0x01, 0x02]).await.unwrap();
    }

    assert_eq!(found(&strategy, near(0, 0), &["A"]).await, vec!["A"]);
    assert_eq!(strategy.metrics().snapshot().decode_failures, 3);
}

#[tokio::test]
async fn test_write_fails_hard_read_fails_soft() {
    let backend = Arc::new(FlakyBackend::new());
    let strategy = ring(backend.clone(), 100, 1);
    let here = near(0, 0);

    cache_pairs(&strategy, here, vec![poi("A", here)]).await;

    backend.set_faults(true, false);
    let lookup = strategy.lookup(here, &keys(&["A"])).await;
    assert!(lookup.hits().is_empty());

    backend.set_faults(false, true);
    let lookup = strategy.lookup(here, &keys(&["B"])).await;
    let (_, snapshot) = lookup.into_parts();
    let result = strategy.store(here, snapshot, vec![poi("B", here)]).await;
    assert!(matches!(result, Err(CacheError::Backend(_))));

    backend.set_faults(false, false);
    assert_eq!(found(&strategy, here, &["A", "B"]).await, vec!["A"]);
}

// ============================================================================
// Backend Round Trips
// ============================================================================

#[tokio::test]
async fn test_ring_query_round_trips() {
    let backend = Arc::new(InstrumentedBackend::new(memory()));
    let strategy = ring(backend.clone(), 100, 2);
    let here = near(0, 0);

    let lookup = strategy.lookup(here, &keys(&["A", "B"])).await;
    assert_eq!(backend.round_trips().mgets, 1);
    assert_eq!(lookup.snapshot().len(), 25);

    let (_, snapshot) = lookup.into_parts();
    strategy
        .store(here, snapshot, vec![poi("A", near(1, 0)), poi("B", near(-2, 2))])
        .await
        .unwrap();

    // Both home cells were in the ring, so the write needs no extra read.
    let trips = backend.round_trips();
    assert_eq!(trips.mgets, 1);
    assert_eq!(trips.msets, 1);
    assert_eq!(trips.total(), 2);
}

// ============================================================================
// Read-Through Queries
// ============================================================================

#[tokio::test]
async fn test_read_through_warms_cache() {
    let metrics = Arc::new(CacheMetrics::new());
    let strategy = ring(memory(), 100, 1).with_metrics(Arc::clone(&metrics));
    let source = FixedLocationSource { location: near(0, 0) };
    let wanted = keys(&["A", "B", "C", "D"]);

    let first = read_through(&strategy, &source, near(0, 0), &wanted)
        .await
        .unwrap();
    assert_eq!(first.records.len(), 4);
    assert_eq!(first.hits, 0);

    let second = read_through(&strategy, &source, near(1, 1), &wanted)
        .await
        .unwrap();
    assert_eq!(second.records.len(), 4);
    assert_eq!(second.hits, 4);
    assert!((second.hit_ratio() - 1.0).abs() < f64::EPSILON);

    let counters = metrics.snapshot();
    assert_eq!(counters.lookups, 2);
    assert_eq!(counters.keys_requested, 8);
    assert_eq!(counters.keys_hit, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_read_through() {
    let strategy = Arc::new(ring(memory(), 1000, 1));
    let mut handles = Vec::new();

    for task in 0..16 {
        let strategy = Arc::clone(&strategy);
        handles.push(tokio::spawn(async move {
            // Tasks pair up on the same cells so some writes race.
            let location = near(0, (task % 8) * 4);
            let source = FixedLocationSource { location };
            let wanted: HashSet<String> = (0..10).map(|i| format!("t{task}-{i}")).collect();

            let outcome = read_through(&*strategy, &source, location, &wanted)
                .await
                .unwrap();
            assert_eq!(outcome.records.len(), 10);

            let returned: HashSet<String> =
                outcome.records.iter().map(|(k, _)| k.clone()).collect();
            assert_eq!(returned, wanted);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_strategies_from_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geocache.ini");
    std::fs::write(
        &path,
        "[backend]\nmax_size_bytes = 1048576\n\n[fixed]\nresolution = 16\ncache_limit = 10\n\n\
         [ring]\nresolution = 16\ncache_limit = 10\nk = 1\ntag = poi\n",
    )
    .unwrap();

    let settings = CacheSettings::load(&path).unwrap();
    let backend: Arc<dyn Backend> = Arc::new(settings.backend.build());
    let ring_config = settings.ring.unwrap();
    assert_eq!(ring_config.tag, "poi");

    let strategy: RingExpansionStrategy<Poi, _> = RingExpansionStrategy::new(
        ring_config,
        TileGridIndexer::new(),
        backend,
        Arc::new(BincodeCodec::new()),
    )
    .unwrap();

    let here = near(0, 0);
    cache_pairs(&strategy, here, vec![poi("A", here)]).await;
    assert_eq!(found(&strategy, here, &["A"]).await, vec!["A"]);
    assert!(strategy.cell_name(&here).as_str().starts_with("poi:16:"));
}
