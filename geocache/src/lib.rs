//! geocache - Spatially partitioned record cache
//!
//! This library caches keyed, geolocated records in a byte-oriented key-value
//! backend, partitioned by a spatial grid. A query at a location reads the
//! cells around it, returns the wanted records it finds, and writes back the
//! records the caller had to fetch elsewhere.
//!
//! # Architecture
//!
//! ```text
//! read_through ──► SpatialStrategy ──► SpatialIndexer  (location → cells)
//!                       │          ──► CacheKeyBuilder (cell → backend name)
//!                       │          ──► Codec           (payload ↔ bytes)
//!                       │          ──► MergePolicy     (bounded payloads)
//!                       ▼
//!                    Backend (get/set/mget/mset over opaque bytes)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use geocache::{
//!     read_through, MemoryBackend, RingConfig, RingExpansionStrategy, TileGridIndexer,
//!     ZlibBincodeCodec,
//! };
//!
//! let backend = Arc::new(MemoryBackend::new(512 * 1024 * 1024, None));
//! let strategy = RingExpansionStrategy::new(
//!     RingConfig::default(),
//!     TileGridIndexer::new(),
//!     backend,
//!     Arc::new(ZlibBincodeCodec::new()),
//! )?;
//!
//! let outcome = read_through(&strategy, &source, location, &wanted).await?;
//! println!("{} of {} from cache", outcome.hits, outcome.requested);
//! ```

pub mod cache;
pub mod codec;
pub mod config;
pub mod coord;
pub mod error;
pub mod index;
pub mod keys;
pub mod logging;
pub mod query;
pub mod record;
pub mod strategy;
pub mod telemetry;

pub use cache::{Backend, BackendError, InstrumentedBackend, MemoryBackend};
pub use codec::{BincodeCodec, Codec, CodecError, ZlibBincodeCodec};
pub use config::{CacheSettings, ConfigError, FixedCellConfig, RingConfig};
pub use coord::Location;
pub use error::CacheError;
pub use index::{SpatialIndexer, TileGridIndexer};
pub use keys::{CacheKeyBuilder, CacheName};
pub use query::{read_through, QueryError, QueryOutcome, RecordSource, SourceError};
pub use record::Record;
pub use strategy::{
    FixedCellStrategy, Lookup, ReadSnapshot, RingExpansionStrategy, SpatialStrategy,
};
pub use telemetry::{CacheMetrics, MetricsSnapshot};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
