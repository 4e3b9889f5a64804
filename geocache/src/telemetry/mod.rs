//! Cache telemetry.
//!
//! Lock-free atomic counters updated by the strategies on every lookup and
//! store, with point-in-time snapshots for reporting.
//!
//! # Architecture
//!
//! ```text
//! Strategies ─────► CacheMetrics ─────► MetricsSnapshot ─────► Callers
//!                  (atomic counters)   (point-in-time copy)    (logs, tests)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use geocache::telemetry::CacheMetrics;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(CacheMetrics::new());
//! let strategy = RingExpansionStrategy::new(config, indexer, backend, codec)?
//!     .with_metrics(Arc::clone(&metrics));
//!
//! // ... run queries ...
//!
//! let snapshot = metrics.snapshot();
//! println!("Hit ratio: {:.3}", snapshot.hit_ratio());
//! ```

mod metrics;
mod snapshot;

pub use metrics::CacheMetrics;
pub use snapshot::MetricsSnapshot;
