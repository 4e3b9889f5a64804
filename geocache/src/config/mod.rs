//! Configuration for strategies and the backend.
//!
//! - [`FixedCellConfig`] / [`RingConfig`]: per-strategy settings, validated
//!   at strategy construction
//! - [`CacheSettings`]: loads both plus backend settings from an INI file

mod error;
mod file;
mod strategy;

pub use error::ConfigError;
pub use file::{BackendSettings, CacheSettings, DEFAULT_BACKEND_MAX_SIZE_BYTES};
pub use strategy::{
    FixedCellConfig, RingConfig, DEFAULT_FIXED_CACHE_LIMIT, DEFAULT_FIXED_RESOLUTION,
    DEFAULT_FIXED_TAG, DEFAULT_RING_CACHE_LIMIT, DEFAULT_RING_K, DEFAULT_RING_RESOLUTION,
    DEFAULT_RING_TAG, MAX_RING_K,
};
