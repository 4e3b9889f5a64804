//! Strategy configuration.
//!
//! Configs are plain values with builder-style setters. They are validated
//! once, when a strategy is constructed, and are immutable afterwards.

use crate::keys::validate_tag;

use super::ConfigError;

/// Default resolution for the fixed-cell strategy.
///
/// Coarse cells: one entry covers a wide area, so a query rarely needs a
/// neighbour to find its records.
pub const DEFAULT_FIXED_RESOLUTION: u8 = 5;

/// Default per-cell capacity for the fixed-cell strategy.
pub const DEFAULT_FIXED_CACHE_LIMIT: usize = 5000;

/// Default backend name tag for the fixed-cell strategy.
pub const DEFAULT_FIXED_TAG: &str = "fixed";

/// Default resolution for the ring-expansion strategy.
///
/// One level finer than fixed-cell; the ring makes up for the smaller cells.
pub const DEFAULT_RING_RESOLUTION: u8 = 6;

/// Default per-cell capacity for the ring-expansion strategy.
pub const DEFAULT_RING_CACHE_LIMIT: usize = 2000;

/// Default ring radius in cells.
pub const DEFAULT_RING_K: u32 = 1;

/// Largest accepted ring radius.
///
/// A lookup reads up to (2k+1)² cells in one `mget`.
pub const MAX_RING_K: u32 = 32;

/// Default backend name tag for the ring-expansion strategy.
pub const DEFAULT_RING_TAG: &str = "ring";

/// Configuration for [`crate::strategy::FixedCellStrategy`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedCellConfig {
    /// Cell granularity; higher means smaller cells.
    pub resolution: u8,

    /// Maximum entries kept per cell after a write.
    pub cache_limit: usize,

    /// Backend name tag for this cache variant.
    pub tag: String,

    /// When set, `store` is a no-op.
    pub read_only: bool,
}

impl Default for FixedCellConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_FIXED_RESOLUTION,
            cache_limit: DEFAULT_FIXED_CACHE_LIMIT,
            tag: DEFAULT_FIXED_TAG.to_string(),
            read_only: false,
        }
    }
}

impl FixedCellConfig {
    /// Create a config with the given resolution and capacity.
    pub fn new(resolution: u8, cache_limit: usize) -> Self {
        Self {
            resolution,
            cache_limit,
            ..Self::default()
        }
    }

    /// Set the resolution.
    pub fn with_resolution(mut self, resolution: u8) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the per-cell capacity.
    pub fn with_cache_limit(mut self, cache_limit: usize) -> Self {
        self.cache_limit = cache_limit;
        self
    }

    /// Set the backend name tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Enable or disable read-only mode.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Check the config against an indexer's maximum resolution.
    pub fn validate(&self, max_resolution: u8) -> Result<(), ConfigError> {
        validate_common(self.resolution, self.cache_limit, &self.tag, max_resolution)
    }
}

/// Configuration for [`crate::strategy::RingExpansionStrategy`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingConfig {
    /// Cell granularity; higher means smaller cells.
    pub resolution: u8,

    /// Distinct new keys per cell above which a write discards the cell's
    /// previous entries.
    pub cache_limit: usize,

    /// Ring radius: cells within `k` steps of the query cell are read.
    pub k: u32,

    /// Backend name tag for this cache variant.
    pub tag: String,

    /// When set, `store` is a no-op.
    pub read_only: bool,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RING_RESOLUTION,
            cache_limit: DEFAULT_RING_CACHE_LIMIT,
            k: DEFAULT_RING_K,
            tag: DEFAULT_RING_TAG.to_string(),
            read_only: false,
        }
    }
}

impl RingConfig {
    /// Create a config with the given resolution, capacity and ring radius.
    pub fn new(resolution: u8, cache_limit: usize, k: u32) -> Self {
        Self {
            resolution,
            cache_limit,
            k,
            ..Self::default()
        }
    }

    /// Set the resolution.
    pub fn with_resolution(mut self, resolution: u8) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the per-cell capacity.
    pub fn with_cache_limit(mut self, cache_limit: usize) -> Self {
        self.cache_limit = cache_limit;
        self
    }

    /// Set the ring radius.
    pub fn with_k(mut self, k: u32) -> Self {
        self.k = k;
        self
    }

    /// Set the backend name tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Enable or disable read-only mode.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Check the config against an indexer's maximum resolution.
    ///
    /// Also rejects a ring radius above [`MAX_RING_K`].
    pub fn validate(&self, max_resolution: u8) -> Result<(), ConfigError> {
        validate_common(self.resolution, self.cache_limit, &self.tag, max_resolution)?;
        if self.k > MAX_RING_K {
            return Err(ConfigError::InvalidRingRadius {
                k: self.k,
                max: MAX_RING_K,
            });
        }
        Ok(())
    }
}

fn validate_common(
    resolution: u8,
    cache_limit: usize,
    tag: &str,
    max_resolution: u8,
) -> Result<(), ConfigError> {
    if resolution == 0 || resolution > max_resolution {
        return Err(ConfigError::InvalidResolution {
            resolution,
            max: max_resolution,
        });
    }
    if cache_limit == 0 {
        return Err(ConfigError::InvalidCacheLimit);
    }
    validate_tag(tag)
}
