//! Spatial indexing.
//!
//! A [`SpatialIndexer`] maps a [`Location`] at a resolution to a discrete cell
//! and enumerates the cells within `k` adjacency steps of a cell. The cache
//! strategies only rely on cell equality, hashing, and a stable textual form
//! for backend naming.
//!
//! # Available Indexers
//!
//! - [`TileGridIndexer`]: Web Mercator slippy-map tiles; resolution is the zoom level

mod tile_grid;

pub use tile_grid::TileGridIndexer;

use std::fmt;
use std::hash::Hash;

use crate::coord::Location;

/// Deterministic mapping from coordinates to cells.
///
/// Implementations must be pure: the same location and resolution always
/// produce the same cell, and `ring` returns the same cells for the same input.
pub trait SpatialIndexer: Send + Sync {
    /// Cell identifier. `Display` must be injective within one resolution, it
    /// becomes part of backend entry names.
    type Cell: Clone + Eq + Hash + fmt::Display + Send + Sync;

    /// The cell containing `location` at `resolution`.
    ///
    /// `resolution` is assumed to be within `1..=max_resolution()`; strategies
    /// validate this when they are constructed.
    fn cell_of(&self, location: &Location, resolution: u8) -> Self::Cell;

    /// All cells within `k` steps of `center`, including `center` itself.
    ///
    /// The center cell is always first. No cell appears twice.
    fn ring(&self, center: &Self::Cell, k: u32) -> Vec<Self::Cell>;

    /// Highest resolution this indexer supports.
    fn max_resolution(&self) -> u8;
}
