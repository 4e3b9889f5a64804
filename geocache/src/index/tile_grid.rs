//! Web Mercator tile grid indexer.
//!
//! Cells are slippy-map tiles; the resolution is the zoom level. The k-ring of
//! a tile is the (2k+1)×(2k+1) square of tiles around it. Columns wrap across
//! the antimeridian, rows stop at the poles.

use std::collections::HashSet;

use crate::coord::{project_location, Location, TileCoord, MAX_ZOOM};
use crate::index::SpatialIndexer;

/// Indexer over Web Mercator tiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct TileGridIndexer;

impl TileGridIndexer {
    /// Create a new tile grid indexer.
    pub fn new() -> Self {
        Self
    }
}

impl SpatialIndexer for TileGridIndexer {
    type Cell = TileCoord;

    fn cell_of(&self, location: &Location, resolution: u8) -> TileCoord {
        project_location(location, resolution)
    }

    fn ring(&self, center: &TileCoord, k: u32) -> Vec<TileCoord> {
        let n = i64::from(center.tiles_per_axis());
        let k = i64::from(k);

        let row = i64::from(center.row);
        let rows = (row - k).max(0)..=(row + k).min(n - 1);
        // Wrapping n/2 columns each way already reaches every column.
        let kc = k.min(n / 2);
        let width = (2 * kc + 1).min(n);
        let capacity = (rows.end() - rows.start() + 1) * width;

        let mut seen = HashSet::with_capacity(capacity as usize);
        let mut cells = Vec::with_capacity(capacity as usize);

        seen.insert(*center);
        cells.push(*center);

        for row in rows {
            for dc in -kc..=kc {
                let col = (i64::from(center.col) + dc).rem_euclid(n);
                let tile = TileCoord {
                    row: row as u32,
                    col: col as u32,
                    zoom: center.zoom,
                };
                if seen.insert(tile) {
                    cells.push(tile);
                }
            }
        }

        cells
    }

    fn max_resolution(&self) -> u8 {
        MAX_ZOOM
    }
}
