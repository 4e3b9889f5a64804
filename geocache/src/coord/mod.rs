//! Coordinate conversion module
//!
//! Provides geographic [`Location`]s and conversions between latitude/longitude
//! and Web Mercator tile coordinates, which the tile-grid indexer uses as cells.

mod types;

pub use types::{
    CoordError, Location, TileCoord, EARTH_RADIUS_KM, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT,
    MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 18)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    Ok(project(lat, lon, zoom))
}

/// Projects already-validated coordinates onto the tile grid.
fn project(lat: f64, lon: f64, zoom: u8) -> TileCoord {
    let n = 2.0_f64.powi(zoom as i32);
    let max_index = (1u32 << zoom) - 1;

    // The east edge (lon = 180) and the south edge belong to the last tile.
    let col = (((lon + 180.0) / 360.0 * n) as u32).min(max_index);

    let lat_rad = lat * PI / 180.0;
    let row = (((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n) as u32).min(max_index);

    TileCoord { row, col, zoom }
}

/// Converts a [`Location`] to tile coordinates, clamping latitude into the
/// Web Mercator range first.
///
/// Locations poleward of ±85.05° land in the first or last tile row.
#[inline]
pub fn location_to_tile(location: &Location, zoom: u8) -> Result<TileCoord, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }
    Ok(project_location(location, zoom))
}

/// Infallible form of [`location_to_tile`] for callers that validated `zoom`.
///
/// Zoom levels above [`MAX_ZOOM`] are clamped.
#[inline]
pub(crate) fn project_location(location: &Location, zoom: u8) -> TileCoord {
    let lat = location.lat().clamp(MIN_LAT, MAX_LAT);
    project(lat, location.lng(), zoom.min(MAX_ZOOM))
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    tile_fraction_to_lat_lon(tile.row as f64, tile.col as f64, tile.zoom)
}

/// Converts tile coordinates to the latitude/longitude of the tile's center.
#[inline]
pub fn tile_to_lat_lon_center(tile: &TileCoord) -> (f64, f64) {
    tile_fraction_to_lat_lon(tile.row as f64 + 0.5, tile.col as f64 + 0.5, tile.zoom)
}

fn tile_fraction_to_lat_lon(row: f64, col: f64, zoom: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);

    let lon = col / n * 360.0 - 180.0;

    // Inverse Web Mercator
    let y = row / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}
