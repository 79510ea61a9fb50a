//! Slippy-tile grid arithmetic (Web Mercator, `z/x/y` indexing)

use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::fmt;

use geo::{Rect, coord};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Latitude band accepted by the tile projection
pub const MAX_MERCATOR_LATITUDE: f64 = 85.05;

/// Deepest zoom level of the grid; cell indices stay exact in `u32`
pub const MAX_ZOOM: u8 = 30;

/// Cell of the slippy-tile grid at a given zoom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKey {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

fn tiles_per_axis(zoom: u8) -> f64 {
    2f64.powi(i32::from(zoom))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_index(value: f64, n: f64) -> u32 {
    value.floor().clamp(0.0, n - 1.0) as u32
}

/// Tile column and row containing the geodetic point at `zoom`.
///
/// # Errors
///
/// Returns [`Error::OutOfProjectionRange`] when `lat` lies outside the
/// Web-Mercator band and [`Error::UnsupportedZoom`] above [`MAX_ZOOM`].
pub fn geodetic_to_tile(lon: f64, lat: f64, zoom: u8) -> Result<(u32, u32), Error> {
    if zoom > MAX_ZOOM {
        return Err(Error::UnsupportedZoom(zoom));
    }
    if !(lat.abs() < MAX_MERCATOR_LATITUDE) {
        return Err(Error::OutOfProjectionRange(lat));
    }

    let n = tiles_per_axis(zoom);
    let lon = if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    };
    let phi = lat.to_radians();

    let x = (lon + 180.0) / 360.0 * n;
    let y = (1.0 - (phi.tan() + 1.0 / phi.cos()).ln() / PI) / 2.0 * n;

    Ok((to_index(x, n), to_index(y, n)))
}

/// Geodetic `(lon, lat)` of the north-west corner of a tile
pub fn tile_to_geodetic(x: u32, y: u32, zoom: u8) -> (f64, f64) {
    let n = tiles_per_axis(zoom);
    let lon = f64::from(x) / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * f64::from(y) / n)).sinh().atan().to_degrees();
    (lon, lat)
}

impl TileKey {
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Key of the tile containing the point
    pub fn containing(lon: f64, lat: f64, zoom: u8) -> Result<Self, Error> {
        let (x, y) = geodetic_to_tile(lon, lat, zoom)?;
        Ok(Self { x, y, zoom })
    }

    /// Geodetic extent of the tile, `x` is longitude and `y` latitude
    pub fn bounds(&self) -> Rect<f64> {
        let (west, north) = tile_to_geodetic(self.x, self.y, self.zoom);
        let (east, south) =
            tile_to_geodetic(self.x.saturating_add(1), self.y.saturating_add(1), self.zoom);
        Rect::new(coord! { x: west, y: south }, coord! { x: east, y: north })
    }

    /// Whether the geodetic point lies inside the tile, edges inclusive
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        let bounds = self.bounds();
        (bounds.min().x..=bounds.max().x).contains(&lon)
            && (bounds.min().y..=bounds.max().y).contains(&lat)
    }

    /// Square block of keys within `radius` cells of this one.
    ///
    /// Columns wrap around the antimeridian, rows outside the grid are
    /// dropped. The result is sorted and free of duplicates.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn neighborhood(&self, radius: u32) -> Vec<TileKey> {
        // 2^32 columns still fit the u32 indices
        let n = 1i64 << u32::from(self.zoom.min(32));
        let radius = i64::from(radius).min(n);
        let mut keys = BTreeSet::new();

        for dy in -radius..=radius {
            let y = i64::from(self.y) + dy;
            if !(0..n).contains(&y) {
                continue;
            }
            for dx in -radius..=radius {
                let x = (i64::from(self.x) + dx).rem_euclid(n);
                keys.insert(TileKey {
                    x: x as u32,
                    y: y as u32,
                    zoom: self.zoom,
                });
            }
        }

        keys.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn seoul_tile_at_default_zoom() {
        assert_eq!(geodetic_to_tile(126.978, 37.5665, 19).unwrap(), (447_069, 203_031));
        assert_eq!(geodetic_to_tile(126.978, 37.5665, 0).unwrap(), (0, 0));
    }

    #[test]
    fn tile_corner_inverse() {
        let (lon, lat) = tile_to_geodetic(447_069, 203_031, 19);
        assert_abs_diff_eq!(lon, 126.977_920_532, epsilon = 1e-8);
        assert_abs_diff_eq!(lat, 37.566_895_491, epsilon = 1e-8);
    }

    #[test]
    fn rejects_polar_latitudes() {
        assert!(matches!(
            geodetic_to_tile(0.0, 85.06, 10),
            Err(Error::OutOfProjectionRange(_))
        ));
        assert!(matches!(
            geodetic_to_tile(0.0, -89.0, 10),
            Err(Error::OutOfProjectionRange(_))
        ));
        assert!(geodetic_to_tile(0.0, f64::NAN, 10).is_err());
    }

    #[test]
    fn rejects_zoom_beyond_grid() {
        assert!(matches!(
            geodetic_to_tile(126.978, 37.5665, 40),
            Err(Error::UnsupportedZoom(40))
        ));
        assert!(TileKey::containing(126.978, 37.5665, MAX_ZOOM + 1).is_err());

        let deepest = TileKey::containing(126.978, 37.5665, MAX_ZOOM).unwrap();
        assert!(deepest.contains(126.978, 37.5665));
    }

    #[test]
    fn neighborhood_keeps_columns_at_deep_zoom() {
        let key = TileKey::new(u32::MAX, 7, 32);
        let keys = key.neighborhood(1);
        assert_eq!(keys.len(), 9);
        assert!(keys.contains(&TileKey::new(0, 7, 32)));
        assert!(keys.contains(&TileKey::new(u32::MAX - 1, 7, 32)));
    }

    #[test]
    fn antimeridian_stays_in_grid() {
        let (x, _) = geodetic_to_tile(180.0, 0.0, 3).unwrap();
        assert_eq!(x, 7);
        let (x, _) = geodetic_to_tile(-180.0, 0.0, 3).unwrap();
        assert_eq!(x, 0);
    }

    #[test]
    fn neighborhood_wraps_columns_and_clips_rows() {
        let key = TileKey::new(0, 0, 2);
        let keys = key.neighborhood(1);
        // rows -1 are dropped, columns wrap to 3
        assert_eq!(keys.len(), 6);
        assert!(keys.contains(&TileKey::new(3, 0, 2)));
        assert!(keys.contains(&TileKey::new(1, 1, 2)));

        assert_eq!(TileKey::new(0, 0, 0).neighborhood(1), vec![TileKey::new(0, 0, 0)]);
        assert_eq!(TileKey::new(5, 5, 4).neighborhood(0), vec![TileKey::new(5, 5, 4)]);
        assert_eq!(TileKey::new(5, 5, 4).neighborhood(1).len(), 9);
    }

    #[test]
    fn display_is_zoom_first() {
        assert_eq!(TileKey::new(3, 4, 5).to_string(), "5/3/4");
    }
}
