//! Stateless conversions between geodetic, UTM and tile-grid coordinates.

pub mod tile;
pub mod utm;

pub use tile::{MAX_MERCATOR_LATITUDE, MAX_ZOOM, TileKey, geodetic_to_tile, tile_to_geodetic};
pub use utm::{UtmCoord, central_meridian, geodetic_to_utm, utm_to_geodetic, utm_zone_for};

use crate::{Error, GeoPoint};

/// Planar frame shared by several points, fixed to one UTM zone and
/// hemisphere so that distances between its points are metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalFrame {
    zone: u8,
    south: bool,
}

impl LocalFrame {
    /// Frame of the zone containing `origin` (a geodetic point)
    pub fn around(origin: GeoPoint) -> Self {
        Self {
            zone: utm_zone_for(origin.lon()),
            south: origin.lat() < 0.0,
        }
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    /// Projects a geodetic point into this frame, result in metres as `(x, y)`
    pub fn to_local(&self, point: GeoPoint) -> Result<GeoPoint, Error> {
        let utm = geodetic_to_utm(point.lat(), point.lon(), Some(self.zone))?;
        // Keep one northing origin for the whole frame even when a point
        // crosses the equator.
        let y = match (self.south, utm.south) {
            (true, false) => utm.y + 10_000_000.0,
            (false, true) => utm.y - 10_000_000.0,
            _ => utm.y,
        };
        Ok(GeoPoint::new(utm.x, y))
    }

    /// Inverse of [`LocalFrame::to_local`]
    pub fn to_geodetic(&self, local: GeoPoint) -> Result<GeoPoint, Error> {
        let (lat, lon) = utm_to_geodetic(local.x(), local.y(), i32::from(self.zone), self.south)?;
        Ok(GeoPoint::from_lat_lon(lat, lon))
    }

    /// Planar distance in metres between two geodetic points
    pub fn distance(&self, a: GeoPoint, b: GeoPoint) -> Result<f64, Error> {
        let a = self.to_local(a)?;
        let b = self.to_local(b)?;
        Ok(a.norm_to(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn local_frame_round_trip() {
        let origin = GeoPoint::from_lat_lon(36.3820, 127.3637);
        let frame = LocalFrame::around(origin);
        assert_eq!(frame.zone(), 52);

        let local = frame.to_local(origin).unwrap();
        let back = frame.to_geodetic(local).unwrap();
        assert_abs_diff_eq!(back.lat(), origin.lat(), epsilon = 1e-9);
        assert_abs_diff_eq!(back.lon(), origin.lon(), epsilon = 1e-9);
    }

    #[test]
    fn local_distance_is_metric() {
        let a = GeoPoint::from_lat_lon(37.5665, 126.978);
        let b = GeoPoint::from_lat_lon(37.5665 + 0.001, 126.978);
        let frame = LocalFrame::around(a);
        // one thousandth of a degree of latitude is roughly 111 m
        let d = frame.distance(a, b).unwrap();
        assert!((110.0..112.0).contains(&d), "distance was {d}");
    }

    #[test]
    fn frame_across_equator_is_continuous() {
        let north = GeoPoint::from_lat_lon(0.0001, 3.0);
        let south = GeoPoint::from_lat_lon(-0.0001, 3.0);
        let frame = LocalFrame::around(north);
        let d = frame.distance(north, south).unwrap();
        assert!((21.0..23.0).contains(&d), "distance was {d}");
    }
}
