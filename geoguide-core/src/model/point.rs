//! Two-component coordinate used for both geodetic and projected points

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use geo::{Distance, Haversine, Point};

/// A pair of `f64` read either as `(lat, lon)` in degrees or as projected
/// `(x, y)`. Both readings share storage: `lat` is `x` and `lon` is `y`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    x: f64,
    y: f64,
}

impl GeoPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self { x: lat, y: lon }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn lat(&self) -> f64 {
        self.x
    }

    pub fn lon(&self) -> f64 {
        self.y
    }

    pub fn is_valid_geodetic(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat()) && (-180.0..=180.0).contains(&self.lon())
    }

    /// Planar distance, meaningful for projected points only
    pub fn norm_to(&self, other: GeoPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Great-circle distance in metres between two geodetic points
    pub fn haversine_to(&self, other: GeoPoint) -> f64 {
        Haversine.distance(self.to_geo(), other.to_geo())
    }

    /// `geo` point with the usual `x = lon`, `y = lat` ordering
    pub fn to_geo(&self) -> Point<f64> {
        Point::new(self.lon(), self.lat())
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(point: Point<f64>) -> Self {
        GeoPoint::from_lat_lon(point.y(), point.x())
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

impl Add for GeoPoint {
    type Output = GeoPoint;

    fn add(self, rhs: GeoPoint) -> GeoPoint {
        GeoPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for GeoPoint {
    type Output = GeoPoint;

    fn sub(self, rhs: GeoPoint) -> GeoPoint {
        GeoPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for GeoPoint {
    type Output = GeoPoint;

    fn neg(self) -> GeoPoint {
        GeoPoint::new(-self.x, -self.y)
    }
}

impl Mul<f64> for GeoPoint {
    type Output = GeoPoint;

    fn mul(self, rhs: f64) -> GeoPoint {
        GeoPoint::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<GeoPoint> for f64 {
    type Output = GeoPoint;

    fn mul(self, rhs: GeoPoint) -> GeoPoint {
        rhs * self
    }
}

impl Div<f64> for GeoPoint {
    type Output = GeoPoint;

    fn div(self, rhs: f64) -> GeoPoint {
        GeoPoint::new(self.x / rhs, self.y / rhs)
    }
}

impl AddAssign for GeoPoint {
    fn add_assign(&mut self, rhs: GeoPoint) {
        *self = *self + rhs;
    }
}

impl SubAssign for GeoPoint {
    fn sub_assign(&mut self, rhs: GeoPoint) {
        *self = *self - rhs;
    }
}

impl MulAssign<f64> for GeoPoint {
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_readings_share_storage() {
        let a = GeoPoint::default();
        assert_eq!((a.lat(), a.lon(), a.x(), a.y()), (0.0, 0.0, 0.0, 0.0));

        let b = GeoPoint::from_lat_lon(1.0, 2.0);
        assert_eq!((b.x(), b.y()), (1.0, 2.0));
        assert_eq!(b, GeoPoint::new(1.0, 2.0));
    }

    #[test]
    fn arithmetic_is_component_wise() {
        let b = GeoPoint::new(3.0, 4.0);
        let a = 2.0 * b - b;
        assert_eq!(a, b);
        assert_eq!(-b + b, GeoPoint::default());
        assert_eq!(b / 2.0, GeoPoint::new(1.5, 2.0));

        let mut c = b;
        c *= 180.0 / std::f64::consts::PI;
        c -= b * (180.0 / std::f64::consts::PI);
        assert_eq!(c, GeoPoint::default());
        c += b;
        assert_ne!(c, GeoPoint::new(3.0, 4.5));
    }

    #[test]
    fn geodetic_validity() {
        assert!(GeoPoint::from_lat_lon(90.0, -180.0).is_valid_geodetic());
        assert!(!GeoPoint::from_lat_lon(90.1, 0.0).is_valid_geodetic());
        assert!(!GeoPoint::from_lat_lon(0.0, 181.0).is_valid_geodetic());
        assert!(!GeoPoint::from_lat_lon(f64::NAN, 0.0).is_valid_geodetic());
    }

    #[test]
    fn geo_conversion_swaps_axes() {
        let p = GeoPoint::from_lat_lon(37.5, 127.0);
        let g = p.to_geo();
        assert_eq!((g.x(), g.y()), (127.0, 37.5));
        assert_eq!(GeoPoint::from(g), p);
        assert_eq!(p.norm_to(GeoPoint::from_lat_lon(40.5, 131.0)), 5.0);
    }
}
