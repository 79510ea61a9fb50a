//! Universal Transverse Mercator projection on the WGS84 ellipsoid.
//!
//! The forward and inverse mappings use the classic footpoint-latitude
//! series (terms up to the eighth power of the longitude offset), which stays
//! well below a millimetre inside a zone and round-trips to ~1e-10 degrees.

use std::f64::consts::PI;

use crate::Error;

/// Semi-major axis of the WGS84 ellipsoid in metres
const SEMI_MAJOR: f64 = 6_378_137.0;
/// Semi-minor axis of the WGS84 ellipsoid in metres
const SEMI_MINOR: f64 = 6_356_752.314;
const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

pub const MIN_ZONE: u8 = 1;
pub const MAX_ZONE: u8 = 60;

/// A point projected onto a UTM zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmCoord {
    /// Easting in metres, including the false easting
    pub x: f64,
    /// Northing in metres, including the false northing for the south
    pub y: f64,
    pub zone: u8,
    pub south: bool,
}

/// Zone whose six-degree band contains `lon`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn utm_zone_for(lon: f64) -> u8 {
    let zone = ((lon + 180.0) / 6.0).floor() as i64 + 1;
    // lon == 180 falls one band past the last zone
    zone.clamp(i64::from(MIN_ZONE), i64::from(MAX_ZONE)) as u8
}

/// Central meridian of `zone` in degrees
pub fn central_meridian(zone: u8) -> Result<f64, Error> {
    validate_zone(i32::from(zone))?;
    Ok(-183.0 + f64::from(zone) * 6.0)
}

pub(crate) fn validate_zone(zone: i32) -> Result<u8, Error> {
    if (i32::from(MIN_ZONE)..=i32::from(MAX_ZONE)).contains(&zone) {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        Ok(zone as u8)
    } else {
        Err(Error::InvalidZone(zone))
    }
}

/// Projects a geodetic point (degrees) onto UTM.
///
/// When `zone` is `None` the zone is derived from the longitude, otherwise the
/// given zone's central meridian is used, which allows projecting points that
/// sit just across a zone boundary into a neighbouring frame.
///
/// # Errors
///
/// Returns [`Error::InvalidZone`] when the requested zone is outside `1..=60`.
pub fn geodetic_to_utm(lat: f64, lon: f64, zone: Option<u8>) -> Result<UtmCoord, Error> {
    let zone = match zone {
        Some(zone) => validate_zone(i32::from(zone))?,
        None => utm_zone_for(lon),
    };
    let lambda0 = central_meridian(zone)?.to_radians();

    let (x, y) = map_lat_lon_to_xy(lat.to_radians(), lon.to_radians(), lambda0);

    let x = x * SCALE_FACTOR + FALSE_EASTING;
    let mut y = y * SCALE_FACTOR;
    let south = y < 0.0;
    if south {
        y += FALSE_NORTHING_SOUTH;
    }

    Ok(UtmCoord { x, y, zone, south })
}

/// Inverse of [`geodetic_to_utm`], returning `(lat, lon)` in degrees.
///
/// # Errors
///
/// Returns [`Error::InvalidZone`] when `zone` is outside `1..=60`.
pub fn utm_to_geodetic(x: f64, y: f64, zone: i32, south: bool) -> Result<(f64, f64), Error> {
    let zone = validate_zone(zone)?;
    let lambda0 = central_meridian(zone)?.to_radians();

    let x = (x - FALSE_EASTING) / SCALE_FACTOR;
    let y = if south { y - FALSE_NORTHING_SOUTH } else { y } / SCALE_FACTOR;

    let (phi, lambda) = map_xy_to_lat_lon(x, y, lambda0);
    Ok((phi.to_degrees(), normalize_longitude(lambda.to_degrees())))
}

impl UtmCoord {
    /// Geodetic `(lat, lon)` of this projected point
    pub fn to_geodetic(&self) -> Result<(f64, f64), Error> {
        utm_to_geodetic(self.x, self.y, i32::from(self.zone), self.south)
    }
}

fn normalize_longitude(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

fn third_flattening() -> f64 {
    (SEMI_MAJOR - SEMI_MINOR) / (SEMI_MAJOR + SEMI_MINOR)
}

fn second_eccentricity_squared() -> f64 {
    (SEMI_MAJOR.powi(2) - SEMI_MINOR.powi(2)) / SEMI_MINOR.powi(2)
}

/// Ellipsoidal distance from the equator to latitude `phi` along the meridian
fn arc_length_of_meridian(phi: f64) -> f64 {
    let n = third_flattening();

    let alpha = ((SEMI_MAJOR + SEMI_MINOR) / 2.0) * (1.0 + n.powi(2) / 4.0 + n.powi(4) / 64.0);
    let beta = -3.0 * n / 2.0 + 9.0 * n.powi(3) / 16.0 - 3.0 * n.powi(5) / 32.0;
    let gamma = 15.0 * n.powi(2) / 16.0 - 15.0 * n.powi(4) / 32.0;
    let delta = -35.0 * n.powi(3) / 48.0 + 105.0 * n.powi(5) / 256.0;
    let epsilon = 315.0 * n.powi(4) / 512.0;

    alpha
        * (phi
            + beta * (2.0 * phi).sin()
            + gamma * (4.0 * phi).sin()
            + delta * (6.0 * phi).sin()
            + epsilon * (8.0 * phi).sin())
}

/// Latitude whose meridian arc equals `y`
fn footpoint_latitude(y: f64) -> f64 {
    let n = third_flattening();

    let alpha = ((SEMI_MAJOR + SEMI_MINOR) / 2.0) * (1.0 + n.powi(2) / 4.0 + n.powi(4) / 64.0);
    let y = y / alpha;
    let beta = 3.0 * n / 2.0 - 27.0 * n.powi(3) / 32.0 + 269.0 * n.powi(5) / 512.0;
    let gamma = 21.0 * n.powi(2) / 16.0 - 55.0 * n.powi(4) / 32.0;
    let delta = 151.0 * n.powi(3) / 96.0 - 417.0 * n.powi(5) / 128.0;
    let epsilon = 1097.0 * n.powi(4) / 512.0;

    y + beta * (2.0 * y).sin()
        + gamma * (4.0 * y).sin()
        + delta * (6.0 * y).sin()
        + epsilon * (8.0 * y).sin()
}

/// Transverse Mercator projection without scale factor or false offsets
fn map_lat_lon_to_xy(phi: f64, lambda: f64, lambda0: f64) -> (f64, f64) {
    let nu2 = second_eccentricity_squared() * phi.cos().powi(2);
    let big_n = SEMI_MAJOR.powi(2) / (SEMI_MINOR * (1.0 + nu2).sqrt());
    let t = phi.tan();
    let t2 = t * t;
    let l = lambda - lambda0;
    let c = phi.cos();

    let l3coef = 1.0 - t2 + nu2;
    let l4coef = 5.0 - t2 + 9.0 * nu2 + 4.0 * nu2 * nu2;
    let l5coef = 5.0 - 18.0 * t2 + t2 * t2 + 14.0 * nu2 - 58.0 * t2 * nu2;
    let l6coef = 61.0 - 58.0 * t2 + t2 * t2 + 270.0 * nu2 - 330.0 * t2 * nu2;
    let l7coef = 61.0 - 479.0 * t2 + 179.0 * t2 * t2 - t2 * t2 * t2;
    let l8coef = 1385.0 - 3111.0 * t2 + 543.0 * t2 * t2 - t2 * t2 * t2;

    let x = big_n * c * l
        + big_n / 6.0 * c.powi(3) * l3coef * l.powi(3)
        + big_n / 120.0 * c.powi(5) * l5coef * l.powi(5)
        + big_n / 5040.0 * c.powi(7) * l7coef * l.powi(7);

    let y = arc_length_of_meridian(phi)
        + t / 2.0 * big_n * c.powi(2) * l.powi(2)
        + t / 24.0 * big_n * c.powi(4) * l4coef * l.powi(4)
        + t / 720.0 * big_n * c.powi(6) * l6coef * l.powi(6)
        + t / 40320.0 * big_n * c.powi(8) * l8coef * l.powi(8);

    (x, y)
}

/// Inverse Transverse Mercator, returns `(phi, lambda)` in radians
fn map_xy_to_lat_lon(x: f64, y: f64, lambda0: f64) -> (f64, f64) {
    let phif = footpoint_latitude(y);
    let cf = phif.cos();
    let nuf2 = second_eccentricity_squared() * cf * cf;
    let nf = SEMI_MAJOR.powi(2) / (SEMI_MINOR * (1.0 + nuf2).sqrt());
    let tf = phif.tan();
    let tf2 = tf * tf;
    let tf4 = tf2 * tf2;

    // Fractional coefficients for x^k, denominators carry Nf^k
    let x1frac = 1.0 / (nf * cf);
    let x2frac = tf / (2.0 * nf.powi(2));
    let x3frac = 1.0 / (6.0 * nf.powi(3) * cf);
    let x4frac = tf / (24.0 * nf.powi(4));
    let x5frac = 1.0 / (120.0 * nf.powi(5) * cf);
    let x6frac = tf / (720.0 * nf.powi(6));
    let x7frac = 1.0 / (5040.0 * nf.powi(7) * cf);
    let x8frac = tf / (40320.0 * nf.powi(8));

    let x2poly = -1.0 - nuf2;
    let x3poly = -1.0 - 2.0 * tf2 - nuf2;
    let x4poly = 5.0 + 3.0 * tf2 + 6.0 * nuf2
        - 6.0 * tf2 * nuf2
        - 3.0 * nuf2 * nuf2
        - 9.0 * tf2 * nuf2 * nuf2;
    let x5poly = 5.0 + 28.0 * tf2 + 24.0 * tf4 + 6.0 * nuf2 + 8.0 * tf2 * nuf2;
    let x6poly = -61.0 - 90.0 * tf2 - 45.0 * tf4 - 107.0 * nuf2 + 162.0 * tf2 * nuf2;
    let x7poly = -61.0 - 662.0 * tf2 - 1320.0 * tf4 - 720.0 * tf4 * tf2;
    let x8poly = 1385.0 + 3633.0 * tf2 + 4095.0 * tf4 + 1575.0 * tf4 * tf2;

    let phi = phif
        + x2frac * x2poly * x.powi(2)
        + x4frac * x4poly * x.powi(4)
        + x6frac * x6poly * x.powi(6)
        + x8frac * x8poly * x.powi(8);

    let lambda = lambda0
        + x1frac * x
        + x3frac * x3poly * x.powi(3)
        + x5frac * x5poly * x.powi(5)
        + x7frac * x7poly * x.powi(7);

    (phi.clamp(-PI / 2.0, PI / 2.0), lambda)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zone_from_longitude() {
        assert_eq!(utm_zone_for(126.978), 52);
        assert_eq!(utm_zone_for(-180.0), 1);
        assert_eq!(utm_zone_for(180.0), 60);
        assert_eq!(utm_zone_for(3.0), 31);
    }

    #[test]
    fn seoul_matches_reference() {
        let utm = geodetic_to_utm(37.5665, 126.978, None).unwrap();
        assert_eq!(utm.zone, 52);
        assert!(!utm.south);
        assert_abs_diff_eq!(utm.x, 321_424.286, epsilon = 0.1);
        assert_abs_diff_eq!(utm.y, 4_159_640.641, epsilon = 0.1);
    }

    #[test]
    fn southern_hemisphere_uses_false_northing() {
        let utm = geodetic_to_utm(-33.8688, 151.2093, None).unwrap();
        assert_eq!(utm.zone, 56);
        assert!(utm.south);
        assert_abs_diff_eq!(utm.x, 334_368.634, epsilon = 0.1);
        assert_abs_diff_eq!(utm.y, 6_250_948.346, epsilon = 0.1);

        let (lat, lon) = utm.to_geodetic().unwrap();
        assert_abs_diff_eq!(lat, -33.8688, epsilon = 1e-9);
        assert_abs_diff_eq!(lon, 151.2093, epsilon = 1e-9);
    }

    #[test]
    fn forced_neighbouring_zone() {
        let utm = geodetic_to_utm(37.5665, 126.978, Some(51)).unwrap();
        assert_eq!(utm.zone, 51);
        assert_abs_diff_eq!(utm.x, 851_376.674, epsilon = 0.1);
        assert_abs_diff_eq!(utm.y, 4_165_162.711, epsilon = 0.1);
    }

    #[test]
    fn equator_on_central_meridian() {
        let utm = geodetic_to_utm(0.0, 3.0, None).unwrap();
        assert_abs_diff_eq!(utm.x, 500_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(utm.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn rejects_invalid_zones() {
        assert!(matches!(
            geodetic_to_utm(10.0, 10.0, Some(0)),
            Err(Error::InvalidZone(0))
        ));
        assert!(matches!(
            geodetic_to_utm(10.0, 10.0, Some(61)),
            Err(Error::InvalidZone(61))
        ));
        assert!(matches!(
            utm_to_geodetic(500_000.0, 0.0, -1, false),
            Err(Error::InvalidZone(-1))
        ));
    }
}
