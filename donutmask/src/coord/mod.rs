//! Coordinate handling and spherical geodesy.
//!
//! Coordinates are `geo::Coord<f64>` values. In geographic form `x` is the
//! longitude and `y` the latitude, both in degrees (WGS84, EPSG:4326).
//! Projected coordinates carry their own [`Crs`] and are converted to
//! geographic form before any distance or translation is computed.
//!
//! Distances and translations are `geo`'s haversine algorithms on a sphere
//! of radius [`EARTH_RADIUS_M`]. For `d` up to [`MAX_TRANSLATION_M`],
//! translating a coordinate by `d` meters and measuring the haversine
//! distance back yields `d` up to floating-point rounding.

mod crs;
mod types;

pub use crs::Crs;
pub use types::{
    CoordError, EARTH_RADIUS_M, MAX_LAT, MAX_LON, MAX_TRANSLATION_M, MERCATOR_MAX_LAT, MIN_LAT,
    MIN_LON, WEB_MERCATOR_RADIUS_M,
};

use geo::{Coord, HaversineDestination, HaversineDistance, Point};

/// Validates a geographic coordinate (lon/lat in degrees).
#[inline]
pub fn validate_geographic(coord: Coord<f64>) -> Result<Coord<f64>, CoordError> {
    if !coord.x.is_finite() || !coord.y.is_finite() {
        return Err(CoordError::NonFinite {
            x: coord.x,
            y: coord.y,
        });
    }
    if !(MIN_LAT..=MAX_LAT).contains(&coord.y) {
        return Err(CoordError::InvalidLatitude(coord.y));
    }
    if !(MIN_LON..=MAX_LON).contains(&coord.x) {
        return Err(CoordError::InvalidLongitude(coord.x));
    }
    Ok(coord)
}

/// Great-circle distance in meters between two geographic coordinates.
#[inline]
pub fn haversine_distance_m(a: Coord<f64>, b: Coord<f64>) -> f64 {
    // Rounding near antipodal pairs can turn the arcsine into NaN
    Point::from(a)
        .haversine_distance(&Point::from(b))
        .min(MAX_TRANSLATION_M)
}

/// Translates a geographic coordinate along a great circle.
///
/// # Arguments
///
/// * `origin` - Starting coordinate (lon/lat degrees)
/// * `distance_m` - Distance to travel in meters
/// * `bearing_deg` - Initial bearing in degrees clockwise from north
///
/// A zero distance returns `origin` unchanged, bit for bit. Distances above
/// [`MAX_TRANSLATION_M`] wrap past the antipode and land closer to `origin`
/// than requested.
#[inline]
pub fn destination(origin: Coord<f64>, distance_m: f64, bearing_deg: f64) -> Coord<f64> {
    if distance_m == 0.0 {
        return origin;
    }
    Point::from(origin)
        .haversine_destination(bearing_deg, distance_m)
        .into()
}
