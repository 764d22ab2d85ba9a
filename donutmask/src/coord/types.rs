//! Coordinate constants and error types.

use serde::Serialize;
use thiserror::Error;

/// Mean earth radius in meters (IUGG), used for all spherical geodesy.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Longest great-circle translation in meters: half the circumference.
pub const MAX_TRANSLATION_M: f64 = std::f64::consts::PI * EARTH_RADIUS_M;

/// Sphere radius used by the Web Mercator projection (EPSG:3857).
pub const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Minimum geographic latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum geographic latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum geographic longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum geographic longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Latitude limit of the Web Mercator projection in degrees.
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_78;

/// Errors that can occur when validating or converting coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Error)]
pub enum CoordError {
    /// Latitude outside `[-90, 90]`.
    #[error("Invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    /// Longitude outside `[-180, 180]`.
    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    /// One of the components is NaN or infinite.
    #[error("Coordinate is not finite: ({x}, {y})")]
    NonFinite { x: f64, y: f64 },

    /// Latitude cannot be represented in Web Mercator.
    #[error("Latitude {0} is outside the Web Mercator bounds (±85.0511)")]
    OutsideMercatorBounds(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_error_display() {
        assert_eq!(
            CoordError::InvalidLatitude(91.0).to_string(),
            "Invalid latitude: 91 (must be between -90 and 90)"
        );
        assert!(CoordError::OutsideMercatorBounds(88.0)
            .to_string()
            .contains("Web Mercator"));
    }
}
