//! Coordinate reference systems supported by the masking pipeline.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use geo::Coord;
use serde::{Deserialize, Serialize};

use super::types::{CoordError, MERCATOR_MAX_LAT, WEB_MERCATOR_RADIUS_M};
use super::validate_geographic;

/// A coordinate reference system.
///
/// Geodesy always happens in [`Crs::Wgs84`]; other systems are converted on
/// the way in and out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Crs {
    /// Geographic WGS84 longitude/latitude in degrees (EPSG:4326).
    #[default]
    Wgs84,
    /// Spherical Web Mercator easting/northing in meters (EPSG:3857).
    WebMercator,
}

impl Crs {
    /// EPSG code of this CRS.
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::WebMercator => 3857,
        }
    }

    /// Look up a CRS by EPSG code.
    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            4326 => Some(Crs::Wgs84),
            3857 | 900913 => Some(Crs::WebMercator),
            _ => None,
        }
    }

    /// Convert a coordinate in this CRS to geographic WGS84.
    pub fn to_geographic(&self, coord: Coord<f64>) -> Result<Coord<f64>, CoordError> {
        match self {
            Crs::Wgs84 => validate_geographic(coord),
            Crs::WebMercator => {
                if !coord.x.is_finite() || !coord.y.is_finite() {
                    return Err(CoordError::NonFinite {
                        x: coord.x,
                        y: coord.y,
                    });
                }
                let lon = (coord.x / WEB_MERCATOR_RADIUS_M).to_degrees();
                let lat =
                    (2.0 * (coord.y / WEB_MERCATOR_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
                validate_geographic(Coord { x: lon, y: lat })
            }
        }
    }

    /// Project a geographic WGS84 coordinate into this CRS.
    pub fn project(&self, coord: Coord<f64>) -> Result<Coord<f64>, CoordError> {
        let coord = validate_geographic(coord)?;
        match self {
            Crs::Wgs84 => Ok(coord),
            Crs::WebMercator => {
                if coord.y.abs() > MERCATOR_MAX_LAT {
                    return Err(CoordError::OutsideMercatorBounds(coord.y));
                }
                let x = WEB_MERCATOR_RADIUS_M * coord.x.to_radians();
                let y = WEB_MERCATOR_RADIUS_M * (PI / 4.0 + coord.y.to_radians() / 2.0).tan().ln();
                Ok(Coord { x, y })
            }
        }
    }

    /// Reproject a coordinate from this CRS into `target`.
    pub fn reproject(&self, coord: Coord<f64>, target: Crs) -> Result<Coord<f64>, CoordError> {
        if *self == target {
            return Ok(coord);
        }
        target.project(self.to_geographic(coord)?)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = String;

    /// Accepts `wgs84`, `web-mercator`, or an `EPSG:<code>` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "wgs84" | "wgs-84" => return Ok(Crs::Wgs84),
            "web-mercator" | "webmercator" | "mercator" => return Ok(Crs::WebMercator),
            _ => {}
        }

        lower
            .strip_prefix("epsg:")
            .and_then(|code| code.parse::<u32>().ok())
            .and_then(Crs::from_epsg)
            .ok_or_else(|| format!("Unsupported CRS '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wgs84_is_identity() {
        let c = Coord {
            x: -0.1278,
            y: 51.5074,
        };
        assert_eq!(Crs::Wgs84.to_geographic(c).unwrap(), c);
        assert_eq!(Crs::Wgs84.project(c).unwrap(), c);
    }

    #[test]
    fn test_web_mercator_origin() {
        let m = Crs::WebMercator
            .project(Coord { x: 0.0, y: 0.0 })
            .unwrap();
        assert!(m.x.abs() < 1e-9);
        assert!(m.y.abs() < 1e-9);
    }

    #[test]
    fn test_web_mercator_known_value() {
        // 180°E maps to half the equatorial circumference
        let m = Crs::WebMercator
            .project(Coord { x: 180.0, y: 0.0 })
            .unwrap();
        assert!((m.x - 20_037_508.342_789_244).abs() < 1e-6);
    }

    #[test]
    fn test_web_mercator_rejects_polar_latitude() {
        let result = Crs::WebMercator.project(Coord { x: 0.0, y: 89.0 });
        assert!(matches!(result, Err(CoordError::OutsideMercatorBounds(_))));
    }

    #[test]
    fn test_reproject_roundtrip() {
        let c = Coord {
            x: 2.3522,
            y: 48.8566,
        };
        let m = Crs::Wgs84.reproject(c, Crs::WebMercator).unwrap();
        let back = Crs::WebMercator.reproject(m, Crs::Wgs84).unwrap();
        assert!((back.x - c.x).abs() < 1e-9);
        assert!((back.y - c.y).abs() < 1e-9);
    }

    #[test]
    fn test_parse_crs() {
        assert_eq!("wgs84".parse::<Crs>().unwrap(), Crs::Wgs84);
        assert_eq!("EPSG:4326".parse::<Crs>().unwrap(), Crs::Wgs84);
        assert_eq!("epsg:3857".parse::<Crs>().unwrap(), Crs::WebMercator);
        assert_eq!("web-mercator".parse::<Crs>().unwrap(), Crs::WebMercator);
        assert!("EPSG:32633".parse::<Crs>().is_err());
    }

    #[test]
    fn test_display_uses_epsg() {
        assert_eq!(Crs::WebMercator.to_string(), "EPSG:3857");
    }
}
