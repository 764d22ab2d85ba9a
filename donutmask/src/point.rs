//! Sensitive input points.

use std::fmt;

use geo::Coord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coord::{CoordError, Crs};

/// Open key/value attributes carried by a point.
pub type Properties = Map<String, Value>;

/// Identifier of an input point, unique within a point set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(String);

impl PointId {
    /// Create an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PointId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PointId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for PointId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// A sensitive location.
///
/// Points are never modified by masking; masked output refers back to its
/// origin through [`PointId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    id: PointId,
    coord: Coord<f64>,
    crs: Crs,
    #[serde(default)]
    properties: Properties,
}

impl Point {
    /// Create a point in the given CRS with no properties.
    pub fn new(id: impl Into<PointId>, coord: Coord<f64>, crs: Crs) -> Self {
        Self {
            id: id.into(),
            coord,
            crs,
            properties: Properties::new(),
        }
    }

    /// Create a WGS84 point from longitude and latitude in degrees.
    pub fn wgs84(id: impl Into<PointId>, lon: f64, lat: f64) -> Self {
        Self::new(id, Coord { x: lon, y: lat }, Crs::Wgs84)
    }

    /// Attach properties.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn id(&self) -> &PointId {
        &self.id
    }

    /// Coordinate in the point's own CRS.
    pub fn coord(&self) -> Coord<f64> {
        self.coord
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Coordinate as WGS84 longitude/latitude.
    pub fn geographic(&self) -> Result<Coord<f64>, CoordError> {
        self.crs.to_geographic(self.coord)
    }
}
