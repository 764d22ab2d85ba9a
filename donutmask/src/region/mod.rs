//! Boundary regions and point-in-polygon lookup.
//!
//! When a boundary layer is supplied, a masked point must land in the same
//! region as its origin. Regions are numbered `0..n-1` in the order they are
//! loaded, and [`RegionLocator::locate`] answers which region (if any)
//! contains a geographic coordinate.
//!
//! Boundaries count as inside. Where regions overlap, the lowest identifier
//! wins, so every coordinate has at most one answer.

use std::fmt;

use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{BoundingRect, Coord, LineString, MapCoords, MultiPolygon, Polygon, Rect};
use serde::Serialize;
use thiserror::Error;

use crate::coord::{self, CoordError, Crs};

/// Identifier of a region, assigned sequentially at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RegionId(usize);

impl RegionId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised while loading regions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    /// A vertex could not be converted to WGS84.
    #[error("Region {index} has an invalid vertex: {source}")]
    InvalidVertex { index: usize, source: CoordError },
}

/// Resolves which region contains a coordinate.
///
/// Implementations must be shareable across worker threads; the masking
/// engine queries them concurrently in parallel mode.
pub trait RegionLocator: Send + Sync {
    /// Region containing `position` (WGS84 lon/lat), or `None` when the
    /// coordinate lies outside every region.
    fn locate(&self, position: Coord<f64>) -> Option<RegionId>;
}

/// A boundary polygon held in WGS84.
#[derive(Debug, Clone)]
pub struct Region {
    id: RegionId,
    geometry: MultiPolygon<f64>,
    bounds: Option<Rect<f64>>,
}

impl Region {
    fn new(id: RegionId, geometry: MultiPolygon<f64>) -> Self {
        let bounds = geometry.bounding_rect();
        Self {
            id,
            geometry,
            bounds,
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// True if `position` is inside or on the boundary of this region.
    pub fn contains(&self, position: Coord<f64>) -> bool {
        let Some(bounds) = self.bounds else {
            return false;
        };
        let (min, max) = (bounds.min(), bounds.max());
        if position.x < min.x || position.x > max.x || position.y < min.y || position.y > max.y {
            return false;
        }
        self.geometry.coordinate_position(&position) != CoordPos::Outside
    }
}

/// An immutable, sequentially numbered set of regions.
#[derive(Debug, Clone, Default)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    /// Load regions expressed in `crs`, numbering them in iteration order.
    ///
    /// Geometries are converted to WGS84 once, here.
    pub fn from_geometries<I, G>(geometries: I, crs: Crs) -> Result<Self, RegionError>
    where
        I: IntoIterator<Item = G>,
        G: Into<MultiPolygon<f64>>,
    {
        let regions = geometries
            .into_iter()
            .enumerate()
            .map(|(index, geometry)| {
                let geometry: MultiPolygon<f64> = geometry.into();
                let geographic = geometry
                    .try_map_coords(move |c| crs.to_geographic(c))
                    .map_err(|source| RegionError::InvalidVertex { index, source })?;
                Ok(Region::new(RegionId::new(index), geographic))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }
}

impl RegionLocator for RegionSet {
    fn locate(&self, position: Coord<f64>) -> Option<RegionId> {
        self.regions
            .iter()
            .find(|region| region.contains(position))
            .map(Region::id)
    }
}

/// Approximate a circle of `radius_m` meters around a geographic center.
///
/// Useful for building buffer-style boundaries; `segments` is clamped to at
/// least 3.
pub fn circle(center: Coord<f64>, radius_m: f64, segments: usize) -> Polygon<f64> {
    let segments = segments.max(3);
    let mut ring: Vec<Coord<f64>> = (0..segments)
        .map(|i| {
            let bearing = 360.0 * i as f64 / segments as f64;
            coord::destination(center, radius_m, bearing)
        })
        .collect();
    ring.push(ring[0]);
    Polygon::new(LineString::from(ring), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn unit_squares() -> RegionSet {
        let west = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        let east = polygon![
            (x: 1.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 1.0),
            (x: 1.0, y: 1.0),
            (x: 1.0, y: 0.0),
        ];
        RegionSet::from_geometries(vec![west, east], Crs::Wgs84).unwrap()
    }

    #[test]
    fn test_ids_assigned_sequentially() {
        let regions = unit_squares();
        let ids: Vec<_> = regions.iter().map(|r| r.id().index()).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(regions.len(), 2);
    }

    #[test]
    fn test_locate_interior_points() {
        let regions = unit_squares();
        assert_eq!(
            regions.locate(Coord { x: 0.5, y: 0.5 }),
            Some(RegionId::new(0))
        );
        assert_eq!(
            regions.locate(Coord { x: 1.5, y: 0.5 }),
            Some(RegionId::new(1))
        );
    }

    #[test]
    fn test_locate_outside_returns_none() {
        let regions = unit_squares();
        assert_eq!(regions.locate(Coord { x: 5.0, y: 5.0 }), None);
        assert_eq!(regions.locate(Coord { x: 0.5, y: -0.1 }), None);
    }

    #[test]
    fn test_shared_boundary_resolves_to_lowest_id() {
        let regions = unit_squares();
        assert_eq!(
            regions.locate(Coord { x: 1.0, y: 0.5 }),
            Some(RegionId::new(0))
        );
    }

    #[test]
    fn test_mercator_regions_converted() {
        // ~1 km square around the origin, in Web Mercator meters
        let square = polygon![
            (x: -500.0, y: -500.0),
            (x: 500.0, y: -500.0),
            (x: 500.0, y: 500.0),
            (x: -500.0, y: 500.0),
            (x: -500.0, y: -500.0),
        ];
        let regions = RegionSet::from_geometries(vec![square], Crs::WebMercator).unwrap();
        assert_eq!(
            regions.locate(Coord { x: 0.0, y: 0.0 }),
            Some(RegionId::new(0))
        );
        assert_eq!(regions.locate(Coord { x: 0.01, y: 0.0 }), None);
    }

    #[test]
    fn test_invalid_vertex_reported() {
        let bad = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 95.0),
            (x: 1.0, y: 0.0),
            (x: 0.0, y: 0.0),
        ];
        let result = RegionSet::from_geometries(vec![bad], Crs::Wgs84);
        assert!(matches!(
            result,
            Err(RegionError::InvalidVertex { index: 0, .. })
        ));
    }

    #[test]
    fn test_circle_contains_center_not_outside() {
        let center = Coord { x: 10.0, y: 50.0 };
        let regions = RegionSet::from_geometries(vec![circle(center, 50.0, 32)], Crs::Wgs84)
            .unwrap();
        assert!(regions.locate(center).is_some());
        assert!(regions
            .locate(coord::destination(center, 100.0, 45.0))
            .is_none());
    }
}
