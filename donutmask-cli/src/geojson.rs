//! Minimal GeoJSON reading and writing.
//!
//! Only what the `mask` command needs: `Point` features in, `Polygon` and
//! `MultiPolygon` features for boundaries, `Point` features out.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use donutmask::coord::Crs;
use donutmask::masking::MaskingRun;
use donutmask::point::{Point, PointId};
use donutmask::region::RegionSet;

use crate::error::CliError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    FeatureCollection { features: Vec<Feature> },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Vec<f64>,
    },
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    fn name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
            Geometry::Unsupported => "an unsupported geometry",
        }
    }
}

fn read(path: &Path) -> Result<Vec<Feature>, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let GeoJson::FeatureCollection { features } = serde_json::from_reader(BufReader::new(file))
        .map_err(|source| CliError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(features)
}

fn invalid(path: &Path, message: String) -> CliError {
    CliError::GeoJson {
        path: path.to_path_buf(),
        message,
    }
}

fn position(raw: &[f64]) -> Option<Coord<f64>> {
    match raw {
        [x, y, ..] => Some(Coord { x: *x, y: *y }),
        _ => None,
    }
}

fn ring(raw: &[Vec<f64>]) -> Option<LineString<f64>> {
    raw.iter()
        .map(|p| position(p))
        .collect::<Option<Vec<_>>>()
        .map(LineString::from)
}

fn polygon(raw: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = raw.split_first()?;
    let interiors = interiors.iter().map(|r| ring(r)).collect::<Option<Vec<_>>>()?;
    Some(Polygon::new(ring(exterior)?, interiors))
}

/// Feature identifier: the feature `id`, else an `id` property, else
/// `feature-<index>`.
fn feature_id(feature: &Feature, index: usize) -> PointId {
    let from_value = |value: &Value| match value {
        Value::String(s) => Some(PointId::new(s.clone())),
        Value::Number(n) => Some(PointId::new(n.to_string())),
        _ => None,
    };
    feature
        .id
        .as_ref()
        .and_then(from_value)
        .or_else(|| {
            feature
                .properties
                .as_ref()
                .and_then(|p| p.get("id"))
                .and_then(from_value)
        })
        .unwrap_or_else(|| PointId::new(format!("feature-{}", index)))
}

/// Read `Point` features from `path`, with coordinates in `crs`.
///
/// Two features with the same identifier are rejected, naming both indices.
pub fn read_points(path: &Path, crs: Crs) -> Result<Vec<Point>, CliError> {
    let points = read(path)?
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let coord = match &feature.geometry {
                Some(Geometry::Point { coordinates }) => position(coordinates).ok_or_else(|| {
                    invalid(path, format!("feature {} has an incomplete position", index))
                })?,
                Some(other) => {
                    return Err(invalid(
                        path,
                        format!("feature {} is {}, expected a Point", index, other.name()),
                    ))
                }
                None => return Err(invalid(path, format!("feature {} has no geometry", index))),
            };
            let id = feature_id(&feature, index);
            Ok(Point::new(id, coord, crs).with_properties(feature.properties.unwrap_or_default()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashMap::with_capacity(points.len());
    for (index, point) in points.iter().enumerate() {
        if let Some(first) = seen.insert(point.id(), index) {
            return Err(invalid(
                path,
                format!(
                    "feature {} reuses identifier '{}' of feature {}",
                    index,
                    point.id(),
                    first
                ),
            ));
        }
    }
    Ok(points)
}

/// Read `Polygon`/`MultiPolygon` features from `path` as regions in `crs`.
///
/// Regions are numbered in file order.
pub fn read_regions(path: &Path, crs: Crs) -> Result<RegionSet, CliError> {
    let geometries = read(path)?
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let malformed = || invalid(path, format!("feature {} has a malformed polygon", index));
            match feature.geometry {
                Some(Geometry::Polygon { coordinates }) => polygon(&coordinates)
                    .map(MultiPolygon::from)
                    .ok_or_else(malformed),
                Some(Geometry::MultiPolygon { coordinates }) => coordinates
                    .iter()
                    .map(|p| polygon(p))
                    .collect::<Option<Vec<_>>>()
                    .map(MultiPolygon::new)
                    .ok_or_else(malformed),
                Some(other) => Err(invalid(
                    path,
                    format!("feature {} is {}, expected a polygon", index, other.name()),
                )),
                None => Err(invalid(path, format!("feature {} has no geometry", index))),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RegionSet::from_geometries(geometries, crs)?)
}

/// Build the masked feature collection in display coordinates.
///
/// Each feature keeps its origin's identifier and properties; offsets are
/// never written.
pub fn masked_collection(points: &[Point], run: &MaskingRun) -> GeoJson {
    let features = run
        .pairs(points)
        .into_iter()
        .map(|(origin, masked)| Feature {
            id: Some(Value::String(origin.id().to_string())),
            geometry: Some(Geometry::Point {
                coordinates: vec![masked.display_coord.x, masked.display_coord.y],
            }),
            properties: Some(origin.properties().clone()),
        })
        .collect();
    GeoJson::FeatureCollection { features }
}

/// Write `value` as pretty JSON to `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    let io_error = |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.write_all(b"\n").map_err(io_error)?;
    writer.flush().map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use donutmask::masking::{MaskingConfig, MaskingEngine};
    use donutmask::region::RegionLocator;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_points_with_ids() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "points.geojson",
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","id":"a","geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":{"case":1}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[3.0,4.0,10.0]},"properties":{"id":7}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[5.0,6.0]},"properties":null}
            ]}"#,
        );

        let points = read_points(&path, Crs::Wgs84).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].id().as_str(), "a");
        assert_eq!(points[0].properties()["case"], 1);
        assert_eq!(points[1].id().as_str(), "7");
        assert_eq!(points[1].coord(), Coord { x: 3.0, y: 4.0 });
        assert_eq!(points[2].id().as_str(), "feature-2");
    }

    #[test]
    fn test_fallback_id_does_not_collide_with_explicit_id() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "points.geojson",
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":{"id":1}},
                {"type":"Feature","geometry":{"type":"Point","coordinates":[3.0,4.0]},"properties":{}}
            ]}"#,
        );

        let points = read_points(&path, Crs::Wgs84).unwrap();
        assert_eq!(points[0].id().as_str(), "1");
        assert_eq!(points[1].id().as_str(), "feature-1");
    }

    #[test]
    fn test_repeated_id_names_both_features() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "points.geojson",
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","id":"a","geometry":{"type":"Point","coordinates":[1.0,2.0]}},
                {"type":"Feature","id":"b","geometry":{"type":"Point","coordinates":[3.0,4.0]}},
                {"type":"Feature","id":"a","geometry":{"type":"Point","coordinates":[5.0,6.0]}}
            ]}"#,
        );

        match read_points(&path, Crs::Wgs84).unwrap_err() {
            CliError::GeoJson { message, .. } => {
                assert_eq!(message, "feature 2 reuses identifier 'a' of feature 0")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_point_feature_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "lines.geojson",
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]},"properties":{}}
            ]}"#,
        );
        let err = read_points(&path, Crs::Wgs84).unwrap_err();
        assert!(matches!(err, CliError::GeoJson { .. }));
    }

    #[test]
    fn test_read_regions() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "regions.geojson",
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]},"properties":{}},
                {"type":"Feature","geometry":{"type":"MultiPolygon","coordinates":[[[[2,0],[3,0],[3,1],[2,1],[2,0]]]]},"properties":{}}
            ]}"#,
        );
        let regions = read_regions(&path, Crs::Wgs84).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(
            regions.locate(Coord { x: 2.5, y: 0.5 }).map(|r| r.index()),
            Some(1)
        );
    }

    #[test]
    fn test_masked_collection_roundtrip() {
        let dir = TempDir::new().unwrap();
        let points = vec![Point::wgs84("x", 10.0, 10.0), Point::wgs84("y", 10.1, 10.1)];
        let run = MaskingEngine::new(MaskingConfig::new(10.0, 20.0).with_seed(1))
            .unwrap()
            .mask(&points)
            .unwrap();

        let path = dir.path().join("masked.geojson");
        write_json(&path, &masked_collection(&points, &run)).unwrap();
        let masked = read_points(&path, Crs::Wgs84).unwrap();

        assert_eq!(masked.len(), 2);
        assert_eq!(masked[0].id().as_str(), "x");
        assert_eq!(masked[0].coord(), run.masked[0].display_coord);
    }
}
