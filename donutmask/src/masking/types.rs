//! Masking run results.

use std::collections::HashMap;

use geo::Coord;
use serde::Serialize;
use thiserror::Error;

use crate::coord::{CoordError, Crs};
use crate::point::{Point, PointId};
use crate::region::RegionId;
use crate::sampler::Offset;
use crate::telemetry::RunStats;

/// The masked counterpart of one input point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskedPoint {
    /// Identifier of the originating point.
    pub origin: PointId,

    /// The offset that produced this location.
    pub offset: Offset,

    /// Masked location in the origin's CRS.
    pub coord: Coord<f64>,

    /// CRS of `coord` (same as the origin point).
    pub crs: Crs,

    /// Masked location as WGS84 lon/lat.
    pub geographic: Coord<f64>,

    /// Masked location in the display CRS.
    pub display_coord: Coord<f64>,

    /// CRS of `display_coord`.
    pub display_crs: Crs,

    /// Region shared with the origin, when boundaries are enforced.
    pub region: Option<RegionId>,

    /// Draws consumed, including the accepted one.
    pub attempts: u32,
}

/// Why a point has no masked counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum UnmaskableReason {
    /// Every draw was rejected (left the origin region or could not be projected).
    #[error("no acceptable draw after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// The origin itself lies outside every region.
    #[error("origin lies outside every region")]
    OriginOutsideRegions,

    /// The origin coordinate is invalid in its CRS.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(CoordError),

    /// The run was cancelled before the point finished.
    #[error("run cancelled")]
    Cancelled,

    /// The run's wall-clock budget ran out before the point finished.
    #[error("run time budget exceeded")]
    RunBudgetExceeded,
}

/// A point the engine gave up on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmaskablePoint {
    pub id: PointId,
    pub reason: UnmaskableReason,
}

/// Everything produced by one masking run.
///
/// Masked points appear in input order. Each input point ends up in exactly
/// one of `masked` or `unmaskable`.
#[derive(Debug, Clone, Serialize)]
pub struct MaskingRun {
    pub masked: Vec<MaskedPoint>,
    pub unmaskable: Vec<UnmaskablePoint>,
    pub stats: RunStats,
    /// Whether the run was cancelled while in progress.
    pub cancelled: bool,
}

impl MaskingRun {
    /// True when every input point was masked.
    pub fn is_complete(&self) -> bool {
        self.unmaskable.is_empty()
    }

    /// Pair each masked point with its origin from `points`.
    ///
    /// Masked points whose origin is not in `points` are skipped.
    pub fn pairs<'a>(&'a self, points: &'a [Point]) -> Vec<(&'a Point, &'a MaskedPoint)> {
        let by_id: HashMap<&PointId, &Point> = points.iter().map(|p| (p.id(), p)).collect();
        self.masked
            .iter()
            .filter_map(|masked| by_id.get(&masked.origin).map(|origin| (*origin, masked)))
            .collect()
    }
}
