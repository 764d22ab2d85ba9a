//! Combined metrics report.

use geo::Coord;
use serde::Serialize;
use tracing::debug;

use super::{centroid_displacement_m, spruill_score, MetricsError};
use crate::cluster::{compare_clusters, ClusterComparison, ClusterConfig};
use crate::masking::MaskingRun;
use crate::point::Point;

/// Metrics of one masking run.
///
/// Values are kept at full precision; use [`displacement_display`] and
/// [`privacy_rating`] for presentation.
///
/// [`displacement_display`]: MetricsReport::displacement_display
/// [`privacy_rating`]: MetricsReport::privacy_rating
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub masked_count: usize,
    pub unmaskable_count: usize,
    /// Mean center displacement in meters.
    pub centroid_displacement_m: f64,
    /// Spruill's measure in `[0, 100]`.
    pub privacy_score: f64,
    pub clusters: Option<ClusterComparison>,
}

impl MetricsReport {
    /// Compute all metrics for `run`, produced from `points`.
    ///
    /// Originals are every input point with a valid coordinate; masked
    /// points are compared against their own origin.
    pub fn compute(
        points: &[Point],
        run: &MaskingRun,
        clustering: Option<&ClusterConfig>,
    ) -> Result<Self, MetricsError> {
        if let Some(config) = clustering {
            config.validate()?;
        }

        let pairs: Vec<(Coord<f64>, Coord<f64>)> = run
            .pairs(points)
            .into_iter()
            .filter_map(|(origin, masked)| {
                origin.geographic().ok().map(|o| (o, masked.geographic))
            })
            .collect();
        if pairs.is_empty() {
            return Err(MetricsError::EmptyDataset);
        }

        let originals: Vec<Coord<f64>> = points
            .iter()
            .filter_map(|p| p.geographic().ok())
            .collect();
        let paired_originals: Vec<Coord<f64>> = pairs.iter().map(|(o, _)| *o).collect();
        let masked: Vec<Coord<f64>> = pairs.iter().map(|(_, m)| *m).collect();

        let centroid_displacement_m = centroid_displacement_m(&paired_originals, &masked)
            .ok_or(MetricsError::EmptyDataset)?;
        let privacy_score = spruill_score(&originals, &pairs).ok_or(MetricsError::EmptyDataset)?;
        let clusters = clustering.map(|config| compare_clusters(config, &originals, &masked));

        debug!(
            centroid_displacement_m,
            privacy_score,
            clusters = ?clusters,
            "Metrics computed"
        );

        Ok(Self {
            masked_count: run.masked.len(),
            unmaskable_count: run.unmaskable.len(),
            centroid_displacement_m,
            privacy_score,
            clusters,
        })
    }

    /// Centroid displacement rounded to centimeters.
    pub fn displacement_display(&self) -> f64 {
        (self.centroid_displacement_m * 100.0).round() / 100.0
    }

    /// Privacy score rounded to a whole number.
    pub fn privacy_rating(&self) -> u32 {
        self.privacy_score.round().clamp(0.0, 100.0) as u32
    }
}
