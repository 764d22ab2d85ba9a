//! Cluster analysis before and after masking.
//!
//! Both the original and the masked point sets are clustered with DBSCAN
//! using the same bandwidth; the change in cluster count shows how much
//! spatial pattern the masking destroyed or invented.

mod dbscan;

pub use dbscan::{ClusterLabel, Clustering, Dbscan};

use geo::Coord;
use serde::Serialize;

use crate::config::ConfigError;

/// Default minimum neighbourhood size of a core point.
pub const DEFAULT_MIN_POINTS: usize = 3;

/// Clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterConfig {
    /// DBSCAN neighbourhood radius in meters.
    pub bandwidth_m: f64,
    /// Minimum neighbourhood size, the point itself included.
    pub min_points: usize,
}

impl ClusterConfig {
    pub fn new(bandwidth_m: f64) -> Self {
        Self {
            bandwidth_m,
            min_points: DEFAULT_MIN_POINTS,
        }
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.bandwidth_m.is_finite() || self.bandwidth_m <= 0.0 {
            return Err(ConfigError::InvalidBandwidth(self.bandwidth_m));
        }
        if self.min_points == 0 {
            return Err(ConfigError::ZeroLimit("min_points"));
        }
        Ok(())
    }
}

/// Cluster counts of the original and masked sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClusterComparison {
    pub before: u32,
    pub after: u32,
    /// `after - before`; negative when clusters were lost.
    pub delta: i64,
}

/// Cluster both sets and compare their cluster counts.
pub fn compare_clusters(
    config: &ClusterConfig,
    originals: &[Coord<f64>],
    masked: &[Coord<f64>],
) -> ClusterComparison {
    let dbscan = Dbscan::new(config.bandwidth_m, config.min_points);
    let before = dbscan.run(originals).cluster_count;
    let after = dbscan.run(masked).cluster_count;
    ClusterComparison {
        before,
        after,
        delta: i64::from(after) - i64::from(before),
    }
}
