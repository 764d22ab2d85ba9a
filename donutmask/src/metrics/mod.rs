//! Privacy and utility metrics of a masking run.
//!
//! - **Centroid displacement**: how far the mean center moved.
//! - **Spruill's measure**: share of masked points whose nearest original
//!   is not their own origin (0 = all re-identifiable, 100 = none).
//! - **Cluster comparison**: DBSCAN cluster counts before and after, when a
//!   [`ClusterConfig`](crate::cluster::ClusterConfig) is given.

mod centroid;
mod privacy;
mod report;

pub use centroid::{centroid_displacement_m, mean_center};
pub use privacy::{spruill_score, REIDENTIFICATION_TOLERANCE_M};
pub use report::MetricsReport;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors computing metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// No masked points to measure.
    #[error("No masked points to compute metrics from")]
    EmptyDataset,

    /// Cluster parameters failed validation.
    #[error("Invalid cluster configuration: {0}")]
    InvalidClusterConfig(#[from] ConfigError),
}
