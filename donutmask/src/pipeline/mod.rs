//! Mask-then-measure in one call.
//!
//! [`Analysis`] runs the masking engine and computes the metrics report for
//! the result, which is what both the CLI and most library users want.

use thiserror::Error;
use tracing::warn;

use crate::cluster::ClusterConfig;
use crate::masking::{MaskingEngine, MaskingError, MaskingRun};
use crate::metrics::{MetricsError, MetricsReport};
use crate::point::Point;

/// Errors from [`Analysis::run`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Masking(#[from] MaskingError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// A masking run and its metrics.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub run: MaskingRun,
    /// `None` when no point could be masked.
    pub report: Option<MetricsReport>,
}

/// Masking engine plus optional cluster analysis.
#[derive(Debug)]
pub struct Analysis {
    engine: MaskingEngine,
    clustering: Option<ClusterConfig>,
}

impl Analysis {
    pub fn new(engine: MaskingEngine) -> Self {
        Self {
            engine,
            clustering: None,
        }
    }

    /// Compare cluster counts before and after masking.
    pub fn with_clustering(mut self, config: ClusterConfig) -> Result<Self, AnalysisError> {
        config.validate().map_err(MetricsError::from)?;
        self.clustering = Some(config);
        Ok(self)
    }

    pub fn engine(&self) -> &MaskingEngine {
        &self.engine
    }

    /// Mask `points` and measure the result.
    pub fn run(&self, points: &[Point]) -> Result<AnalysisOutcome, AnalysisError> {
        let run = self.engine.mask(points)?;
        let report = match MetricsReport::compute(points, &run, self.clustering.as_ref()) {
            Ok(report) => Some(report),
            Err(MetricsError::EmptyDataset) => {
                warn!(
                    unmaskable = run.unmaskable.len(),
                    "No points were masked, skipping metrics"
                );
                None
            }
            Err(e) => return Err(e.into()),
        };
        Ok(AnalysisOutcome { run, report })
    }
}
