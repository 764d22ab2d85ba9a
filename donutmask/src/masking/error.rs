//! Run-level masking errors.
//!
//! Per-point failures are not errors; they are reported through
//! [`UnmaskablePoint`](super::UnmaskablePoint) in the run result.

use rand::rand_core::OsError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::point::PointId;

/// Errors that abort a whole masking run.
#[derive(Debug, Error)]
pub enum MaskingError {
    /// The configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// Two input points share an identifier.
    #[error("Duplicate point identifier: {0}")]
    DuplicatePointId(PointId),

    /// The offset sampler hit its iteration cap.
    ///
    /// Indicates a broken random generator; no partial result is returned
    /// because its offsets cannot be trusted.
    #[error("Offset sampling exhausted after {iterations} iterations while masking point {point}")]
    SamplingExhausted { point: PointId, iterations: u32 },

    /// The operating system entropy source failed.
    #[error("Entropy source unavailable: {0}")]
    EntropyUnavailable(#[from] OsError),
}
