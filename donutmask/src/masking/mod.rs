//! Donut masking of point locations.
//!
//! Each input point is moved to a random location at least
//! `min_distance_m` and at most `max_distance_m` away from where it was,
//! uniformly over the area of that ring. When a region layer is supplied
//! the masked point must also land in the same region as its origin;
//! rejected draws are retried up to `max_attempts_per_point` times.
//!
//! # Architecture
//!
//! ```text
//! Point ──► OffsetSampler ──► coord::destination ──► RegionLocator ──► MaskedPoint
//!              ▲                                         │ rejected
//!              └─────────────────────────────────────────┘
//! ```
//!
//! A run never fails because of a single point. Points that cannot be
//! masked are reported in [`MaskingRun::unmaskable`] with a reason.

mod config;
mod engine;
mod error;
mod types;

pub use config::{
    ExecutionMode, MaskingConfig, DEFAULT_MAX_ATTEMPTS_PER_POINT, DEFAULT_MAX_DISTANCE_M,
    DEFAULT_MIN_DISTANCE_M,
};
pub use engine::MaskingEngine;
pub use error::MaskingError;
pub use types::{MaskedPoint, MaskingRun, UnmaskablePoint, UnmaskableReason};
