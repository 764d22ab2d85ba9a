//! DonutMask - geographic masking of sensitive point locations
//!
//! Moves every point of a sensitive dataset to a random location within a
//! ring ("donut") around its true position, optionally keeping it inside
//! the same administrative region, and measures how much privacy and
//! spatial pattern the masked dataset retains.
//!
//! # Modules
//!
//! - [`coord`]: geodesy and coordinate reference systems
//! - [`sampler`]: area-uniform random offsets
//! - [`region`]: boundary polygons and point-in-region lookup
//! - [`masking`]: the masking engine
//! - [`metrics`]: centroid displacement and Spruill's measure
//! - [`cluster`]: DBSCAN cluster comparison
//! - [`config`]: INI settings file
//! - [`telemetry`]: run counters
//! - [`pipeline`]: masking and metrics in one call

pub mod cluster;
pub mod config;
pub mod coord;
pub mod masking;
pub mod metrics;
pub mod pipeline;
pub mod point;
pub mod region;
pub mod sampler;
pub mod telemetry;

pub use masking::{MaskingConfig, MaskingEngine, MaskingError, MaskingRun};
pub use pipeline::{Analysis, AnalysisError, AnalysisOutcome};
pub use point::{Point, PointId};
