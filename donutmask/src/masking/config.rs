//! Masking configuration.

use std::time::Duration;

use crate::config::{validate_distance, ConfigError};
use crate::coord::{Crs, MAX_TRANSLATION_M};
use crate::sampler::{RandomSource, DEFAULT_MAX_SAMPLING_ITERATIONS};

/// Default inner radius of the donut in meters.
pub const DEFAULT_MIN_DISTANCE_M: f64 = 100.0;

/// Default outer radius of the donut in meters.
pub const DEFAULT_MAX_DISTANCE_M: f64 = 1_000.0;

/// Default number of draws a point may consume before it is given up on.
///
/// Only reachable with boundary enforcement, when the donut rarely or never
/// overlaps the origin's region.
pub const DEFAULT_MAX_ATTEMPTS_PER_POINT: u32 = 1_000;

/// How points are distributed over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// One point after another on the calling thread.
    #[default]
    Sequential,
    /// Points spread over the rayon thread pool.
    Parallel,
}

/// Configuration of a masking run.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskingConfig {
    /// Inner radius of the donut in meters.
    pub min_distance_m: f64,

    /// Outer radius of the donut in meters.
    pub max_distance_m: f64,

    /// Draws allowed per point before it is reported as unmaskable.
    pub max_attempts_per_point: u32,

    /// Rejection-sampling cap for a single distance draw.
    pub max_sampling_iterations: u32,

    /// Sequential or parallel execution.
    pub execution: ExecutionMode,

    /// Entropy source for the run seed.
    pub random_source: RandomSource,

    /// Wall-clock budget for the whole run.
    ///
    /// Points not finished when it runs out are reported as unmaskable.
    pub run_time_budget: Option<Duration>,

    /// CRS of the display coordinates attached to every masked point.
    pub display_crs: Crs,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DISTANCE_M, DEFAULT_MAX_DISTANCE_M)
    }
}

impl MaskingConfig {
    /// Create a config for the given donut radii with default limits.
    pub fn new(min_distance_m: f64, max_distance_m: f64) -> Self {
        Self {
            min_distance_m,
            max_distance_m,
            max_attempts_per_point: DEFAULT_MAX_ATTEMPTS_PER_POINT,
            max_sampling_iterations: DEFAULT_MAX_SAMPLING_ITERATIONS,
            execution: ExecutionMode::default(),
            random_source: RandomSource::default(),
            run_time_budget: None,
            display_crs: Crs::default(),
        }
    }

    /// Set the per-point attempt cap.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts_per_point = attempts;
        self
    }

    /// Set the rejection-sampling iteration cap.
    pub fn with_max_sampling_iterations(mut self, iterations: u32) -> Self {
        self.max_sampling_iterations = iterations;
        self
    }

    /// Set the execution mode.
    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    /// Use a fixed seed instead of OS entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_source = RandomSource::Seeded(seed);
        self
    }

    /// Set the whole-run wall-clock budget.
    pub fn with_run_time_budget(mut self, budget: Duration) -> Self {
        self.run_time_budget = Some(budget);
        self
    }

    /// Set the display CRS.
    pub fn with_display_crs(mut self, crs: Crs) -> Self {
        self.display_crs = crs;
        self
    }

    /// Check distances and limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_distance("min_distance_m", self.min_distance_m)?;
        validate_distance("max_distance_m", self.max_distance_m)?;
        if self.min_distance_m > self.max_distance_m {
            return Err(ConfigError::DistanceOrder {
                min: self.min_distance_m,
                max: self.max_distance_m,
            });
        }
        if self.max_distance_m > MAX_TRANSLATION_M {
            return Err(ConfigError::DistanceTooLarge {
                field: "max_distance_m",
                value: self.max_distance_m,
                limit: MAX_TRANSLATION_M,
            });
        }
        if self.max_attempts_per_point == 0 {
            return Err(ConfigError::ZeroLimit("max_attempts_per_point"));
        }
        if self.max_sampling_iterations == 0 {
            return Err(ConfigError::ZeroLimit("max_sampling_iterations"));
        }
        Ok(())
    }
}
