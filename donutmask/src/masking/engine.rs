//! The masking engine: sample, translate, check containment, retry.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ConfigError;
use crate::coord;
use crate::point::Point;
use crate::region::{RegionId, RegionLocator};
use crate::sampler::{OffsetSampler, RunSeed, SamplingError};
use crate::telemetry::RunMetrics;

use super::config::{ExecutionMode, MaskingConfig};
use super::error::MaskingError;
use super::types::{MaskedPoint, MaskingRun, UnmaskablePoint, UnmaskableReason};

/// Slack allowed when checking a translated distance against the donut.
const DISTANCE_TOLERANCE_M: f64 = 1e-6;

/// Result of masking a single point.
enum PointOutcome {
    Masked(MaskedPoint),
    Unmaskable(UnmaskablePoint),
}

/// Shared, read-only state of one run.
struct RunContext<'a> {
    seed: &'a RunSeed,
    metrics: &'a RunMetrics,
    deadline: Option<Instant>,
}

/// Displaces points with donut masking.
///
/// Every point is handled independently: its offsets come from its own
/// random stream (see [`RunSeed`]) and nothing it does affects any other
/// point. With a boundary layer, draws are repeated until the masked
/// location falls in the origin's region or the attempt cap is reached.
///
/// # Example
///
/// ```
/// use donutmask::masking::{MaskingConfig, MaskingEngine};
/// use donutmask::point::Point;
///
/// let engine = MaskingEngine::new(MaskingConfig::new(50.0, 250.0).with_seed(1)).unwrap();
/// let points = vec![Point::wgs84("a", -0.1278, 51.5074)];
///
/// let run = engine.mask(&points).unwrap();
/// assert_eq!(run.masked.len(), 1);
/// assert!(run.is_complete());
/// ```
pub struct MaskingEngine {
    config: MaskingConfig,
    regions: Option<Arc<dyn RegionLocator>>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for MaskingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskingEngine")
            .field("config", &self.config)
            .field("regions", &self.regions.is_some())
            .finish_non_exhaustive()
    }
}

impl MaskingEngine {
    /// Create an engine after validating `config`.
    pub fn new(config: MaskingConfig) -> Result<Self, MaskingError> {
        config.validate()?;
        Ok(Self {
            config,
            regions: None,
            cancel: CancellationToken::new(),
        })
    }

    /// Enforce that masked points stay in their origin's region.
    pub fn with_regions(mut self, regions: Arc<dyn RegionLocator>) -> Self {
        self.regions = Some(regions);
        self
    }

    /// Use `token` to cancel runs cooperatively.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &MaskingConfig {
        &self.config
    }

    /// Whether boundary enforcement is active.
    pub fn enforces_regions(&self) -> bool {
        self.regions.is_some()
    }

    /// Mask every point in `points`.
    ///
    /// Per-point failures are collected in [`MaskingRun::unmaskable`]; only
    /// duplicate identifiers, entropy failure, and sampler exhaustion abort
    /// the run.
    pub fn mask(&self, points: &[Point]) -> Result<MaskingRun, MaskingError> {
        check_unique_ids(points)?;

        let seed = RunSeed::from_source(self.config.random_source)?;
        let metrics = RunMetrics::new();
        let started = Instant::now();
        let ctx = RunContext {
            seed: &seed,
            metrics: &metrics,
            // A budget too large to represent is no budget at all
            deadline: self
                .config
                .run_time_budget
                .and_then(|budget| started.checked_add(budget)),
        };

        info!(
            points = points.len(),
            min_distance_m = self.config.min_distance_m,
            max_distance_m = self.config.max_distance_m,
            regions = self.regions.is_some(),
            mode = ?self.config.execution,
            "Masking run started"
        );

        let outcomes: Vec<PointOutcome> = match self.config.execution {
            ExecutionMode::Sequential => points
                .iter()
                .enumerate()
                .map(|(index, point)| self.mask_point(index, point, &ctx))
                .collect::<Result<_, _>>()?,
            ExecutionMode::Parallel => points
                .par_iter()
                .enumerate()
                .map(|(index, point)| self.mask_point(index, point, &ctx))
                .collect::<Result<_, _>>()?,
        };

        let mut masked = Vec::with_capacity(outcomes.len());
        let mut unmaskable = Vec::new();
        for outcome in outcomes {
            match outcome {
                PointOutcome::Masked(point) => masked.push(point),
                PointOutcome::Unmaskable(point) => unmaskable.push(point),
            }
        }

        let cancelled = unmaskable
            .iter()
            .any(|u| u.reason == UnmaskableReason::Cancelled);
        let stats = metrics.snapshot(started.elapsed());

        if cancelled {
            warn!(
                masked = masked.len(),
                unmaskable = unmaskable.len(),
                "Masking run cancelled"
            );
        }
        info!(
            masked = stats.points_masked,
            unmaskable = stats.points_unmaskable,
            draws = stats.draws,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Masking run finished"
        );

        Ok(MaskingRun {
            masked,
            unmaskable,
            stats,
            cancelled,
        })
    }

    /// Mask one point using its own random stream.
    fn mask_point(
        &self,
        index: usize,
        point: &Point,
        ctx: &RunContext<'_>,
    ) -> Result<PointOutcome, MaskingError> {
        if let Some(reason) = self.interruption(ctx) {
            return Ok(self.give_up(point, reason, ctx));
        }

        let origin = match point.geographic() {
            Ok(origin) => origin,
            Err(e) => {
                return Ok(self.give_up(point, UnmaskableReason::InvalidCoordinate(e), ctx));
            }
        };

        let origin_region = match &self.regions {
            Some(locator) => match locator.locate(origin) {
                Some(region) => Some(region),
                None => {
                    return Ok(self.give_up(point, UnmaskableReason::OriginOutsideRegions, ctx));
                }
            },
            None => None,
        };

        let (min_m, max_m) = (self.config.min_distance_m, self.config.max_distance_m);
        let mut sampler = OffsetSampler::new(ctx.seed.point_rng(index as u64))
            .with_max_iterations(self.config.max_sampling_iterations);

        for attempt in 1..=self.config.max_attempts_per_point {
            if attempt > 1 {
                if let Some(reason) = self.interruption(ctx) {
                    return Ok(self.give_up(point, reason, ctx));
                }
            }

            let offset = sampler.sample(min_m, max_m).map_err(|e| match e {
                SamplingError::Exhausted { iterations } => MaskingError::SamplingExhausted {
                    point: point.id().clone(),
                    iterations,
                },
                SamplingError::InvalidRange { min, max } => {
                    ConfigError::DistanceOrder { min, max }.into()
                }
            })?;
            ctx.metrics.draw_taken();

            let geographic = coord::destination(origin, offset.distance_m, offset.bearing_deg);
            if !within_donut(origin, geographic, min_m, max_m) {
                debug!(
                    point = %point.id(),
                    attempt,
                    distance_m = offset.distance_m,
                    "Translated location left the donut, retrying"
                );
                continue;
            }

            let region = match (&self.regions, origin_region) {
                (Some(locator), Some(expected)) => {
                    match self.check_region(locator.as_ref(), geographic, expected, ctx) {
                        Some(region) => Some(region),
                        None => continue,
                    }
                }
                _ => None,
            };

            let projected = point
                .crs()
                .project(geographic)
                .and_then(|c| self.config.display_crs.project(geographic).map(|d| (c, d)));
            let (source_coord, display_coord) = match projected {
                Ok(coords) => coords,
                Err(e) => {
                    debug!(
                        point = %point.id(),
                        attempt,
                        error = %e,
                        "Masked location not projectable, retrying"
                    );
                    continue;
                }
            };

            ctx.metrics.point_masked();
            debug!(
                point = %point.id(),
                attempts = attempt,
                distance_m = offset.distance_m,
                "Point masked"
            );

            return Ok(PointOutcome::Masked(MaskedPoint {
                origin: point.id().clone(),
                offset,
                coord: source_coord,
                crs: point.crs(),
                geographic,
                display_coord,
                display_crs: self.config.display_crs,
                region,
                attempts: attempt,
            }));
        }

        Ok(self.give_up(
            point,
            UnmaskableReason::RetriesExhausted {
                attempts: self.config.max_attempts_per_point,
            },
            ctx,
        ))
    }

    /// Region of `position` if it matches `expected`.
    fn check_region(
        &self,
        locator: &dyn RegionLocator,
        position: geo::Coord<f64>,
        expected: RegionId,
        ctx: &RunContext<'_>,
    ) -> Option<RegionId> {
        match locator.locate(position) {
            Some(found) if found == expected => Some(found),
            Some(_) => {
                ctx.metrics.region_rejected();
                None
            }
            None => {
                ctx.metrics.region_lookup_failed();
                None
            }
        }
    }

    /// Reason to stop early, if the run was cancelled or is out of time.
    fn interruption(&self, ctx: &RunContext<'_>) -> Option<UnmaskableReason> {
        if self.cancel.is_cancelled() {
            return Some(UnmaskableReason::Cancelled);
        }
        match ctx.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Some(UnmaskableReason::RunBudgetExceeded)
            }
            _ => None,
        }
    }

    fn give_up(
        &self,
        point: &Point,
        reason: UnmaskableReason,
        ctx: &RunContext<'_>,
    ) -> PointOutcome {
        ctx.metrics.point_unmaskable();
        match reason {
            UnmaskableReason::Cancelled | UnmaskableReason::RunBudgetExceeded => {
                debug!(point = %point.id(), %reason, "Point skipped");
            }
            _ => warn!(point = %point.id(), %reason, "Point could not be masked"),
        }
        PointOutcome::Unmaskable(UnmaskablePoint {
            id: point.id().clone(),
            reason,
        })
    }
}

/// Whether `position` lies between `min_m` and `max_m` meters of `origin`.
fn within_donut(
    origin: geo::Coord<f64>,
    position: geo::Coord<f64>,
    min_m: f64,
    max_m: f64,
) -> bool {
    let d = coord::haversine_distance_m(origin, position);
    d >= min_m - DISTANCE_TOLERANCE_M && d <= max_m + DISTANCE_TOLERANCE_M
}

fn check_unique_ids(points: &[Point]) -> Result<(), MaskingError> {
    let mut seen = HashSet::with_capacity(points.len());
    for point in points {
        if !seen.insert(point.id()) {
            return Err(MaskingError::DuplicatePointId(point.id().clone()));
        }
    }
    Ok(())
}
