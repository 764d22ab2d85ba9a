//! Atomic run counters and their snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Counters shared by all workers of a masking run.
///
/// Relaxed ordering is enough: counters are only read after the workers
/// have joined.
#[derive(Debug, Default)]
pub struct RunMetrics {
    points_masked: AtomicU64,
    points_unmaskable: AtomicU64,
    draws: AtomicU64,
    region_rejections: AtomicU64,
    region_lookup_failures: AtomicU64,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A point produced a masked location.
    pub fn point_masked(&self) {
        self.points_masked.fetch_add(1, Ordering::Relaxed);
    }

    /// A point was given up on.
    pub fn point_unmaskable(&self) {
        self.points_unmaskable.fetch_add(1, Ordering::Relaxed);
    }

    /// One offset was sampled and applied.
    pub fn draw_taken(&self) {
        self.draws.fetch_add(1, Ordering::Relaxed);
    }

    /// A draw landed in a different region than its origin.
    pub fn region_rejected(&self) {
        self.region_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// A draw landed outside every region.
    pub fn region_lookup_failed(&self) {
        self.region_lookup_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the counters into a [`RunStats`].
    pub fn snapshot(&self, elapsed: Duration) -> RunStats {
        RunStats {
            points_masked: self.points_masked.load(Ordering::Relaxed),
            points_unmaskable: self.points_unmaskable.load(Ordering::Relaxed),
            draws: self.draws.load(Ordering::Relaxed),
            region_rejections: self.region_rejections.load(Ordering::Relaxed),
            region_lookup_failures: self.region_lookup_failures.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// Point-in-time copy of [`RunMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunStats {
    pub points_masked: u64,
    pub points_unmaskable: u64,
    /// Offsets drawn, accepted or not.
    pub draws: u64,
    /// Draws rejected because they left the origin's region.
    pub region_rejections: u64,
    /// Draws rejected because they fell outside every region.
    pub region_lookup_failures: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl RunStats {
    /// Mean draws per masked point, or 0 when nothing was masked.
    pub fn draws_per_point(&self) -> f64 {
        if self.points_masked == 0 {
            return 0.0;
        }
        self.draws as f64 / self.points_masked as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counters_start_at_zero() {
        let stats = RunMetrics::new().snapshot(Duration::ZERO);
        assert_eq!(stats, RunStats::default());
    }

    #[test]
    fn test_counters_from_many_threads() {
        let metrics = Arc::new(RunMetrics::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..250 {
                        metrics.draw_taken();
                    }
                    metrics.point_masked();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = metrics.snapshot(Duration::from_secs(1));
        assert_eq!(stats.draws, 1_000);
        assert_eq!(stats.points_masked, 4);
        assert_eq!(stats.draws_per_point(), 250.0);
    }

    #[test]
    fn test_draws_per_point_without_masked_points() {
        let metrics = RunMetrics::new();
        metrics.draw_taken();
        metrics.point_unmaskable();
        assert_eq!(metrics.snapshot(Duration::ZERO).draws_per_point(), 0.0);
    }
}
