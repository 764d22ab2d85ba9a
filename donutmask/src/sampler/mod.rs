//! Random offset sampling for donut masking.
//!
//! A masked point is displaced by a distance `r` and a bearing `θ`. For the
//! displaced points to be spread with uniform density per unit *area* over
//! the annulus `min ≤ r ≤ max`, `r` must be drawn with density proportional
//! to `r` (the polar area element is `r·dr·dθ`) and `θ` uniformly.
//!
//! # Algorithm
//!
//! Rejection sampling: draw a candidate `c` uniformly on `[min, max)` and an
//! independent threshold `t` uniformly on `[0, max)`, and accept `c` when
//! `t < c`. A candidate survives with probability `c / max`, so accepted
//! distances have density `2r / (max² − min²)` on `[min, max]`. The loop is
//! capped; see [`DEFAULT_MAX_SAMPLING_ITERATIONS`].
//!
//! # Randomness
//!
//! The sampler only accepts generators implementing [`CryptoRng`]. A
//! predictable generator lets an adversary reconstruct the offsets and undo
//! the masking.

mod source;

pub use source::{RandomSource, RunSeed};

use rand::{CryptoRng, Rng, RngCore};
use serde::Serialize;
use thiserror::Error;

/// Default cap on rejection-sampling iterations for a single distance.
///
/// The expected number of iterations is at most 2, so reaching this cap
/// means the generator is broken.
pub const DEFAULT_MAX_SAMPLING_ITERATIONS: u32 = 10_000;

/// A sampled displacement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Offset {
    /// Displacement distance in meters.
    pub distance_m: f64,
    /// Displacement bearing in degrees clockwise from north, in `[0, 360)`.
    pub bearing_deg: f64,
}

/// Errors returned by [`OffsetSampler`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SamplingError {
    /// The rejection loop did not accept a candidate within the cap.
    #[error("Offset sampling exhausted after {iterations} iterations")]
    Exhausted { iterations: u32 },

    /// The distance range is empty, negative or not finite.
    #[error("Invalid sampling range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },
}

/// Draws donut offsets from a cryptographically secure generator.
#[derive(Debug)]
pub struct OffsetSampler<R> {
    rng: R,
    max_iterations: u32,
}

impl<R: RngCore + CryptoRng> OffsetSampler<R> {
    /// Create a sampler with the default iteration cap.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            max_iterations: DEFAULT_MAX_SAMPLING_ITERATIONS,
        }
    }

    /// Set the rejection-sampling iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Sample a distance in `[min_m, max_m]` and a bearing in `[0, 360)`.
    pub fn sample(&mut self, min_m: f64, max_m: f64) -> Result<Offset, SamplingError> {
        let distance_m = self.sample_distance(min_m, max_m)?;
        let bearing_deg = self.uniform(0.0, 360.0);
        Ok(Offset {
            distance_m,
            bearing_deg,
        })
    }

    /// Sample a distance with density proportional to `r` on `[min_m, max_m]`.
    ///
    /// A candidate `c` is drawn uniformly from `[min_m, max_m)` and accepted
    /// when an independent threshold drawn uniformly from `[0, max_m)` falls
    /// below it, i.e. with probability `c / max_m`. The accepted density is
    /// then `c / max_m` times the uniform density, which is proportional to
    /// `c` as required.
    pub fn sample_distance(&mut self, min_m: f64, max_m: f64) -> Result<f64, SamplingError> {
        if !min_m.is_finite() || !max_m.is_finite() || min_m < 0.0 || min_m > max_m {
            return Err(SamplingError::InvalidRange {
                min: min_m,
                max: max_m,
            });
        }
        if min_m == max_m {
            return Ok(min_m);
        }

        for _ in 0..self.max_iterations {
            let candidate = self.uniform(min_m, max_m);
            let threshold = self.uniform(0.0, max_m);
            if threshold < candidate {
                return Ok(candidate);
            }
        }

        Err(SamplingError::Exhausted {
            iterations: self.max_iterations,
        })
    }

    /// Uniform draw on `[min, max)`.
    #[inline]
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        let u: f64 = self.rng.random();
        min + u * (max - min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn seeded_sampler(seed: u64) -> OffsetSampler<ChaCha20Rng> {
        OffsetSampler::new(ChaCha20Rng::seed_from_u64(seed))
    }

    /// Generator that returns the same word forever.
    struct ConstantRng(u64);

    impl RngCore for ConstantRng {
        fn next_u32(&mut self) -> u32 {
            self.0 as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            for (i, byte) in dst.iter_mut().enumerate() {
                *byte = self.0.to_le_bytes()[i % 8];
            }
        }
    }

    impl CryptoRng for ConstantRng {}

    #[test]
    fn test_fixed_distance_when_min_equals_max() {
        let mut sampler = seeded_sampler(1);
        for _ in 0..100 {
            let offset = sampler.sample(100.0, 100.0).unwrap();
            assert_eq!(offset.distance_m, 100.0);
            assert!((0.0..360.0).contains(&offset.bearing_deg));
        }
    }

    #[test]
    fn test_zero_range_yields_zero_distance() {
        let mut sampler = seeded_sampler(2);
        assert_eq!(sampler.sample(0.0, 0.0).unwrap().distance_m, 0.0);
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let mut sampler = seeded_sampler(3);
        assert!(matches!(
            sampler.sample(-1.0, 10.0),
            Err(SamplingError::InvalidRange { .. })
        ));
        assert!(matches!(
            sampler.sample(10.0, 5.0),
            Err(SamplingError::InvalidRange { .. })
        ));
        assert!(matches!(
            sampler.sample(0.0, f64::NAN),
            Err(SamplingError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_degenerate_generator_exhausts() {
        // Candidate and threshold are always equal, so `t < c` never holds
        let mut sampler = OffsetSampler::new(ConstantRng(0x5555_5555_5555_5555))
            .with_max_iterations(50);
        let result = sampler.sample(0.0, 1_000.0);
        assert_eq!(result, Err(SamplingError::Exhausted { iterations: 50 }));
    }

    #[test]
    fn test_distances_within_range() {
        let mut sampler = seeded_sampler(4);
        for _ in 0..5_000 {
            let d = sampler.sample_distance(250.0, 750.0).unwrap();
            assert!((250.0..=750.0).contains(&d), "distance {} out of range", d);
        }
    }

    #[test]
    fn test_distance_density_goodness_of_fit() {
        const SAMPLES: usize = 10_000;
        const BINS: usize = 10;
        // Chi-squared critical value, 9 degrees of freedom, alpha = 0.0001
        const CRITICAL: f64 = 33.72;

        let (a, b) = (100.0_f64, 500.0_f64);
        let mut sampler = seeded_sampler(42);
        let mut counts = [0usize; BINS];

        // Equal-probability bins under F(r) = (r² − a²) / (b² − a²)
        let edges: Vec<f64> = (1..BINS)
            .map(|k| (a * a + (k as f64 / BINS as f64) * (b * b - a * a)).sqrt())
            .collect();

        for _ in 0..SAMPLES {
            let d = sampler.sample_distance(a, b).unwrap();
            let bin = edges.iter().take_while(|&&edge| d >= edge).count();
            counts[bin] += 1;
        }

        let expected = SAMPLES as f64 / BINS as f64;
        let chi_squared: f64 = counts
            .iter()
            .map(|&observed| (observed as f64 - expected).powi(2) / expected)
            .sum();

        assert!(
            chi_squared < CRITICAL,
            "chi-squared {} exceeds {} (counts: {:?})",
            chi_squared,
            CRITICAL,
            counts
        );
    }

    #[test]
    fn test_bearings_uniform() {
        const SAMPLES: usize = 1_000;
        const BINS: usize = 8;
        // 7 degrees of freedom, alpha = 0.0001
        const CRITICAL: f64 = 29.88;

        let mut sampler = seeded_sampler(7);
        let mut counts = [0usize; BINS];
        for _ in 0..SAMPLES {
            let offset = sampler.sample(100.0, 100.0).unwrap();
            counts[(offset.bearing_deg / 45.0) as usize] += 1;
        }

        let expected = SAMPLES as f64 / BINS as f64;
        let chi_squared: f64 = counts
            .iter()
            .map(|&observed| (observed as f64 - expected).powi(2) / expected)
            .sum();
        assert!(chi_squared < CRITICAL, "bearing counts {:?}", counts);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_sampled_offset_in_annulus(
                seed in any::<u64>(),
                min in 0.0..5_000.0_f64,
                width in 0.0..5_000.0_f64
            ) {
                let max = min + width;
                let mut sampler = seeded_sampler(seed);
                let offset = sampler.sample(min, max)?;

                prop_assert!(offset.distance_m >= min && offset.distance_m <= max);
                prop_assert!(offset.bearing_deg >= 0.0 && offset.bearing_deg < 360.0);
            }
        }
    }
}
