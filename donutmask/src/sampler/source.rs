//! Run seeds and per-point random streams.

use std::fmt;

use rand::rand_core::OsError;
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng, TryRngCore};
use rand_chacha::ChaCha20Rng;

/// Where a run's randomness comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RandomSource {
    /// Fresh seed from the operating system entropy source (production).
    #[default]
    Os,
    /// Deterministic seed, for reproducible runs and tests.
    Seeded(u64),
}

/// The 32-byte key of all random streams used by a single run.
///
/// Point `i` of a run draws from ChaCha20 stream `i` under this key, so the
/// offsets a point receives do not depend on how many other points exist or
/// in which order they are processed.
#[derive(Clone)]
pub struct RunSeed([u8; 32]);

impl RunSeed {
    /// Derive a run seed from the given source.
    ///
    /// Fails only if the OS entropy source is unavailable.
    pub fn from_source(source: RandomSource) -> Result<Self, OsError> {
        let mut seed = [0u8; 32];
        match source {
            RandomSource::Os => OsRng.try_fill_bytes(&mut seed)?,
            RandomSource::Seeded(value) => {
                ChaCha20Rng::seed_from_u64(value).fill_bytes(&mut seed);
            }
        }
        Ok(Self(seed))
    }

    /// Generator for the point at `index` in the input set.
    pub fn point_rng(&self, index: u64) -> ChaCha20Rng {
        let mut rng = ChaCha20Rng::from_seed(self.0);
        rng.set_stream(index);
        rng
    }
}

// The seed is enough to undo every offset of the run, keep it out of logs.
impl fmt::Debug for RunSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RunSeed(<redacted>)")
    }
}
