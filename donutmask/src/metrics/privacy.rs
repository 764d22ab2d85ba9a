//! Spruill's re-identification measure.

use geo::Coord;
use rayon::prelude::*;

use crate::coord;

/// Two distances closer than this are treated as equal.
pub const REIDENTIFICATION_TOLERANCE_M: f64 = 1e-6;

/// Whether the nearest original to `masked` is (a tie with) its own origin.
fn is_reidentified(masked: Coord<f64>, origin: Coord<f64>, originals: &[Coord<f64>]) -> bool {
    let own = coord::haversine_distance_m(masked, origin);
    let nearest = originals
        .iter()
        .map(|&candidate| coord::haversine_distance_m(masked, candidate))
        .fold(f64::INFINITY, f64::min);
    (nearest - own).abs() <= REIDENTIFICATION_TOLERANCE_M
}

/// Percentage of masked points whose nearest original is not their own.
///
/// `pairs` holds `(origin, masked)` positions and `originals` every original
/// position. Returns `None` when `pairs` is empty; otherwise a value in
/// `[0, 100]`.
pub fn spruill_score(originals: &[Coord<f64>], pairs: &[(Coord<f64>, Coord<f64>)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }
    let reidentified = pairs
        .par_iter()
        .filter(|(origin, masked)| is_reidentified(*masked, *origin, originals))
        .count();
    Some(100.0 - 100.0 * reidentified as f64 / pairs.len() as f64)
}
