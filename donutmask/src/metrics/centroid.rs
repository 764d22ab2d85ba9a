//! Mean center displacement.

use geo::{Centroid, Coord, MultiPoint};

use crate::coord;

/// Mean center of a set of lon/lat positions, `None` when empty.
pub fn mean_center(positions: &[Coord<f64>]) -> Option<Coord<f64>> {
    let points: MultiPoint<f64> = positions.iter().copied().collect();
    points.centroid().map(|p| p.0)
}

/// Distance in meters between the mean centers of `originals` and `masked`.
pub fn centroid_displacement_m(originals: &[Coord<f64>], masked: &[Coord<f64>]) -> Option<f64> {
    let before = mean_center(originals)?;
    let after = mean_center(masked)?;
    Some(coord::haversine_distance_m(before, after))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_center() {
        let center = mean_center(&[Coord { x: 0.0, y: 0.0 }, Coord { x: 2.0, y: 4.0 }]).unwrap();
        assert_eq!(center, Coord { x: 1.0, y: 2.0 });
        assert_eq!(mean_center(&[]), None);
    }

    #[test]
    fn test_identical_sets_have_zero_displacement() {
        let set = [Coord { x: 10.0, y: 45.0 }, Coord { x: 10.1, y: 45.1 }];
        assert_eq!(centroid_displacement_m(&set, &set), Some(0.0));
    }

    #[test]
    fn test_shifted_set() {
        let originals = [Coord { x: 0.0, y: 0.0 }];
        let shifted = [coord::destination(originals[0], 250.0, 45.0)];
        let d = centroid_displacement_m(&originals, &shifted).unwrap();
        assert!((d - 250.0).abs() < 1e-6);
    }
}
