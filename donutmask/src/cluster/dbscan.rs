//! Density-based clustering over geographic points.

use std::collections::VecDeque;
use std::num::NonZeroU32;

use geo::Coord;
use rayon::prelude::*;

use crate::coord;

/// Cluster assignment of one point; `None` is noise.
pub type ClusterLabel = Option<NonZeroU32>;

/// DBSCAN with great-circle distances.
///
/// A point is a core point when at least `min_points` points (itself
/// included) lie within `eps_m` meters. Clusters are grown from core points;
/// non-core points reachable from a core point join its cluster as border
/// points and everything else is noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dbscan {
    eps_m: f64,
    min_points: usize,
}

/// Labels produced by [`Dbscan::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    /// One label per input point, in input order. Labels start at 1.
    pub labels: Vec<ClusterLabel>,
    /// Number of distinct clusters.
    pub cluster_count: u32,
}

impl Clustering {
    /// Number of points labelled as noise.
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_none()).count()
    }
}

impl Dbscan {
    pub fn new(eps_m: f64, min_points: usize) -> Self {
        Self {
            eps_m,
            min_points: min_points.max(1),
        }
    }

    /// Cluster WGS84 lon/lat positions.
    pub fn run(&self, positions: &[Coord<f64>]) -> Clustering {
        let neighborhoods = self.neighborhoods(positions);

        let mut labels: Vec<ClusterLabel> = vec![None; positions.len()];
        let mut visited = vec![false; positions.len()];
        let mut next_label: u32 = 0;

        for start in 0..positions.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            if neighborhoods[start].len() < self.min_points {
                continue;
            }

            next_label += 1;
            let label = NonZeroU32::new(next_label);
            labels[start] = label;

            let mut queue: VecDeque<usize> = neighborhoods[start].iter().copied().collect();
            while let Some(j) = queue.pop_front() {
                if labels[j].is_none() {
                    labels[j] = label;
                }
                if visited[j] {
                    continue;
                }
                visited[j] = true;
                if neighborhoods[j].len() >= self.min_points {
                    queue.extend(neighborhoods[j].iter().copied());
                }
            }
        }

        Clustering {
            labels,
            cluster_count: next_label,
        }
    }

    /// Indices within `eps_m` of each position, the position itself included.
    fn neighborhoods(&self, positions: &[Coord<f64>]) -> Vec<Vec<usize>> {
        positions
            .par_iter()
            .map(|&p| {
                positions
                    .iter()
                    .enumerate()
                    .filter(|(_, &q)| coord::haversine_distance_m(p, q) <= self.eps_m)
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `count` points spaced `spacing_m` apart heading east from `origin`.
    fn line(origin: Coord<f64>, count: usize, spacing_m: f64) -> Vec<Coord<f64>> {
        (0..count)
            .map(|i| coord::destination(origin, spacing_m * i as f64, 90.0))
            .collect()
    }

    #[test]
    fn test_two_separate_clusters() {
        let mut points = line(Coord { x: 0.0, y: 0.0 }, 5, 10.0);
        points.extend(line(Coord { x: 1.0, y: 1.0 }, 4, 10.0));

        let clustering = Dbscan::new(25.0, 3).run(&points);

        assert_eq!(clustering.cluster_count, 2);
        let first = clustering.labels[0];
        let second = clustering.labels[5];
        assert!(first.is_some() && second.is_some());
        assert_ne!(first, second);
        assert!(clustering.labels[..5].iter().all(|l| *l == first));
        assert!(clustering.labels[5..].iter().all(|l| *l == second));
        assert_eq!(clustering.noise_count(), 0);
    }

    #[test]
    fn test_isolated_points_are_noise() {
        let points = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 0.1, y: 0.0 },
            Coord { x: 0.2, y: 0.0 },
        ];
        let clustering = Dbscan::new(50.0, 3).run(&points);
        assert_eq!(clustering.cluster_count, 0);
        assert_eq!(clustering.noise_count(), 3);
    }

    #[test]
    fn test_border_point_joins_cluster() {
        // Core at 0..=2 (10 m apart); the point 30 m out only sees one neighbour.
        let mut points = line(Coord { x: 5.0, y: 5.0 }, 3, 10.0);
        points.push(coord::destination(points[2], 15.0, 90.0));

        let clustering = Dbscan::new(16.0, 3).run(&points);
        assert_eq!(clustering.cluster_count, 1);
        assert_eq!(clustering.labels[3], clustering.labels[0]);
    }

    #[test]
    fn test_labels_start_at_one() {
        let points = line(Coord { x: 0.0, y: 0.0 }, 3, 1.0);
        let clustering = Dbscan::new(5.0, 3).run(&points);
        assert_eq!(clustering.labels[0], NonZeroU32::new(1));
    }

    #[test]
    fn test_empty_input() {
        let clustering = Dbscan::new(10.0, 3).run(&[]);
        assert_eq!(clustering.cluster_count, 0);
        assert!(clustering.labels.is_empty());
    }
}
