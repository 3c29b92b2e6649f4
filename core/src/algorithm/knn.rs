//! K-nearest-neighbour classification around a movable query
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use super::traits::ContinuousModel;
use crate::geometry::DataPoint;
use crate::simulation::{ClassLabel, PointId, PointSet};

/// One neighbour of the query, nearest first
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: PointId,
    pub position: DataPoint,
    pub class: ClassLabel,
    pub distance: f64,
}

/// Majority vote over the neighbour set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Class(ClassLabel),
    Tie,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KnnResult {
    pub neighbors: Vec<Neighbor>,
    /// Distance to the farthest selected neighbour, zero when none
    pub k_radius: f64,
    pub votes_a: usize,
    pub votes_b: usize,
    pub prediction: Option<Vote>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnnModel {
    pub k: usize,
    pub query: Option<DataPoint>,
}

impl KnnModel {
    pub fn new(k: usize, query: DataPoint) -> Self {
        Self {
            k: k.max(1),
            query: Some(query),
        }
    }
}

/// The `k` labelled points nearest to `query`
///
/// Sorting is stable, so equal distances keep point insertion order.
pub fn find_k_nearest(points: &PointSet, query: &DataPoint, k: usize) -> Vec<Neighbor> {
    let mut candidates: Vec<Neighbor> = points
        .iter()
        .filter_map(|p| {
            p.label.class().map(|class| Neighbor {
                id: p.id,
                position: p.position,
                class,
                distance: p.position.distance(query),
            })
        })
        .collect();
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    candidates.truncate(k);
    candidates
}

impl ContinuousModel for KnnModel {
    type Input = PointSet;
    type Output = KnnResult;

    fn recompute(&self, points: &PointSet) -> KnnResult {
        let Some(query) = self.query else {
            return KnnResult::default();
        };
        let neighbors = find_k_nearest(points, &query, self.k);
        if neighbors.is_empty() {
            return KnnResult::default();
        }

        let votes_a = neighbors.iter().filter(|n| n.class == ClassLabel::A).count();
        let votes_b = neighbors.len() - votes_a;
        let prediction = match votes_a.cmp(&votes_b) {
            std::cmp::Ordering::Greater => Vote::Class(ClassLabel::A),
            std::cmp::Ordering::Less => Vote::Class(ClassLabel::B),
            std::cmp::Ordering::Equal => Vote::Tie,
        };
        let k_radius = neighbors.last().map_or(0.0, |n| n.distance);

        KnnResult {
            neighbors,
            k_radius,
            votes_a,
            votes_b,
            prediction: Some(prediction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DomainBounds;
    use crate::simulation::{PointLabel, Sample};
    use approx::assert_relative_eq;

    fn labelled(samples: &[(f64, f64, ClassLabel)]) -> PointSet {
        let mut points = PointSet::new(DomainBounds::default(), 0.3);
        points.replace_with(
            samples
                .iter()
                .map(|&(x, y, c)| Sample::new(x, y, PointLabel::Class(c))),
        );
        points
    }

    #[test]
    fn test_single_nearest_neighbor() {
        let points = labelled(&[(1.0, 1.0, ClassLabel::A), (9.0, 9.0, ClassLabel::B)]);
        let result = KnnModel::new(1, DataPoint::new(1.1, 1.1)).recompute(&points);
        assert_eq!(result.neighbors.len(), 1);
        assert_eq!(result.neighbors[0].class, ClassLabel::A);
        assert_relative_eq!(result.neighbors[0].distance, 0.1414, epsilon = 1e-4);
        assert_eq!(result.prediction, Some(Vote::Class(ClassLabel::A)));
    }

    #[test]
    fn test_equal_distances_keep_insertion_order() {
        let points = labelled(&[
            (4.0, 5.0, ClassLabel::B),
            (6.0, 5.0, ClassLabel::A),
            (5.0, 4.0, ClassLabel::B),
            (5.0, 6.0, ClassLabel::A),
        ]);
        let model = KnnModel::new(3, DataPoint::new(5.0, 5.0));
        let first = model.recompute(&points);
        let second = model.recompute(&points);
        assert_eq!(first, second);
        let order: Vec<u32> = first.neighbors.iter().map(|n| n.id.0).collect();
        let expected: Vec<u32> = points.iter().take(3).map(|p| p.id.0).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_tie_vote_and_radius() {
        let points = labelled(&[(5.0, 6.0, ClassLabel::A), (5.0, 3.0, ClassLabel::B)]);
        let result = KnnModel::new(4, DataPoint::new(5.0, 5.0)).recompute(&points);
        assert_eq!(result.neighbors.len(), 2);
        assert_eq!(result.prediction, Some(Vote::Tie));
        assert_relative_eq!(result.k_radius, 2.0);
    }

    #[test]
    fn test_unlabelled_points_are_ignored() {
        let mut points = labelled(&[(2.0, 2.0, ClassLabel::B)]);
        points.insert_sample(Sample::new(5.0, 5.0, PointLabel::Unlabeled));
        let result = KnnModel::new(1, DataPoint::new(5.0, 5.0)).recompute(&points);
        assert_eq!(result.neighbors[0].class, ClassLabel::B);
    }

    #[test]
    fn test_empty_set_has_no_prediction() {
        let points = labelled(&[]);
        let result = KnnModel::new(3, DataPoint::new(5.0, 5.0)).recompute(&points);
        assert_eq!(result, KnnResult::default());
    }
}
