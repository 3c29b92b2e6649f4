//! Logistic classification in one and two dimensions
//!
//! Class A is the negative outcome (fail) and class B the positive one
//! (pass); probabilities are of class B.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use super::traits::ContinuousModel;
use crate::geometry::DataPoint;
use crate::simulation::{ClassLabel, PointSet};

/// Bias range reachable by dragging the sigmoid curve
pub const BIAS_DRAG_RANGE: (f64, f64) = (-10.0, 0.0);

/// Boundary position range, in tenths of a data unit along the diagonal
pub const POSITION_RANGE: (f64, f64) = (10.0, 90.0);

#[inline]
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// One observation of the 1D view: hours studied and outcome
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudySample {
    pub hours: f64,
    pub label: ClassLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Accuracy {
    pub correct: usize,
    pub total: usize,
}

impl Accuracy {
    /// Percentage of correct predictions, zero without samples
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }

    fn tally<I: IntoIterator<Item = (ClassLabel, ClassLabel)>>(pairs: I) -> Self {
        pairs.into_iter().fold(Accuracy::default(), |acc, (predicted, actual)| Accuracy {
            correct: acc.correct + usize::from(predicted == actual),
            total: acc.total + 1,
        })
    }
}

/// `p(x) = sigmoid(weight * x + bias)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sigmoid1d {
    pub weight: f64,
    pub bias: f64,
}

impl Default for Sigmoid1d {
    fn default() -> Self {
        Self {
            weight: 1.0,
            bias: -5.0,
        }
    }
}

impl Sigmoid1d {
    pub fn probability(&self, x: f64) -> f64 {
        sigmoid(self.weight * x + self.bias)
    }

    /// Moves the 0.5 crossing to `x` by adjusting the bias
    pub fn drag_crossing_to(&mut self, x: f64) {
        let (min, max) = BIAS_DRAG_RANGE;
        self.bias = (-self.weight * x).clamp(min, max);
    }

    /// Input where the curve crosses 0.5, if the weight is non-zero
    pub fn crossing(&self) -> Option<f64> {
        (self.weight != 0.0).then(|| -self.bias / self.weight)
    }
}

impl ContinuousModel for Sigmoid1d {
    type Input = [StudySample];
    type Output = Accuracy;

    /// Accuracy with a fixed 0.5 cut
    fn recompute(&self, samples: &[StudySample]) -> Accuracy {
        Accuracy::tally(samples.iter().map(|s| {
            let predicted = if self.probability(s.hours) >= 0.5 { ClassLabel::B } else { ClassLabel::A };
            (predicted, s.label)
        }))
    }
}

/// A straight boundary through `(position/10, position/10)` with normal at `angle_deg`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary2d {
    pub angle_deg: f64,
    pub position: f64,
    pub threshold: f64,
}

impl Default for Boundary2d {
    fn default() -> Self {
        Self {
            angle_deg: 45.0,
            position: 50.0,
            threshold: 0.5,
        }
    }
}

impl Boundary2d {
    /// Unit normal pointing towards class B
    pub fn normal(&self) -> DataPoint {
        let rad = self.angle_deg.to_radians();
        DataPoint::new(rad.cos(), rad.sin())
    }

    /// Point the boundary passes through
    pub fn anchor(&self) -> DataPoint {
        let t = self.position / 10.0;
        DataPoint::new(t, t)
    }

    pub fn signed_distance(&self, p: &DataPoint) -> f64 {
        let n = self.normal();
        let a = self.anchor();
        n.x * (p.x - a.x) + n.y * (p.y - a.y)
    }

    pub fn probability(&self, p: &DataPoint) -> f64 {
        sigmoid(2.0 * self.signed_distance(p))
    }

    pub fn predict(&self, p: &DataPoint) -> ClassLabel {
        if self.probability(p) >= self.threshold {
            ClassLabel::B
        } else {
            ClassLabel::A
        }
    }

    /// Slides the boundary so its anchor tracks a dragged pointer
    pub fn drag_to(&mut self, p: &DataPoint) {
        let (min, max) = POSITION_RANGE;
        let position = (p.x + p.y) / 2.0 * 10.0;
        if position.is_finite() {
            self.position = position.clamp(min, max);
        }
    }

    /// Endpoints of the boundary segment across a square domain of side `extent`
    pub fn segment(&self, extent: f64) -> (DataPoint, DataPoint) {
        let n = self.normal();
        let a = self.anchor();
        // Direction along the boundary is the normal rotated by 90 degrees
        let (dx, dy) = (-n.y * extent, n.x * extent);
        (DataPoint::new(a.x - dx, a.y - dy), DataPoint::new(a.x + dx, a.y + dy))
    }
}

impl ContinuousModel for Boundary2d {
    type Input = PointSet;
    type Output = Accuracy;

    /// Accuracy with the user threshold
    fn recompute(&self, points: &PointSet) -> Accuracy {
        Accuracy::tally(
            points
                .iter()
                .filter_map(|p| p.label.class().map(|actual| (self.predict(&p.position), actual))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DomainBounds;
    use crate::simulation::{PointLabel, Sample};
    use approx::assert_relative_eq;

    #[test]
    fn test_sigmoid_midpoint() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.99);
    }

    #[test]
    fn test_curve_drag_moves_crossing() {
        let mut model = Sigmoid1d::default();
        model.drag_crossing_to(3.0);
        assert_relative_eq!(model.bias, -3.0);
        assert_relative_eq!(model.probability(3.0), 0.5);
        model.drag_crossing_to(20.0);
        assert_eq!(model.bias, -10.0);
        model.drag_crossing_to(-1.0);
        assert_eq!(model.bias, 0.0);
    }

    #[test]
    fn test_one_dimensional_accuracy() {
        let samples = [
            StudySample { hours: 1.0, label: ClassLabel::A },
            StudySample { hours: 9.0, label: ClassLabel::B },
            StudySample { hours: 8.0, label: ClassLabel::A },
        ];
        let accuracy = Sigmoid1d::default().recompute(&samples);
        assert_eq!(accuracy, Accuracy { correct: 2, total: 3 });
        assert_relative_eq!(accuracy.percent(), 200.0 / 3.0);
    }

    #[test]
    fn test_default_boundary_is_anti_diagonal() {
        let boundary = Boundary2d::default();
        assert_relative_eq!(boundary.probability(&DataPoint::new(5.0, 5.0)), 0.5);
        assert_relative_eq!(boundary.probability(&DataPoint::new(2.0, 8.0)), 0.5, epsilon = 1e-12);
        assert_eq!(boundary.predict(&DataPoint::new(8.0, 8.0)), ClassLabel::B);
        assert_eq!(boundary.predict(&DataPoint::new(2.0, 2.0)), ClassLabel::A);
    }

    #[test]
    fn test_boundary_drag_is_clamped() {
        let mut boundary = Boundary2d::default();
        boundary.drag_to(&DataPoint::new(3.0, 4.0));
        assert_relative_eq!(boundary.position, 35.0);
        boundary.drag_to(&DataPoint::new(-5.0, -5.0));
        assert_eq!(boundary.position, 10.0);
    }

    #[test]
    fn test_two_dimensional_accuracy_uses_threshold() {
        let mut points = PointSet::new(DomainBounds::default(), 0.3);
        points.insert_sample(Sample::new(5.5, 5.5, PointLabel::Class(ClassLabel::B)));
        points.insert_sample(Sample::new(2.0, 2.0, PointLabel::Class(ClassLabel::A)));
        let lenient = Boundary2d::default();
        assert_eq!(lenient.recompute(&points).correct, 2);
        let strict = Boundary2d { threshold: 0.9, ..Boundary2d::default() };
        assert_eq!(strict.recompute(&points).correct, 1);
    }
}
