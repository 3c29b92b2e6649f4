//! Least-squares line fitting and goodness-of-fit statistics
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::traits::ContinuousModel;
use crate::geometry::DataPoint;
use crate::simulation::PointSet;

/// Scale of residual error at which the fit score reaches zero
const FIT_SCORE_SCALE: f64 = 5.0;

/// `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub slope: f64,
    pub intercept: f64,
}

impl Default for Line {
    fn default() -> Self {
        Self {
            slope: 0.5,
            intercept: 5.0,
        }
    }
}

impl Line {
    pub const fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn residual(&self, p: &DataPoint) -> f64 {
        p.y - self.predict(p.x)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitStatistics {
    /// Coefficient of determination, floored at zero
    pub r_squared: f64,
    pub mse: f64,
    pub sse: f64,
    /// `(1 - sqrt(mse) / 5) * 100`, clamped to `[0, 100]`
    pub fit_score: f64,
}

/// Fit statistics of `line` over `points`; `None` for fewer than two points
pub fn fit_statistics(line: &Line, points: &[DataPoint]) -> Option<FitStatistics> {
    if points.len() < 2 {
        return None;
    }
    let mean = DataPoint::mean(points)?;
    let (sse, sst) = points.iter().fold((0.0, 0.0), |(sse, sst), p| {
        let r = line.residual(p);
        let dy = p.y - mean.y;
        (sse + r * r, sst + dy * dy)
    });
    let mse = sse / points.len() as f64;
    let r_squared = if sst > 0.0 { (1.0 - sse / sst).max(0.0) } else { 0.0 };
    let fit_score = ((1.0 - mse.sqrt() / FIT_SCORE_SCALE) * 100.0).clamp(0.0, 100.0);
    Some(FitStatistics {
        r_squared,
        mse,
        sse,
        fit_score,
    })
}

/// Ordinary least squares line; zero x-variance yields slope 0
pub fn optimal_line(points: &[DataPoint]) -> Option<Line> {
    if points.len() < 2 {
        return None;
    }
    let mean = DataPoint::mean(points)?;
    let (numerator, denominator) = points.iter().fold((0.0, 0.0), |(num, den), p| {
        let dx = p.x - mean.x;
        (num + dx * (p.y - mean.y), den + dx * dx)
    });
    let slope = if denominator != 0.0 { numerator / denominator } else { 0.0 };
    Some(Line::new(slope, mean.y - slope * mean.x))
}

/// Places a point 3 to 6 units off `line`, kept inside `[0.5, 9.5]`
///
/// When clamping pulls the point within 2 units of the line it is pushed
/// to a fixed height on the chosen side.
pub fn outlier_position<R: Rng + ?Sized>(line: &Line, rng: &mut R) -> DataPoint {
    let x = rng.gen_range(1.0..9.0);
    let predicted = line.predict(x);
    let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let offset = rng.gen_range(3.0..6.0) * direction;
    let mut y = (predicted + offset).clamp(0.5, 9.5);
    if (y - predicted).abs() < 2.0 {
        y = if direction > 0.0 { 9.0 } else { 1.0 };
    }
    DataPoint::new(x, y)
}

/// A user-adjusted line evaluated against the point set
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinearModel {
    pub line: Line,
}

impl ContinuousModel for LinearModel {
    type Input = PointSet;
    type Output = Option<FitStatistics>;

    fn recompute(&self, points: &PointSet) -> Option<FitStatistics> {
        fit_statistics(&self.line, &points.positions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_perfect_fit() {
        let points: Vec<DataPoint> = (1..=5).map(|x| DataPoint::new(x as f64, 2.0 * x as f64 + 1.0)).collect();
        let line = optimal_line(&points).unwrap();
        assert_relative_eq!(line.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(line.intercept, 1.0, epsilon = 1e-12);

        let stats = fit_statistics(&line, &points).unwrap();
        assert_relative_eq!(stats.r_squared, 1.0, epsilon = 1e-12);
        assert_relative_eq!(stats.sse, 0.0, epsilon = 1e-12);
        assert_relative_eq!(stats.fit_score, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_statistics_undefined_below_two_points() {
        assert!(fit_statistics(&Line::default(), &[DataPoint::new(1.0, 1.0)]).is_none());
        assert!(optimal_line(&[]).is_none());
    }

    #[test]
    fn test_vertical_cloud_has_zero_slope() {
        let points = [DataPoint::new(3.0, 1.0), DataPoint::new(3.0, 5.0)];
        let line = optimal_line(&points).unwrap();
        assert_eq!(line.slope, 0.0);
        assert_relative_eq!(line.intercept, 3.0);
    }

    #[test]
    fn test_bad_line_scores() {
        let points = [DataPoint::new(1.0, 1.0), DataPoint::new(2.0, 2.0), DataPoint::new(3.0, 3.0)];
        let stats = fit_statistics(&Line::new(0.0, 9.0), &points).unwrap();
        // R^2 would be negative; it is floored
        assert_eq!(stats.r_squared, 0.0);
        assert_relative_eq!(stats.mse, (64.0 + 49.0 + 36.0) / 3.0);
        assert_eq!(stats.fit_score, 0.0);
    }

    #[test]
    fn test_outliers_stay_far_from_the_line() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let line = Line::new(0.5, 5.0);
        for _ in 0..100 {
            let p = outlier_position(&line, &mut rng);
            assert!((0.5..=9.5).contains(&p.y));
            assert!((p.y - line.predict(p.x)).abs() >= 2.0 - 1e-9 || p.y == 9.0 || p.y == 1.0);
        }
    }
}
