//! Planar geometry primitives shared by every lab
//!
//! Data-space coordinates live in a fixed logical domain (commonly
//! `[0, 10] x [0, 10]`) and are kept in `f64`. Canvas coordinates are
//! logical pixels with the origin at the top-left corner.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod viewport;

use serde::{Deserialize, Serialize};

use crate::error::{LabError, LabResult};

pub use viewport::{BackingStore, ContainerSize, CoordinateTransform, ResizeSignal, Viewport};

/// A position in data space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance
    #[inline]
    pub fn distance(&self, other: &DataPoint) -> f64 {
        self.distance_squared(other).sqrt()
    }

    #[inline]
    pub fn distance_squared(&self, other: &DataPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Linear interpolation towards `other`
    pub fn lerp(&self, other: &DataPoint, t: f64) -> DataPoint {
        DataPoint::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Arithmetic mean of a set of positions, `None` when empty
    pub fn mean<'a, I>(points: I) -> Option<DataPoint>
    where
        I: IntoIterator<Item = &'a DataPoint>,
    {
        let (sum_x, sum_y, count) = points
            .into_iter()
            .fold((0.0, 0.0, 0usize), |(sx, sy, n), p| (sx + p.x, sy + p.y, n + 1));
        if count == 0 {
            return None;
        }
        Some(DataPoint::new(sum_x / count as f64, sum_y / count as f64))
    }
}

/// A position in logical canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(&self, other: &PixelPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Distance from this point to the segment `a`-`b`
    pub fn distance_to_segment(&self, a: &PixelPoint, b: &PixelPoint) -> f64 {
        let cx = b.x - a.x;
        let cy = b.y - a.y;
        let len_sq = cx * cx + cy * cy;

        // Zero-length segments collapse onto their start point
        let t = if len_sq == 0.0 {
            0.0
        } else {
            (((self.x - a.x) * cx + (self.y - a.y) * cy) / len_sq).clamp(0.0, 1.0)
        };

        self.distance(&PixelPoint::new(a.x + t * cx, a.y + t * cy))
    }
}

/// Fixed rectangular data domain of a lab
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for DomainBounds {
    fn default() -> Self {
        Self::square(0.0, 10.0)
    }
}

impl DomainBounds {
    pub const fn square(min: f64, max: f64) -> Self {
        Self {
            min_x: min,
            max_x: max,
            min_y: min,
            max_y: max,
        }
    }

    /// Rejects domains with a zero or negative span on either axis
    pub fn validate(&self) -> LabResult<()> {
        let finite = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.span_x() <= 0.0 || self.span_y() <= 0.0 {
            return Err(LabError::Configuration(format!(
                "domain must have a positive span on both axes, got x=[{}, {}] y=[{}, {}]",
                self.min_x, self.max_x, self.min_y, self.max_y
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn span_x(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn span_y(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> DataPoint {
        DataPoint::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Inclusive containment test
    pub fn contains(&self, p: &DataPoint) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn clamp(&self, p: DataPoint) -> DataPoint {
        self.clamp_with_margin(p, 0.0)
    }

    /// Clamps into the domain shrunk by `margin` on every side
    ///
    /// Non-finite input lands on the domain center so no NaN is ever stored.
    pub fn clamp_with_margin(&self, p: DataPoint, margin: f64) -> DataPoint {
        let margin = margin.max(0.0).min(self.span_x() / 2.0).min(self.span_y() / 2.0);
        let center = self.center();
        let x = if p.x.is_finite() { p.x } else { center.x };
        let y = if p.y.is_finite() { p.y } else { center.y };
        DataPoint::new(
            x.clamp(self.min_x + margin, self.max_x - margin),
            y.clamp(self.min_y + margin, self.max_y - margin),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance() {
        let a = DataPoint::new(1.0, 1.0);
        let b = DataPoint::new(1.1, 1.1);
        assert_relative_eq!(a.distance(&b), 0.141_421_356, epsilon = 1e-6);
    }

    #[test]
    fn test_mean_of_empty_is_none() {
        let empty: Vec<DataPoint> = Vec::new();
        assert!(DataPoint::mean(&empty).is_none());

        let pts = [DataPoint::new(0.0, 0.0), DataPoint::new(2.0, 4.0)];
        assert_eq!(DataPoint::mean(&pts), Some(DataPoint::new(1.0, 2.0)));
    }

    #[test]
    fn test_clamp_with_margin() {
        let domain = DomainBounds::default();
        let p = domain.clamp_with_margin(DataPoint::new(-3.0, 42.0), 0.5);
        assert_eq!(p, DataPoint::new(0.5, 9.5));

        let nan = domain.clamp_with_margin(DataPoint::new(f64::NAN, 2.0), 0.5);
        assert_eq!(nan, DataPoint::new(5.0, 2.0));
    }

    #[test]
    fn test_zero_span_domain_rejected() {
        let domain = DomainBounds {
            min_x: 0.0,
            max_x: 0.0,
            min_y: 0.0,
            max_y: 10.0,
        };
        assert!(domain.validate().is_err());
        assert!(DomainBounds::default().validate().is_ok());
    }

    #[test]
    fn test_distance_to_segment() {
        let a = PixelPoint::new(0.0, 0.0);
        let b = PixelPoint::new(10.0, 0.0);
        assert_relative_eq!(PixelPoint::new(5.0, 3.0).distance_to_segment(&a, &b), 3.0);
        assert_relative_eq!(PixelPoint::new(-4.0, 3.0).distance_to_segment(&a, &b), 5.0);
        assert_relative_eq!(PixelPoint::new(3.0, 4.0).distance_to_segment(&a, &a), 5.0);
    }
}
