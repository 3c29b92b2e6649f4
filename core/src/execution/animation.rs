//! Scheduled interpolation over a bounded duration
//!
//! Animations are driven by accumulated frame time rather than wall-clock
//! timestamps: each frame adds its delta to an [`AnimationClock`] and tweens
//! sample themselves at the clock's elapsed time.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use crate::geometry::DataPoint;

/// Easing functions for animations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EasingFunction {
    /// Linear interpolation
    Linear,
    /// Quadratic easing in
    QuadraticIn,
    /// Quadratic easing out
    QuadraticOut,
    /// Quadratic easing in and out
    QuadraticInOut,
    /// Cubic easing in
    CubicIn,
    /// Cubic easing out
    CubicOut,
    /// Cubic easing in and out
    CubicInOut,
}

impl EasingFunction {
    /// Maps linear progress `t` in `[0, 1]` to eased progress
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingFunction::Linear => t,
            EasingFunction::QuadraticIn => t * t,
            EasingFunction::QuadraticOut => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::QuadraticInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::CubicIn => t * t * t,
            EasingFunction::CubicOut => 1.0 - (1.0 - t).powi(3),
            EasingFunction::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Values that can be linearly interpolated
pub trait Interpolate: Copy {
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Interpolate for DataPoint {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        self.lerp(to, t)
    }
}

impl Interpolate for (f64, f64) {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        (self.0.interpolate(&to.0, t), self.1.interpolate(&to.1, t))
    }
}

/// A single interpolation from `from` to `to`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T: Interpolate> {
    from: T,
    to: T,
    start_ms: f64,
    duration_ms: f64,
    easing: EasingFunction,
}

impl<T: Interpolate> Tween<T> {
    /// Starts at `start_ms` on the owning clock, optionally after a delay
    pub fn new(from: T, to: T, start_ms: f64, duration_ms: f64, easing: EasingFunction) -> Self {
        Self {
            from,
            to,
            start_ms,
            duration_ms: duration_ms.max(0.0),
            easing,
        }
    }

    /// Linear progress at `now_ms`
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return if now_ms >= self.start_ms { 1.0 } else { 0.0 };
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn sample(&self, now_ms: f64) -> T {
        let eased = self.easing.apply(self.progress(now_ms));
        self.from.interpolate(&self.to, eased)
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    pub fn target(&self) -> T {
        self.to
    }

    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.duration_ms
    }
}

/// Monotonic accumulator of frame deltas
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationClock {
    elapsed_ms: f64,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances by one frame; negative or non-finite deltas are ignored
    pub fn advance(&mut self, dt_ms: f64) -> f64 {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.elapsed_ms += dt_ms;
        }
        self.elapsed_ms
    }

    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.elapsed_ms
    }

    #[inline]
    pub fn seconds(&self) -> f64 {
        self.elapsed_ms / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            EasingFunction::Linear,
            EasingFunction::QuadraticIn,
            EasingFunction::QuadraticOut,
            EasingFunction::QuadraticInOut,
            EasingFunction::CubicIn,
            EasingFunction::CubicOut,
            EasingFunction::CubicInOut,
        ] {
            assert_relative_eq!(easing.apply(0.0), 0.0);
            assert_relative_eq!(easing.apply(1.0), 1.0);
        }
        assert_relative_eq!(EasingFunction::CubicOut.apply(0.5), 0.875);
    }

    #[test]
    fn test_tween_samples() {
        let tween = Tween::new(0.0, 10.0, 100.0, 200.0, EasingFunction::Linear);
        assert_relative_eq!(tween.sample(50.0), 0.0);
        assert_relative_eq!(tween.sample(200.0), 5.0);
        assert_relative_eq!(tween.sample(1000.0), 10.0);
        assert!(tween.is_finished(300.0));
        assert!(!tween.is_finished(299.0));
    }

    #[test]
    fn test_zero_duration_tween_jumps() {
        let tween = Tween::new(DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 1.0), 0.0, 0.0, EasingFunction::Linear);
        assert_eq!(tween.sample(0.0), DataPoint::new(1.0, 1.0));
    }

    #[test]
    fn test_clock_ignores_bad_deltas() {
        let mut clock = AnimationClock::new();
        clock.advance(16.0);
        clock.advance(-5.0);
        clock.advance(f64::NAN);
        assert_relative_eq!(clock.now_ms(), 16.0);
    }
}
