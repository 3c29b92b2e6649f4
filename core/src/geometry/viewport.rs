//! Viewport and coordinate transform between data space and canvas pixels
//!
//! The transform is a pure function of the current [`Viewport`] and the
//! lab's [`DomainBounds`]. Canvas y grows downwards, data y grows upwards,
//! and a fixed padding margin is reserved on every side for axes and labels.
//!
//! The backing store of the drawing surface is always
//! `floor(logical * device_pixel_ratio)` physical pixels; draw calls are
//! issued in logical units after the surface has been rescaled by
//! `device_pixel_ratio`.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use super::{DataPoint, DomainBounds, PixelPoint};
use crate::error::{LabError, LabResult};

/// Size of the canvas container as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Physical pixel dimensions of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackingStore {
    pub width: u32,
    pub height: u32,
}

/// Current mapping parameters between logical and physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub logical_width: f64,
    pub logical_height: f64,
    pub device_pixel_ratio: f64,
    pub padding: f64,
}

impl Viewport {
    /// Backing store size for this viewport
    pub fn backing_store(&self) -> BackingStore {
        BackingStore {
            width: (self.logical_width * self.device_pixel_ratio).floor() as u32,
            height: (self.logical_height * self.device_pixel_ratio).floor() as u32,
        }
    }

    /// Width of the plotting area inside the padding
    #[inline]
    pub fn plot_width(&self) -> f64 {
        self.logical_width - 2.0 * self.padding
    }

    #[inline]
    pub fn plot_height(&self) -> f64 {
        self.logical_height - 2.0 * self.padding
    }
}

/// Bidirectional mapping between data space and logical canvas pixels
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTransform {
    viewport: Viewport,
    domain: DomainBounds,
    min_logical_size: f64,
}

impl CoordinateTransform {
    /// Creates a transform for the given domain and initial container size
    pub fn new(
        domain: DomainBounds,
        size: ContainerSize,
        device_pixel_ratio: f64,
        padding: f64,
        min_logical_size: f64,
    ) -> LabResult<Self> {
        domain.validate()?;
        if !(device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0) {
            return Err(LabError::Configuration(format!(
                "device pixel ratio must be positive, got {device_pixel_ratio}"
            )));
        }
        if !(padding.is_finite() && padding >= 0.0) {
            return Err(LabError::Configuration(format!(
                "padding must be non-negative, got {padding}"
            )));
        }

        // The plot area must keep a positive extent whatever the container does
        let min_logical_size = min_logical_size.max(2.0 * padding + 1.0);
        let mut transform = Self {
            viewport: Viewport {
                logical_width: min_logical_size,
                logical_height: min_logical_size,
                device_pixel_ratio,
                padding,
            },
            domain,
            min_logical_size,
        };
        transform.resize(size.width, size.height);
        Ok(transform)
    }

    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    pub fn domain(&self) -> &DomainBounds {
        &self.domain
    }

    /// Recomputes the viewport for a new container size
    ///
    /// Returns the new backing store size. Sizes below the minimum logical
    /// size (or non-finite sizes) are raised to the minimum.
    pub fn resize(&mut self, logical_width: f64, logical_height: f64) -> BackingStore {
        let sanitize = |v: f64| {
            if v.is_finite() {
                v.max(self.min_logical_size)
            } else {
                self.min_logical_size
            }
        };
        self.viewport.logical_width = sanitize(logical_width);
        self.viewport.logical_height = sanitize(logical_height);
        self.viewport.backing_store()
    }

    /// Updates the device pixel ratio, e.g. when the window moves between screens
    pub fn set_device_pixel_ratio(&mut self, ratio: f64) -> LabResult<BackingStore> {
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(LabError::Configuration(format!(
                "device pixel ratio must be positive, got {ratio}"
            )));
        }
        self.viewport.device_pixel_ratio = ratio;
        Ok(self.viewport.backing_store())
    }

    /// Data space to logical canvas pixels
    pub fn to_canvas(&self, p: DataPoint) -> PixelPoint {
        let v = &self.viewport;
        let d = &self.domain;
        PixelPoint::new(
            v.padding + (p.x - d.min_x) / d.span_x() * v.plot_width(),
            v.logical_height - v.padding - (p.y - d.min_y) / d.span_y() * v.plot_height(),
        )
    }

    /// Logical canvas pixels to data space
    pub fn to_data(&self, p: PixelPoint) -> DataPoint {
        let v = &self.viewport;
        let d = &self.domain;
        DataPoint::new(
            d.min_x + (p.x - v.padding) / v.plot_width() * d.span_x(),
            d.min_y + (v.logical_height - v.padding - p.y) / v.plot_height() * d.span_y(),
        )
    }

    /// Pixels per data unit along x
    pub fn scale_x(&self) -> f64 {
        self.viewport.plot_width() / self.domain.span_x()
    }

    pub fn scale_y(&self) -> f64 {
        self.viewport.plot_height() / self.domain.span_y()
    }

    /// Converts a data-space length to pixels using the mean axis scale
    pub fn length_to_canvas(&self, length: f64) -> f64 {
        length * (self.scale_x() + self.scale_y()) / 2.0
    }

    /// Maps a pointer position in client pixels to logical pixels
    ///
    /// `rendered` is the size the element currently occupies on screen, which
    /// can differ from the logical size while CSS scaling is in effect.
    pub fn client_to_logical(&self, client: PixelPoint, rendered: ContainerSize) -> PixelPoint {
        let sx = if rendered.width > 0.0 {
            self.viewport.logical_width / rendered.width
        } else {
            1.0
        };
        let sy = if rendered.height > 0.0 {
            self.viewport.logical_height / rendered.height
        } else {
            1.0
        };
        PixelPoint::new(client.x * sx, client.y * sy)
    }
}

/// Coalesces container size notifications
///
/// Hosts forward every resize-observer callback; only genuine size changes
/// are passed on to the transform.
#[derive(Debug, Clone, Default)]
pub struct ResizeSignal {
    last: Option<ContainerSize>,
}

impl ResizeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the size when it differs from the last observed one
    pub fn observe(&mut self, size: ContainerSize) -> Option<ContainerSize> {
        if self.last == Some(size) {
            return None;
        }
        self.last = Some(size);
        Some(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn transform(width: f64, height: f64, dpr: f64) -> CoordinateTransform {
        CoordinateTransform::new(
            DomainBounds::default(),
            ContainerSize::new(width, height),
            dpr,
            60.0,
            300.0,
        )
        .unwrap()
    }

    #[test]
    fn test_corners_map_to_padding() {
        let t = transform(800.0, 600.0, 1.0);
        let origin = t.to_canvas(DataPoint::new(0.0, 0.0));
        assert_abs_diff_eq!(origin.x, 60.0);
        assert_abs_diff_eq!(origin.y, 540.0);

        let top_right = t.to_canvas(DataPoint::new(10.0, 10.0));
        assert_abs_diff_eq!(top_right.x, 740.0);
        assert_abs_diff_eq!(top_right.y, 60.0);
    }

    #[test]
    fn test_round_trip_across_sizes() {
        for &(w, h, dpr) in &[(800.0, 600.0, 1.0), (401.5, 977.0, 2.0), (300.0, 300.0, 1.25)] {
            let t = transform(w, h, dpr);
            for i in 0..=10 {
                for j in 0..=10 {
                    let p = DataPoint::new(i as f64 * 0.97, j as f64 * 1.0);
                    let back = t.to_data(t.to_canvas(p));
                    assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-9);
                    assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_resize_updates_backing_store() {
        let mut t = transform(800.0, 600.0, 2.0);
        assert_eq!(t.viewport().backing_store(), BackingStore { width: 1600, height: 1200 });

        let store = t.resize(400.0, 300.0);
        assert_eq!(store, BackingStore { width: 800, height: 600 });

        let p = DataPoint::new(3.3, 7.1);
        let back = t.to_data(t.to_canvas(p));
        assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-9);
    }

    #[test]
    fn test_resize_enforces_minimum() {
        let mut t = transform(800.0, 600.0, 1.0);
        t.resize(50.0, f64::NAN);
        assert_abs_diff_eq!(t.viewport().logical_width, 300.0);
        assert_abs_diff_eq!(t.viewport().logical_height, 300.0);
    }

    #[test]
    fn test_invalid_pixel_ratio_rejected() {
        let result = CoordinateTransform::new(
            DomainBounds::default(),
            ContainerSize::new(800.0, 600.0),
            0.0,
            60.0,
            300.0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_resize_signal_coalesces() {
        let mut signal = ResizeSignal::new();
        assert!(signal.observe(ContainerSize::new(800.0, 600.0)).is_some());
        assert!(signal.observe(ContainerSize::new(800.0, 600.0)).is_none());
        assert!(signal.observe(ContainerSize::new(400.0, 300.0)).is_some());
    }

    #[test]
    fn test_client_to_logical_scaling() {
        let t = transform(800.0, 600.0, 1.0);
        let p = t.client_to_logical(PixelPoint::new(200.0, 150.0), ContainerSize::new(400.0, 300.0));
        assert_abs_diff_eq!(p.x, 400.0);
        assert_abs_diff_eq!(p.y, 300.0);
    }
}
