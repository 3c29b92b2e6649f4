//! Grid and axes shared by the data-space labs
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use glam::Vec2;
use playground_core::geometry::{CoordinateTransform, DataPoint};

use super::{vec2, Palette};
use crate::engine::canvas::{Canvas, Stroke, TextAlign, TextStyle};

/// Grid and axis settings
#[derive(Debug, Clone, PartialEq)]
pub struct GridStyle {
    /// Data units between grid lines on x
    pub step_x: f64,
    /// Data units between grid lines on y
    pub step_y: f64,
    /// Tick labels on every n-th grid line
    pub label_every: usize,
    pub line_width: f32,
    pub font_size: f32,
    pub x_title: Option<&'static str>,
    pub y_title: Option<&'static str>,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            step_x: 1.0,
            step_y: 1.0,
            label_every: 2,
            line_width: 1.0,
            font_size: 11.0,
            x_title: None,
            y_title: None,
        }
    }
}

impl GridStyle {
    pub fn titled(x_title: &'static str, y_title: &'static str) -> Self {
        Self {
            x_title: Some(x_title),
            y_title: Some(y_title),
            ..Self::default()
        }
    }
}

/// Multiples of `step` inside `[min, max]`
fn ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !(max >= min) {
        return Vec::new();
    }
    let first = (min / step).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

fn tick_label(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.1}")
    }
}

pub fn draw_grid(canvas: &mut dyn Canvas, transform: &CoordinateTransform, style: &GridStyle, palette: &Palette) {
    let d = *transform.domain();
    let stroke = Stroke::solid(palette.grid, style.line_width);
    for x in ticks(d.min_x, d.max_x, style.step_x) {
        let from = transform.to_canvas(DataPoint::new(x, d.min_y));
        let to = transform.to_canvas(DataPoint::new(x, d.max_y));
        canvas.line(vec2(from), vec2(to), stroke);
    }
    for y in ticks(d.min_y, d.max_y, style.step_y) {
        let from = transform.to_canvas(DataPoint::new(d.min_x, y));
        let to = transform.to_canvas(DataPoint::new(d.max_x, y));
        canvas.line(vec2(from), vec2(to), stroke);
    }
}

pub fn draw_axes(canvas: &mut dyn Canvas, transform: &CoordinateTransform, style: &GridStyle, palette: &Palette) {
    let d = *transform.domain();
    let origin = vec2(transform.to_canvas(DataPoint::new(d.min_x, d.min_y)));
    let x_end = vec2(transform.to_canvas(DataPoint::new(d.max_x, d.min_y)));
    let y_end = vec2(transform.to_canvas(DataPoint::new(d.min_x, d.max_y)));
    let stroke = Stroke::solid(palette.axis, style.line_width * 1.5);
    canvas.line(origin, x_end, stroke);
    canvas.line(origin, y_end, stroke);

    let every = style.label_every.max(1);
    let label = |align| TextStyle {
        color: palette.muted,
        size: style.font_size,
        align,
    };
    for x in ticks(d.min_x, d.max_x, style.step_x).into_iter().step_by(every) {
        let at = vec2(transform.to_canvas(DataPoint::new(x, d.min_y)));
        canvas.text(at + Vec2::new(0.0, 16.0), &tick_label(x), label(TextAlign::Center));
    }
    for y in ticks(d.min_y, d.max_y, style.step_y).into_iter().step_by(every) {
        let at = vec2(transform.to_canvas(DataPoint::new(d.min_x, y)));
        canvas.text(at + Vec2::new(-8.0, 4.0), &tick_label(y), label(TextAlign::Right));
    }

    if let Some(title) = style.x_title {
        let at = (origin + x_end) / 2.0 + Vec2::new(0.0, 36.0);
        canvas.text(at, title, label(TextAlign::Center));
    }
    if let Some(title) = style.y_title {
        canvas.text(y_end + Vec2::new(0.0, -14.0), title, label(TextAlign::Left));
    }
}
