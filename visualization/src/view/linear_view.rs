//! Linear regression lab view
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use glam::Vec2;
use playground_core::geometry::DataPoint;
use playground_core::lab::LinearRegressionLab;
use playground_core::Lab;

use super::grid_view::{draw_axes, draw_grid, GridStyle};
use super::{arrival_radius, plot_rect, vec2, LabView};
use crate::engine::canvas::{with_alpha, Canvas, Rect, Stroke, TextAlign, TextStyle};
use crate::engine::frame::{FrameContext, Layer};

#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressionView {
    pub point_radius: f32,
    /// Squared-error boxes next to the residual lines
    pub show_squares: bool,
    pub grid: GridStyle,
}

impl Default for LinearRegressionView {
    fn default() -> Self {
        Self {
            point_radius: 6.0,
            show_squares: true,
            grid: GridStyle::default(),
        }
    }
}

impl LabView for LinearRegressionView {
    type Lab = LinearRegressionLab;

    fn name(&self) -> &'static str {
        "linear-regression"
    }

    fn draw(&self, layer: Layer, lab: &LinearRegressionLab, frame: &FrameContext<'_>, canvas: &mut dyn Canvas) {
        let transform = lab.transform();
        let palette = frame.palette;
        let line = lab.line();
        let domain = *transform.domain();

        match layer {
            Layer::Background => {}
            Layer::Grid => draw_grid(canvas, transform, &self.grid, palette),
            Layer::Axes => draw_axes(canvas, transform, &self.grid, palette),
            Layer::Overlays => {
                canvas.set_clip(Some(plot_rect(transform)));
                if lab.shows_residuals() {
                    for point in lab.points().iter() {
                        let at = vec2(transform.to_canvas(point.position));
                        let fitted = vec2(transform.to_canvas(DataPoint::new(
                            point.position.x,
                            line.predict(point.position.x),
                        )));
                        canvas.line(at, fitted, Stroke::dashed(with_alpha(palette.class_a, 0.7), 1.0, 3.0, 3.0, 0.0));
                        if self.show_squares {
                            let side = (fitted.y - at.y).abs();
                            let origin = Vec2::new(at.x, at.y.min(fitted.y));
                            canvas.fill_rect(Rect::new(origin, Vec2::splat(side)), with_alpha(palette.class_a, 0.08));
                        }
                    }
                }
                let from = DataPoint::new(domain.min_x, line.predict(domain.min_x));
                let to = DataPoint::new(domain.max_x, line.predict(domain.max_x));
                let color = if lab.is_descending() { palette.highlight } else { palette.accent };
                canvas.line(vec2(transform.to_canvas(from)), vec2(transform.to_canvas(to)), Stroke::solid(color, 3.0));
                canvas.set_clip(None);
            }
            Layer::Points => {
                for point in lab.points().iter() {
                    let radius = arrival_radius(self.point_radius, point.transient.animation_scale);
                    canvas.fill_circle(vec2(transform.to_canvas(point.position)), radius, palette.class_b);
                }
            }
            Layer::Markers => {
                for point in lab.points().iter().filter(|p| lab.is_outlier(p.id)) {
                    let at = vec2(transform.to_canvas(point.position));
                    canvas.stroke_circle(at, self.point_radius + 4.0, Stroke::solid(palette.highlight, 2.0));
                }
            }
            Layer::Labels => {
                let mut text = format!("y = {:.2}x + {:.2}", line.slope, line.intercept);
                if let Some(stats) = lab.statistics() {
                    text.push_str(&format!("   R\u{b2} {:.3}   MSE {:.3}", stats.r_squared, stats.mse));
                }
                let style = TextStyle {
                    color: palette.text,
                    size: 13.0,
                    align: TextAlign::Left,
                };
                canvas.text(plot_rect(transform).origin + Vec2::new(8.0, 16.0), &text, style);
            }
        }
    }
}
