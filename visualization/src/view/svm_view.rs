//! SVM lab view
//!
//! Predicted half-planes tint the background. With a linear kernel the
//! hyperplane and both margin lines are drawn as long segments clipped to
//! the plot area; support vectors get a ring whichever kernel is active.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use glam::Vec2;
use playground_core::algorithm::svm::Hyperplane;
use playground_core::geometry::{CoordinateTransform, DataPoint};
use playground_core::lab::SvmLab;
use playground_core::Lab;

use super::grid_view::{draw_axes, draw_grid, GridStyle};
use super::heatmap_view::{draw_regions, HeatmapStyle};
use super::{arrival_radius, plot_rect, vec2, LabView};
use crate::engine::canvas::{with_alpha, Canvas, Stroke, TextAlign, TextStyle};
use crate::engine::frame::{FrameContext, Layer};

#[derive(Debug, Clone, PartialEq)]
pub struct SvmView {
    pub point_radius: f32,
    /// Ring radius around support vectors
    pub support_radius: f32,
    pub grid: GridStyle,
    pub regions: HeatmapStyle,
}

impl Default for SvmView {
    fn default() -> Self {
        Self {
            point_radius: 6.0,
            support_radius: 11.0,
            grid: GridStyle::default(),
            regions: HeatmapStyle::default(),
        }
    }
}

/// Segment of `w1 x + w2 y + b = offset` spanning the whole domain
fn level_line(transform: &CoordinateTransform, plane: &Hyperplane, offset: f64) -> Option<(Vec2, Vec2)> {
    let norm = plane.w1.hypot(plane.w2);
    if !(norm > 0.0) {
        return None;
    }
    let (nx, ny) = (plane.w1 / norm, plane.w2 / norm);
    let domain = transform.domain();
    let center = domain.center();
    // Project the domain center onto the line, then extend both ways
    let distance = plane.signed_distance(&center) - offset;
    let foot = DataPoint::new(center.x - nx * distance, center.y - ny * distance);
    let reach = domain.span_x().hypot(domain.span_y());
    let a = DataPoint::new(foot.x - ny * reach, foot.y + nx * reach);
    let b = DataPoint::new(foot.x + ny * reach, foot.y - nx * reach);
    Some((vec2(transform.to_canvas(a)), vec2(transform.to_canvas(b))))
}

impl LabView for SvmView {
    type Lab = SvmLab;

    fn name(&self) -> &'static str {
        "svm"
    }

    fn draw(&self, layer: Layer, lab: &SvmLab, frame: &FrameContext<'_>, canvas: &mut dyn Canvas) {
        let transform = lab.transform();
        let palette = frame.palette;
        let fit = lab.fit();

        match layer {
            Layer::Background => {
                draw_regions(canvas, transform, &self.regions, |p| fit.predict(&p).map(|c| palette.class(c)));
            }
            Layer::Grid => draw_grid(canvas, transform, &self.grid, palette),
            Layer::Axes => draw_axes(canvas, transform, &self.grid, palette),
            Layer::Overlays => {
                let Some(plane) = fit.hyperplane else {
                    return;
                };
                canvas.set_clip(Some(plot_rect(transform)));
                if let Some((a, b)) = level_line(transform, &plane, 0.0) {
                    canvas.line(a, b, Stroke::solid(palette.text, 2.5));
                }
                let half = fit.margin / 2.0;
                for side in [-half, half] {
                    if let Some((a, b)) = level_line(transform, &plane, side) {
                        canvas.line(a, b, Stroke::dashed(with_alpha(palette.text, 0.5), 1.5, 8.0, 6.0, 0.0));
                    }
                }
                canvas.set_clip(None);
            }
            Layer::Points => {
                for point in lab.points().iter() {
                    let radius = arrival_radius(self.point_radius, point.transient.animation_scale);
                    canvas.fill_circle(vec2(transform.to_canvas(point.position)), radius, palette.label(point.label));
                }
            }
            Layer::Markers => {
                for sv in &fit.support_vectors {
                    let at = vec2(transform.to_canvas(sv.position));
                    canvas.stroke_circle(at, self.support_radius, Stroke::solid(palette.highlight, 2.0));
                }
            }
            Layer::Labels => {
                let area = plot_rect(transform);
                let accuracy = lab.accuracy();
                let text = if fit.is_empty() {
                    "add points of both classes".to_owned()
                } else {
                    format!(
                        "{} kernel  margin {:.2}  SVs {}  accuracy {:.0}%",
                        fit.kernel.name(),
                        fit.margin,
                        fit.support_vectors.len(),
                        accuracy.percent()
                    )
                };
                let style = TextStyle {
                    color: palette.text,
                    size: 12.0,
                    align: TextAlign::Left,
                };
                canvas.text(area.origin + Vec2::new(8.0, 16.0), &text, style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::canvas::{DrawCommand, RecordingCanvas};
    use crate::engine::frame::RenderLoop;
    use approx::assert_relative_eq;
    use playground_core::{ContainerSize, LabConfig};

    fn transform() -> CoordinateTransform {
        CoordinateTransform::new(
            playground_core::DomainBounds::square(0.0, 10.0),
            ContainerSize::new(800.0, 600.0),
            1.0,
            60.0,
            300.0,
        )
        .unwrap()
    }

    #[test]
    fn test_vertical_level_line() {
        let transform = transform();
        let plane = Hyperplane { w1: 1.0, w2: 0.0, b: -5.0 };
        let (a, b) = level_line(&transform, &plane, 1.0).unwrap();
        let x = transform.to_canvas(DataPoint::new(6.0, 0.0)).x as f32;
        assert_relative_eq!(a.x, x, epsilon = 1e-3);
        assert_relative_eq!(b.x, x, epsilon = 1e-3);
        assert!(level_line(&transform, &Hyperplane { w1: 0.0, w2: 0.0, b: 1.0 }, 0.0).is_none());
    }

    #[test]
    fn test_boundary_and_margins_are_clipped() {
        let lab = SvmLab::new(LabConfig::seeded(5), ContainerSize::new(800.0, 600.0)).unwrap();
        let mut render = RenderLoop::new(RecordingCanvas::new());
        render.frame(16.0, &lab, &SvmView::default()).unwrap();

        let overlays = render.canvas().layer_commands(Layer::Overlays);
        assert!(matches!(overlays.first(), Some(DrawCommand::Clip(Some(_)))));
        assert!(matches!(overlays.last(), Some(DrawCommand::Clip(None))));
        let lines = overlays.iter().filter(|c| matches!(c, DrawCommand::Line { .. })).count();
        assert_eq!(lines, 3);

        let rings = render.canvas().layer_commands(Layer::Markers).len();
        assert_eq!(rings, lab.fit().support_vectors.len());
        assert!(rings >= 2);
    }
}
