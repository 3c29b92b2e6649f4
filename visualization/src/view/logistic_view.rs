//! Logistic regression lab view
//!
//! The 1D view plots pass probability against study hours on the lab's
//! curve transform; the 2D view tints the plane by predicted probability
//! and draws the draggable boundary.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use glam::Vec2;
use playground_core::geometry::{CoordinateTransform, DataPoint};
use playground_core::lab::{LogisticLab, ViewMode};
use playground_core::simulation::ClassLabel;
use playground_core::Lab;

use super::grid_view::{draw_axes, draw_grid, GridStyle};
use super::heatmap_view::{draw_regions, probability_color, HeatmapStyle};
use super::{arrival_radius, plot_rect, vec2, LabView};
use crate::engine::canvas::{with_alpha, Canvas, Stroke, TextAlign, TextStyle};
use crate::engine::frame::{FrameContext, Layer};

#[derive(Debug, Clone, PartialEq)]
pub struct LogisticView {
    pub point_radius: f32,
    /// Samples along the sigmoid polyline
    pub curve_samples: usize,
    pub curve_grid: GridStyle,
    pub plane_grid: GridStyle,
    pub regions: HeatmapStyle,
}

impl Default for LogisticView {
    fn default() -> Self {
        Self {
            point_radius: 6.0,
            curve_samples: 120,
            curve_grid: GridStyle {
                step_y: 0.25,
                label_every: 2,
                ..GridStyle::titled("hours studied", "P(pass)")
            },
            plane_grid: GridStyle::default(),
            regions: HeatmapStyle {
                alpha: 0.18,
                ..HeatmapStyle::default()
            },
        }
    }
}

impl LogisticView {
    fn active_transform<'a>(&self, lab: &'a LogisticLab) -> &'a CoordinateTransform {
        match lab.view() {
            ViewMode::OneD => lab.curve_transform(),
            ViewMode::TwoD => lab.transform(),
        }
    }

    fn draw_curve(&self, lab: &LogisticLab, frame: &FrameContext<'_>, canvas: &mut dyn Canvas) {
        let transform = lab.curve_transform();
        let palette = frame.palette;
        let domain = *transform.domain();
        let sigmoid = lab.sigmoid();

        let half = [DataPoint::new(domain.min_x, 0.5), DataPoint::new(domain.max_x, 0.5)];
        canvas.line(
            vec2(transform.to_canvas(half[0])),
            vec2(transform.to_canvas(half[1])),
            Stroke::dashed(palette.muted, 1.0, 6.0, 4.0, 0.0),
        );
        if let Some(x) = sigmoid.crossing() {
            canvas.line(
                vec2(transform.to_canvas(DataPoint::new(x, domain.min_y))),
                vec2(transform.to_canvas(DataPoint::new(x, domain.max_y))),
                Stroke::dashed(with_alpha(palette.highlight, 0.6), 1.0, 4.0, 4.0, 0.0),
            );
        }

        let steps = self.curve_samples.max(2);
        let curve: Vec<Vec2> = (0..=steps)
            .map(|i| {
                let x = domain.min_x + domain.span_x() * i as f64 / steps as f64;
                vec2(transform.to_canvas(DataPoint::new(x, sigmoid.probability(x))))
            })
            .collect();
        canvas.polyline(&curve, Stroke::solid(palette.accent, 3.0));
    }

    fn draw_boundary(&self, lab: &LogisticLab, frame: &FrameContext<'_>, canvas: &mut dyn Canvas) {
        let transform = lab.transform();
        let domain = transform.domain();
        let extent = domain.span_x().max(domain.span_y());
        let (from, to) = lab.boundary().segment(extent);
        let hovered = lab.context().pointer.hovered().is_some();
        let width = if hovered { 4.0 } else { 3.0 };
        canvas.set_clip(Some(plot_rect(transform)));
        canvas.line(
            vec2(transform.to_canvas(from)),
            vec2(transform.to_canvas(to)),
            Stroke::solid(frame.palette.text, width),
        );
        canvas.set_clip(None);
    }
}

impl LabView for LogisticView {
    type Lab = LogisticLab;

    fn name(&self) -> &'static str {
        "logistic-regression"
    }

    fn draw(&self, layer: Layer, lab: &LogisticLab, frame: &FrameContext<'_>, canvas: &mut dyn Canvas) {
        let palette = frame.palette;
        let transform = self.active_transform(lab);
        let grid = match lab.view() {
            ViewMode::OneD => &self.curve_grid,
            ViewMode::TwoD => &self.plane_grid,
        };

        match (layer, lab.view()) {
            (Layer::Background, ViewMode::TwoD) => {
                let boundary = lab.boundary();
                draw_regions(canvas, transform, &self.regions, |p| {
                    Some(probability_color(palette, boundary.probability(&p)))
                });
            }
            (Layer::Background, ViewMode::OneD) => {}
            (Layer::Grid, _) => draw_grid(canvas, transform, grid, palette),
            (Layer::Axes, _) => draw_axes(canvas, transform, grid, palette),
            (Layer::Overlays, ViewMode::OneD) => self.draw_curve(lab, frame, canvas),
            (Layer::Overlays, ViewMode::TwoD) => self.draw_boundary(lab, frame, canvas),
            (Layer::Points, ViewMode::OneD) => {
                for sample in lab.samples() {
                    let y = match sample.label {
                        ClassLabel::A => 0.0,
                        ClassLabel::B => 1.0,
                    };
                    let at = vec2(transform.to_canvas(DataPoint::new(sample.hours, y)));
                    canvas.fill_circle(at, self.point_radius, palette.class(sample.label));
                }
            }
            (Layer::Points, ViewMode::TwoD) => {
                for point in lab.points().iter() {
                    let radius = arrival_radius(self.point_radius, point.transient.animation_scale);
                    canvas.fill_circle(vec2(transform.to_canvas(point.position)), radius, palette.label(point.label));
                }
            }
            (Layer::Markers, _) => {}
            (Layer::Labels, _) => {
                let style = TextStyle {
                    color: palette.text,
                    size: 12.0,
                    align: TextAlign::Left,
                };
                let summary = format!("accuracy {:.0}%", lab.accuracy().percent());
                canvas.text(plot_rect(transform).origin + Vec2::new(8.0, 16.0), &summary, style);

                if let (Some(at), Some(p)) = (lab.hover(), lab.hover_probability()) {
                    let label = format!("P(pass) = {p:.2}");
                    canvas.text(vec2(at) + Vec2::new(12.0, -12.0), &label, style);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::canvas::{DrawCommand, RecordingCanvas};
    use crate::engine::frame::RenderLoop;
    use playground_core::{ContainerSize, LabConfig};

    fn lab() -> LogisticLab {
        LogisticLab::new(LabConfig::seeded(11), ContainerSize::new(800.0, 600.0)).unwrap()
    }

    #[test]
    fn test_curve_view_draws_samples_on_rails() {
        let lab = lab();
        let mut render = RenderLoop::new(RecordingCanvas::new());
        render.frame(16.0, &lab, &LogisticView::default()).unwrap();

        let canvas = render.canvas();
        assert!(canvas.layer_commands(Layer::Background).is_empty());
        assert!(canvas
            .layer_commands(Layer::Overlays)
            .iter()
            .any(|c| matches!(c, DrawCommand::Polyline { points, .. } if points.len() == 121)));
        assert_eq!(canvas.layer_commands(Layer::Points).len(), lab.samples().len());
    }

    #[test]
    fn test_plane_view_tints_and_draws_boundary() {
        let mut lab = lab();
        lab.trigger("view:2d").unwrap();
        let mut render = RenderLoop::new(RecordingCanvas::new());
        render.frame(16.0, &lab, &LogisticView::default()).unwrap();

        let canvas = render.canvas();
        assert!(!canvas.layer_commands(Layer::Background).is_empty());
        let lines = canvas
            .layer_commands(Layer::Overlays)
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count();
        assert_eq!(lines, 1);
        assert_eq!(canvas.layer_commands(Layer::Points).len(), lab.points().len());
    }
}
