//! K-means lab view
//!
//! Voronoi tint behind the grid, ghost trails of recent centroid positions,
//! dashed spider lines from each revealed point to its centroid and pulsing
//! centroid markers. Points not yet reached by the staggered reveal keep the
//! unlabeled color.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use glam::Vec2;
use playground_core::algorithm::kmeans::nearest_centroid;
use playground_core::interaction::HitTarget;
use playground_core::lab::KMeansLab;
use playground_core::simulation::PointLabel;
use playground_core::Lab;

use super::grid_view::{draw_axes, draw_grid, GridStyle};
use super::heatmap_view::{draw_regions, HeatmapStyle};
use super::{arrival_radius, vec2, LabView};
use crate::engine::canvas::{with_alpha, Canvas, Stroke, TextAlign, TextStyle};
use crate::engine::frame::{FrameContext, Layer};

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansView {
    pub point_radius: f32,
    pub centroid_radius: f32,
    pub show_voronoi: bool,
    pub grid: GridStyle,
    pub regions: HeatmapStyle,
    /// Period of the centroid glow
    pub pulse_ms: f64,
}

impl Default for KMeansView {
    fn default() -> Self {
        Self {
            point_radius: 6.0,
            centroid_radius: 12.0,
            show_voronoi: true,
            grid: GridStyle::default(),
            regions: HeatmapStyle::default(),
            pulse_ms: 1600.0,
        }
    }
}

impl KMeansView {
    /// Label shown for the point at `index`, hiding assignments not yet revealed
    fn shown_label(&self, lab: &KMeansLab, index: usize, label: PointLabel) -> PointLabel {
        match lab.reveal() {
            Some(reveal) if !reveal.is_revealed(index, lab.context().now_ms()) => PointLabel::Unlabeled,
            _ => label,
        }
    }
}

impl LabView for KMeansView {
    type Lab = KMeansLab;

    fn name(&self) -> &'static str {
        "kmeans"
    }

    fn draw(&self, layer: Layer, lab: &KMeansLab, frame: &FrameContext<'_>, canvas: &mut dyn Canvas) {
        let transform = lab.transform();
        let palette = frame.palette;
        let centroids = lab.displayed_centroids();

        match layer {
            Layer::Background => {
                if self.show_voronoi && !centroids.is_empty() {
                    draw_regions(canvas, transform, &self.regions, |p| {
                        Some(palette.cluster(nearest_centroid(&centroids, &p)))
                    });
                }
            }
            Layer::Grid => draw_grid(canvas, transform, &self.grid, palette),
            Layer::Axes => draw_axes(canvas, transform, &self.grid, palette),
            Layer::Overlays => {
                let history = lab.engine().history();
                if history.len() > 1 {
                    for (cluster, _) in centroids.iter().enumerate() {
                        let trail: Vec<Vec2> = history
                            .iter()
                            .filter_map(|snapshot| snapshot.get(cluster))
                            .map(|p| vec2(transform.to_canvas(*p)))
                            .collect();
                        if trail.len() > 1 {
                            canvas.polyline(&trail, Stroke::solid(with_alpha(palette.cluster(cluster), 0.35), 1.5));
                        }
                    }
                }

                let offset = frame.dash_offset(12.0);
                for (index, point) in lab.points().iter().enumerate() {
                    let PointLabel::Cluster(cluster) = self.shown_label(lab, index, point.label) else {
                        continue;
                    };
                    let Some(centroid) = centroids.get(cluster) else {
                        continue;
                    };
                    canvas.line(
                        vec2(transform.to_canvas(point.position)),
                        vec2(transform.to_canvas(*centroid)),
                        Stroke::dashed(with_alpha(palette.cluster(cluster), 0.3), 1.0, 4.0, 4.0, offset),
                    );
                }
            }
            Layer::Points => {
                for (index, point) in lab.points().iter().enumerate() {
                    let color = palette.label(self.shown_label(lab, index, point.label));
                    let radius = arrival_radius(self.point_radius, point.transient.animation_scale);
                    canvas.fill_circle(vec2(transform.to_canvas(point.position)), radius, color);
                }
            }
            Layer::Markers => {
                let hovered = match lab.context().pointer.hovered() {
                    Some(HitTarget::Centroid(i)) => Some(i),
                    _ => None,
                };
                let glow = frame.pulse(self.pulse_ms);
                for (index, centroid) in centroids.iter().enumerate() {
                    let at = vec2(transform.to_canvas(*centroid));
                    let color = palette.cluster(index);
                    let radius = if hovered == Some(index) {
                        self.centroid_radius * 1.25
                    } else {
                        self.centroid_radius
                    };
                    canvas.fill_circle(at, radius + 4.0 + 6.0 * glow, with_alpha(color, 0.15 + 0.15 * glow));
                    canvas.fill_circle(at, radius, color);
                    canvas.stroke_circle(at, radius, Stroke::solid(palette.text, 2.0));
                }
            }
            Layer::Labels => {
                let style = TextStyle {
                    color: palette.text,
                    size: 12.0,
                    align: TextAlign::Center,
                };
                if let Some(HitTarget::Centroid(index)) = lab.context().pointer.hovered() {
                    if let Some(centroid) = centroids.get(index) {
                        let at = vec2(transform.to_canvas(*centroid));
                        let text = format!("C{} ({:.1}, {:.1})", index + 1, centroid.x, centroid.y);
                        canvas.text(at + Vec2::new(0.0, -(self.centroid_radius + 10.0)), &text, style);
                    }
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

    fn lab() -> KMeansLab {
        let mut lab = KMeansLab::new(LabConfig::seeded(7), ContainerSize::new(800.0, 600.0)).unwrap();
        lab.trigger("load-preset:clusters").unwrap();
        lab
    }

    #[test]
    fn test_no_tint_before_seeding() {
        let lab = lab();
        let mut render = RenderLoop::new(RecordingCanvas::new());
        render.frame(16.0, &lab, &KMeansView::default()).unwrap();
        assert!(render.canvas().layer_commands(Layer::Background).is_empty());
        assert!(render.canvas().layer_commands(Layer::Markers).is_empty());
        let points = render.canvas().layer_commands(Layer::Points).len();
        assert_eq!(points, lab.points().len());
    }

    #[test]
    fn test_centroids_drawn_after_seeding() {
        let mut lab = lab();
        lab.trigger("init-centroids").unwrap();
        let mut render = RenderLoop::new(RecordingCanvas::new());
        render.frame(16.0, &lab, &KMeansView::default()).unwrap();
        let markers = render.canvas().layer_commands(Layer::Markers);
        // glow, body and ring per centroid
        assert_eq!(markers.len(), 3 * 3);
        assert!(!render.canvas().layer_commands(Layer::Background).is_empty());
    }

    #[test]
    fn test_spider_lines_follow_reveal() {
        let mut lab = lab();
        lab.trigger("init-centroids").unwrap();
        lab.trigger("step-assign").unwrap();
        let view = KMeansView::default();

        let mut render = RenderLoop::new(RecordingCanvas::new());
        render.frame(16.0, &lab, &view).unwrap();
        let early = render
            .canvas()
            .layer_commands(Layer::Overlays)
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count();

        for _ in 0..400 {
            lab.tick(16.0);
        }
        render.canvas_mut().reset();
        render.frame(16.0, &lab, &view).unwrap();
        let late = render
            .canvas()
            .layer_commands(Layer::Overlays)
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count();
        assert!(early < late);
        assert_eq!(late, lab.points().len());
    }
}
