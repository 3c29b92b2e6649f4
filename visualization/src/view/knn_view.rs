//! KNN lab view
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use glam::Vec2;
use playground_core::algorithm::knn::Vote;
use playground_core::lab::KnnLab;
use playground_core::Lab;

use super::grid_view::{draw_axes, draw_grid, GridStyle};
use super::{arrival_radius, vec2, LabView, Palette};
use crate::engine::canvas::{with_alpha, Canvas, Color, Stroke, TextAlign, TextStyle};
use crate::engine::frame::{FrameContext, Layer};

#[derive(Debug, Clone, PartialEq)]
pub struct KnnView {
    pub point_radius: f32,
    pub query_radius: f32,
    pub grid: GridStyle,
}

impl Default for KnnView {
    fn default() -> Self {
        Self {
            point_radius: 6.0,
            query_radius: 10.0,
            grid: GridStyle::default(),
        }
    }
}

fn vote_color(palette: &Palette, vote: Option<Vote>) -> Color {
    match vote {
        Some(Vote::Class(class)) => palette.class(class),
        Some(Vote::Tie) => palette.highlight,
        None => palette.unlabeled,
    }
}

fn vote_text(lab: &KnnLab) -> String {
    let result = lab.result();
    let verdict = match result.prediction {
        Some(Vote::Class(class)) => format!("class {class}"),
        Some(Vote::Tie) => "tie".to_owned(),
        None => "no neighbours".to_owned(),
    };
    format!("k={}  A:{} B:{}  {verdict}", lab.k(), result.votes_a, result.votes_b)
}

impl LabView for KnnView {
    type Lab = KnnLab;

    fn name(&self) -> &'static str {
        "knn"
    }

    fn draw(&self, layer: Layer, lab: &KnnLab, frame: &FrameContext<'_>, canvas: &mut dyn Canvas) {
        let transform = lab.transform();
        let palette = frame.palette;
        let result = lab.result();
        let query = vec2(transform.to_canvas(lab.query()));

        match layer {
            Layer::Background => {}
            Layer::Grid => draw_grid(canvas, transform, &self.grid, palette),
            Layer::Axes => draw_axes(canvas, transform, &self.grid, palette),
            Layer::Overlays => {
                if result.neighbors.is_empty() {
                    return;
                }
                let radius = transform.length_to_canvas(result.k_radius) as f32;
                let color = vote_color(palette, result.prediction);
                canvas.fill_circle(query, radius, with_alpha(color, 0.08));
                canvas.stroke_circle(
                    query,
                    radius,
                    Stroke::dashed(with_alpha(color, 0.7), 1.5, 6.0, 4.0, frame.dash_offset(10.0)),
                );
                for neighbor in &result.neighbors {
                    canvas.line(
                        query,
                        vec2(transform.to_canvas(neighbor.position)),
                        Stroke::solid(with_alpha(palette.class(neighbor.class), 0.6), 1.5),
                    );
                }
            }
            Layer::Points => {
                for point in lab.points().iter() {
                    let radius = arrival_radius(self.point_radius, point.transient.animation_scale);
                    canvas.fill_circle(vec2(transform.to_canvas(point.position)), radius, palette.label(point.label));
                }
            }
            Layer::Markers => {
                for neighbor in &result.neighbors {
                    let at = vec2(transform.to_canvas(neighbor.position));
                    canvas.stroke_circle(at, self.point_radius + 3.0, Stroke::solid(palette.highlight, 2.0));
                }
                let color = vote_color(palette, result.prediction);
                canvas.fill_circle(query, self.query_radius, color);
                canvas.stroke_circle(query, self.query_radius, Stroke::solid(palette.text, 2.5));
            }
            Layer::Labels => {
                let style = TextStyle {
                    color: palette.text,
                    size: 12.0,
                    align: TextAlign::Center,
                };
                canvas.text(query + Vec2::new(0.0, -(self.query_radius + 12.0)), &vote_text(lab), style);
            }
        }
    }
}
