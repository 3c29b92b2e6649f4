//! Decision-tree fruit sorting view
//!
//! Drawn in logical pixels: fruit sit at the positions the lab animates,
//! each pile labelled with its last split value and entropy.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use glam::Vec2;
use playground_core::algorithm::decision_tree::FruitKind;
use playground_core::lab::DecisionTreeLab;
use playground_core::Lab;

use super::{vec2, LabView};
use crate::engine::canvas::{with_alpha, Canvas, Color, Rect, Stroke, TextAlign, TextStyle};
use crate::engine::frame::{FrameContext, Layer};

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTreeView {
    pub fruit_radius: f32,
    /// Height of the conveyor band at the bottom of the canvas
    pub floor_height: f32,
}

impl Default for DecisionTreeView {
    fn default() -> Self {
        Self {
            fruit_radius: 16.0,
            floor_height: 50.0,
        }
    }
}

pub fn fruit_color(kind: FruitKind) -> Color {
    match kind.color() {
        "red" => [0.86, 0.15, 0.15, 1.0],
        "green" => [0.4, 0.8, 0.2, 1.0],
        "yellow" => [0.98, 0.86, 0.2, 1.0],
        "orange" => [0.98, 0.55, 0.1, 1.0],
        "purple" => [0.55, 0.25, 0.7, 1.0],
        _ => [0.8, 0.8, 0.8, 1.0],
    }
}

impl DecisionTreeView {
    /// Long fruit are drawn as two overlapping circles, oval fruit smaller
    fn draw_fruit(&self, canvas: &mut dyn Canvas, at: Vec2, kind: FruitKind) {
        let color = fruit_color(kind);
        match kind.shape() {
            "long" => {
                let r = self.fruit_radius * 0.6;
                canvas.fill_circle(at - Vec2::new(r * 0.8, 0.0), r, color);
                canvas.fill_circle(at + Vec2::new(r * 0.8, 0.0), r, color);
            }
            "oval" => canvas.fill_circle(at, self.fruit_radius * 0.8, color),
            _ => canvas.fill_circle(at, self.fruit_radius, color),
        }
    }
}

impl LabView for DecisionTreeView {
    type Lab = DecisionTreeLab;

    fn name(&self) -> &'static str {
        "decision-trees"
    }

    fn draw(&self, layer: Layer, lab: &DecisionTreeLab, frame: &FrameContext<'_>, canvas: &mut dyn Canvas) {
        let palette = frame.palette;
        let viewport = lab.transform().viewport();
        let (width, height) = (viewport.logical_width as f32, viewport.logical_height as f32);
        let sorter = lab.sorter();
        let positions = lab.fruit_positions();

        match layer {
            Layer::Background => {
                let floor = Rect::new(Vec2::new(0.0, height - self.floor_height), Vec2::new(width, self.floor_height));
                canvas.fill_rect(floor, with_alpha(palette.grid, 1.0));
            }
            Layer::Grid | Layer::Axes | Layer::Markers => {}
            Layer::Overlays => {
                // Faint bracket under each pile
                for pile in sorter.piles() {
                    let xs: Vec<f32> = pile.members.iter().filter_map(|&m| positions.get(m)).map(|p| p.x as f32).collect();
                    let (Some(min), Some(max)) = (
                        xs.iter().copied().reduce(f32::min),
                        xs.iter().copied().reduce(f32::max),
                    ) else {
                        continue;
                    };
                    let y = height - self.floor_height - 8.0;
                    canvas.line(
                        Vec2::new(min - self.fruit_radius, y),
                        Vec2::new(max + self.fruit_radius, y),
                        Stroke::solid(with_alpha(palette.muted, 0.6), 2.0),
                    );
                }
            }
            Layer::Points => {
                for (fruit, at) in sorter.fruits().iter().zip(&positions) {
                    self.draw_fruit(canvas, vec2(*at), fruit.kind);
                }
            }
            Layer::Labels => {
                let style = TextStyle {
                    color: palette.text,
                    size: 12.0,
                    align: TextAlign::Center,
                };
                for pile in sorter.piles() {
                    let members: Vec<Vec2> = pile.members.iter().filter_map(|&m| positions.get(m)).map(|p| vec2(*p)).collect();
                    if members.is_empty() {
                        continue;
                    }
                    let center_x = members.iter().map(|p| p.x).sum::<f32>() / members.len() as f32;
                    let text = format!("{} (H={:.2})", pile.label(), sorter.pile_entropy(pile));
                    canvas.text(Vec2::new(center_x, height - self.floor_height / 2.0), &text, style);
                }
                let summary = format!("depth {}  entropy {:.2} bits", sorter.depth(), sorter.overall_entropy());
                canvas.text(
                    Vec2::new(12.0, 20.0),
                    &summary,
                    TextStyle {
                        align: TextAlign::Left,
                        ..style
                    },
                );
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

    #[test]
    fn test_single_pile_is_labelled_mixed() {
        let lab = DecisionTreeLab::new(LabConfig::seeded(4), ContainerSize::new(800.0, 600.0)).unwrap();
        let mut render = RenderLoop::new(RecordingCanvas::new());
        render.frame(16.0, &lab, &DecisionTreeView::default()).unwrap();

        let labels: Vec<&str> = render
            .canvas()
            .layer_commands(Layer::Labels)
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].starts_with("mixed"));
        assert!(render.canvas().layer_commands(Layer::Grid).is_empty());
    }

    #[test]
    fn test_every_fruit_is_drawn() {
        let lab = DecisionTreeLab::new(LabConfig::seeded(4), ContainerSize::new(800.0, 600.0)).unwrap();
        let mut render = RenderLoop::new(RecordingCanvas::new());
        render.frame(16.0, &lab, &DecisionTreeView::default()).unwrap();

        let long = lab.sorter().fruits().iter().filter(|f| f.kind.shape() == "long").count();
        let circles = render.canvas().layer_commands(Layer::Points).len();
        assert_eq!(circles, lab.sorter().fruits().len() + long);
    }

    #[test]
    fn test_fruit_colors_are_distinct() {
        assert_ne!(fruit_color(FruitKind::RedApple), fruit_color(FruitKind::GreenApple));
        assert_eq!(fruit_color(FruitKind::Banana), fruit_color(FruitKind::Lemon));
    }
}
