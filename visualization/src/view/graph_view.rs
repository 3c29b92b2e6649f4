//! Association-rule graph view
//!
//! Items sit on a circle; each mined rule is a link from antecedent to
//! consequent whose width follows its confidence. The selected rule is
//! drawn in the highlight color with its metrics in the corner.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use glam::Vec2;
use playground_core::interaction::HitTarget;
use playground_core::lab::AssociationLab;
use playground_core::Lab;

use super::{vec2, LabView};
use crate::engine::canvas::{with_alpha, Canvas, Stroke, TextAlign, TextStyle};
use crate::engine::frame::{FrameContext, Layer};

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationView {
    pub node_radius: f32,
    /// Arrowhead length in logical pixels
    pub arrow_px: f32,
}

impl Default for AssociationView {
    fn default() -> Self {
        Self {
            node_radius: 26.0,
            arrow_px: 10.0,
        }
    }
}

impl AssociationView {
    /// Link endpoints trimmed to the node rims
    fn trimmed(&self, from: Vec2, to: Vec2) -> Option<(Vec2, Vec2)> {
        let direction = (to - from).try_normalize()?;
        Some((from + direction * self.node_radius, to - direction * self.node_radius))
    }
}

impl LabView for AssociationView {
    type Lab = AssociationLab;

    fn name(&self) -> &'static str {
        "association-rules"
    }

    fn draw(&self, layer: Layer, lab: &AssociationLab, frame: &FrameContext<'_>, canvas: &mut dyn Canvas) {
        let palette = frame.palette;
        let graph = lab.graph();
        let selected = lab.selected_rule();

        match layer {
            Layer::Overlays => {
                let hovered = match lab.context().pointer.hovered() {
                    Some(HitTarget::Link(i)) => Some(i),
                    _ => None,
                };
                for (index, rule) in lab.rules().iter().enumerate() {
                    let Some((from, to)) = graph.link_segment(index) else {
                        continue;
                    };
                    let Some((from, to)) = self.trimmed(vec2(from), vec2(to)) else {
                        continue;
                    };
                    let width = 1.0 + 3.0 * rule.confidence as f32;
                    let stroke = if selected == Some(index) {
                        Stroke::solid(palette.highlight, width + 2.0)
                    } else if hovered == Some(index) {
                        Stroke::solid(palette.text, width + 1.0)
                    } else {
                        Stroke::solid(with_alpha(palette.accent, 0.7), width)
                    };
                    canvas.line(from, to, stroke);

                    let back = (from - to).normalize_or_zero() * self.arrow_px;
                    let side = back.perp() * 0.5;
                    canvas.polyline(&[to + back + side, to, to + back - side], stroke);
                }
            }
            Layer::Markers => {
                for node in &graph.nodes {
                    let at = vec2(node.position);
                    canvas.fill_circle(at, self.node_radius, palette.background);
                    canvas.stroke_circle(at, self.node_radius, Stroke::solid(palette.accent, 2.0));
                }
            }
            Layer::Labels => {
                let centered = TextStyle {
                    color: palette.text,
                    size: 12.0,
                    align: TextAlign::Center,
                };
                for node in &graph.nodes {
                    canvas.text(vec2(node.position) + Vec2::new(0.0, 4.0), node.item.key(), centered);
                }

                let corner = Vec2::new(16.0, 24.0);
                let left = TextStyle {
                    align: TextAlign::Left,
                    ..centered
                };
                let text = match selected.and_then(|i| lab.rules().get(i)) {
                    Some(rule) => format!(
                        "{} \u{2192} {}   support {:.2}   confidence {:.2}   lift {:.2}",
                        rule.antecedent, rule.consequent, rule.support, rule.confidence, rule.lift
                    ),
                    None if lab.rules().is_empty() => "no rules at these thresholds".to_owned(),
                    None => format!("{} rules from {} baskets", lab.rules().len(), lab.transaction_count()),
                };
                canvas.text(corner, &text, left);
            }
            Layer::Background | Layer::Grid | Layer::Axes | Layer::Points => {}
        }
    }
}
