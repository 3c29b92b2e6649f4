//! Region tints sampled over the plot area
//!
//! The plot rectangle is cut into square cells; each cell is colored by the
//! field value at its center. Used for Voronoi cells, SVM half-planes and
//! logistic probability.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use glam::Vec2;
use playground_core::geometry::{CoordinateTransform, DataPoint, PixelPoint};

use super::{plot_rect, Palette};
use crate::engine::canvas::{mix, with_alpha, Canvas, Color, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapStyle {
    /// Cell edge in logical pixels
    pub cell_px: f32,
    pub alpha: f32,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            cell_px: 16.0,
            alpha: 0.12,
        }
    }
}

/// Fills every plot cell whose center maps to `Some(color)`
///
/// Returns the number of cells filled.
pub fn draw_regions<F>(
    canvas: &mut dyn Canvas,
    transform: &CoordinateTransform,
    style: &HeatmapStyle,
    mut color_at: F,
) -> usize
where
    F: FnMut(DataPoint) -> Option<Color>,
{
    let area = plot_rect(transform);
    let cell = style.cell_px.max(2.0);
    let columns = (area.size.x / cell).ceil() as usize;
    let rows = (area.size.y / cell).ceil() as usize;
    let mut filled = 0;

    for row in 0..rows {
        for column in 0..columns {
            let origin = area.origin + Vec2::new(column as f32 * cell, row as f32 * cell);
            // Edge cells are trimmed to the plot area
            let size = (area.max() - origin).min(Vec2::splat(cell));
            let center = origin + size / 2.0;
            let data = transform.to_data(PixelPoint::new(center.x as f64, center.y as f64));
            if let Some(color) = color_at(data) {
                canvas.fill_rect(Rect::new(origin, size), with_alpha(color, color[3] * style.alpha));
                filled += 1;
            }
        }
    }
    filled
}

/// Class A to class B gradient for a probability of class B
pub fn probability_color(palette: &Palette, probability: f64) -> Color {
    mix(palette.class_a, palette.class_b, probability.clamp(0.0, 1.0) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::canvas::{DrawCommand, RecordingCanvas};
    use playground_core::geometry::{ContainerSize, DomainBounds};

    #[test]
    fn test_cells_tile_plot_area() {
        let transform =
            CoordinateTransform::new(DomainBounds::square(0.0, 10.0), ContainerSize::new(400.0, 300.0), 1.0, 60.0, 300.0)
                .unwrap();
        let mut canvas = RecordingCanvas::new();
        let style = HeatmapStyle {
            cell_px: 40.0,
            alpha: 1.0,
        };
        // Plot area is 280 x 180: 7 columns by 5 rows, the last row trimmed
        let filled = draw_regions(&mut canvas, &transform, &style, |p| (p.x < 4.5).then_some([1.0; 4]));
        assert_eq!(filled, 3 * 5);
        let last = canvas.commands().iter().rev().find_map(|c| match c {
            DrawCommand::FillRect { rect, .. } => Some(*rect),
            _ => None,
        });
        assert!(last.unwrap().max().y <= 240.0 + 1e-3);
    }

    #[test]
    fn test_probability_gradient_ends() {
        let palette = Palette::default();
        assert_eq!(probability_color(&palette, 0.0), palette.class_a);
        assert_eq!(probability_color(&palette, 2.0), palette.class_b);
    }
}
