//! 2D drawing surface abstraction
//!
//! Views draw in logical pixels; a surface applies the device pixel ratio
//! itself after [`Canvas::resize`]. [`RecordingCanvas`] keeps every call as
//! a [`DrawCommand`] so frames can be inspected without a window.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use glam::Vec2;
use log::trace;
use playground_core::geometry::BackingStore;

use crate::engine::frame::Layer;
use crate::RenderError;

/// Straight RGBA in `[0, 1]`
pub type Color = [f32; 4];

/// Returns `color` with its alpha replaced
pub fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
}

/// Linear blend from `a` to `b`
pub fn mix(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Dash pattern in logical pixels; `offset` animates marching ants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dash {
    pub on: f32,
    pub off: f32,
    pub offset: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    pub dash: Option<Dash>,
}

impl Stroke {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f32, on: f32, off: f32, offset: f32) -> Self {
        Self {
            color,
            width,
            dash: Some(Dash { on, off, offset }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub size: f32,
    pub align: TextAlign,
}

/// Axis-aligned rectangle in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.origin).all() && p.cmple(self.max()).all()
    }
}

/// Immediate-mode drawing surface owned by the render loop
pub trait Canvas {
    /// Reallocates the backing store; later calls stay in logical pixels
    fn resize(&mut self, backing: BackingStore, device_pixel_ratio: f32) -> Result<(), RenderError>;

    /// Marks the start of a z-order layer
    fn begin_layer(&mut self, layer: Layer);

    fn clear(&mut self, color: Color);

    /// Restricts drawing to `rect`, or lifts the restriction
    fn set_clip(&mut self, rect: Option<Rect>);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);

    fn line(&mut self, from: Vec2, to: Vec2, stroke: Stroke);

    fn polyline(&mut self, points: &[Vec2], stroke: Stroke);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn stroke_circle(&mut self, center: Vec2, radius: f32, stroke: Stroke);

    fn text(&mut self, at: Vec2, text: &str, style: TextStyle);
}

/// One recorded canvas call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Resize { backing: BackingStore, scale: f32 },
    BeginLayer(Layer),
    Clear(Color),
    Clip(Option<Rect>),
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, stroke: Stroke },
    Line { from: Vec2, to: Vec2, stroke: Stroke },
    Polyline { points: Vec<Vec2>, stroke: Stroke },
    FillCircle { center: Vec2, radius: f32, color: Color },
    StrokeCircle { center: Vec2, radius: f32, stroke: Stroke },
    Text { at: Vec2, text: String, style: TextStyle },
}

impl DrawCommand {
    /// Whether every coordinate in the command is finite
    pub fn is_finite(&self) -> bool {
        match self {
            DrawCommand::Resize { scale, .. } => scale.is_finite(),
            DrawCommand::BeginLayer(_) | DrawCommand::Clear(_) => true,
            DrawCommand::Clip(rect) => rect.map_or(true, |r| r.origin.is_finite() && r.size.is_finite()),
            DrawCommand::FillRect { rect, .. } | DrawCommand::StrokeRect { rect, .. } => {
                rect.origin.is_finite() && rect.size.is_finite()
            }
            DrawCommand::Line { from, to, .. } => from.is_finite() && to.is_finite(),
            DrawCommand::Polyline { points, .. } => points.iter().all(|p| p.is_finite()),
            DrawCommand::FillCircle { center, radius, .. } | DrawCommand::StrokeCircle { center, radius, .. } => {
                center.is_finite() && radius.is_finite()
            }
            DrawCommand::Text { at, .. } => at.is_finite(),
        }
    }
}

/// Canvas that stores the commands of the current frame
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    backing: Option<BackingStore>,
    scale: f32,
    commands: Vec<DrawCommand>,
    resizes: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            ..Self::default()
        }
    }

    pub fn backing(&self) -> Option<BackingStore> {
        self.backing
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Number of backing-store reallocations so far
    pub fn resize_count(&self) -> usize {
        self.resizes
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Layers in the order they were begun
    pub fn layers(&self) -> Vec<Layer> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::BeginLayer(layer) => Some(*layer),
                _ => None,
            })
            .collect()
    }

    /// Commands recorded between the start of `layer` and the next layer
    pub fn layer_commands(&self, layer: Layer) -> &[DrawCommand] {
        let Some(start) = self
            .commands
            .iter()
            .position(|c| *c == DrawCommand::BeginLayer(layer))
        else {
            return &[];
        };
        let rest = &self.commands[start + 1..];
        let end = rest
            .iter()
            .position(|c| matches!(c, DrawCommand::BeginLayer(_)))
            .unwrap_or(rest.len());
        &rest[..end]
    }

    /// Drops the recorded commands, keeping the surface size
    pub fn reset(&mut self) {
        self.commands.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn resize(&mut self, backing: BackingStore, device_pixel_ratio: f32) -> Result<(), RenderError> {
        if backing.width == 0 || backing.height == 0 {
            return Err(RenderError::InvalidSurface {
                width: backing.width,
                height: backing.height,
            });
        }
        if !(device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0) {
            return Err(RenderError::InvalidPixelRatio(device_pixel_ratio));
        }
        trace!("recording surface resized to {}x{}", backing.width, backing.height);
        self.backing = Some(backing);
        self.scale = device_pixel_ratio;
        self.resizes += 1;
        self.commands.push(DrawCommand::Resize {
            backing,
            scale: device_pixel_ratio,
        });
        Ok(())
    }

    fn begin_layer(&mut self, layer: Layer) {
        self.commands.push(DrawCommand::BeginLayer(layer));
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn set_clip(&mut self, rect: Option<Rect>) {
        self.commands.push(DrawCommand::Clip(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.commands.push(DrawCommand::StrokeRect { rect, stroke });
    }

    fn line(&mut self, from: Vec2, to: Vec2, stroke: Stroke) {
        self.commands.push(DrawCommand::Line { from, to, stroke });
    }

    fn polyline(&mut self, points: &[Vec2], stroke: Stroke) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            stroke,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle { center, radius, color });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, stroke: Stroke) {
        self.commands.push(DrawCommand::StrokeCircle { center, radius, stroke });
    }

    fn text(&mut self, at: Vec2, text: &str, style: TextStyle) {
        self.commands.push(DrawCommand::Text {
            at,
            text: text.to_owned(),
            style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_resize_rejects_empty_surface() {
        let mut canvas = RecordingCanvas::new();
        let result = canvas.resize(BackingStore { width: 0, height: 10 }, 1.0);
        assert!(matches!(result, Err(RenderError::InvalidSurface { width: 0, .. })));
        assert!(canvas.backing().is_none());
    }

    #[test]
    fn test_layer_commands_are_sliced() {
        let mut canvas = RecordingCanvas::new();
        canvas.begin_layer(Layer::Grid);
        canvas.line(Vec2::ZERO, Vec2::ONE, Stroke::solid([1.0; 4], 1.0));
        canvas.begin_layer(Layer::Points);
        canvas.fill_circle(Vec2::ONE, 3.0, [1.0; 4]);
        canvas.fill_circle(Vec2::ONE, 4.0, [1.0; 4]);
        assert_eq!(canvas.layers(), vec![Layer::Grid, Layer::Points]);
        assert_eq!(canvas.layer_commands(Layer::Points).len(), 2);
        assert!(canvas.layer_commands(Layer::Labels).is_empty());
    }

    #[test]
    fn test_color_helpers() {
        let c = mix([0.0, 0.0, 0.0, 1.0], [1.0, 0.5, 0.0, 1.0], 0.5);
        assert_relative_eq!(c[0], 0.5);
        assert_relative_eq!(c[1], 0.25);
        assert_eq!(with_alpha(c, 2.0)[3], 1.0);
    }
}
