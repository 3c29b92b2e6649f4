//! Drawing surface and frame scheduling
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod canvas;
pub mod frame;

pub use canvas::{Canvas, Color, Dash, DrawCommand, RecordingCanvas, Rect, Stroke, TextAlign, TextStyle};
pub use frame::{FrameContext, FrameStats, Layer, RenderLoop};
