//! # ML Playground visualization
//!
//! The render loop of the labs: a read-only projection of lab state onto a
//! 2D [`Canvas`], drawn layer by layer in a fixed z-order. A
//! [`RecordingCanvas`] stands in for a real surface in tests and in the
//! headless demo.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use thiserror::Error;

pub mod engine;
pub mod view;

pub use engine::{Canvas, DrawCommand, FrameContext, Layer, RecordingCanvas, RenderLoop};
pub use view::{
    AssociationView, DecisionTreeView, KMeansView, KnnView, LabView, LinearRegressionView, LogisticView, Palette,
    SvmView,
};

/// Surface faults raised by the render loop
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid surface size {width}x{height}")]
    InvalidSurface { width: u32, height: u32 },

    #[error("Invalid device pixel ratio {0}")]
    InvalidPixelRatio(f32),
}
