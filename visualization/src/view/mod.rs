//! Lab views
//!
//! A view turns one lab's read-only state into canvas calls, one layer at a
//! time. Views hold only presentation settings; everything that animates is
//! sampled from the lab's own clock or the frame context.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use glam::Vec2;
use playground_core::geometry::{CoordinateTransform, PixelPoint};
use playground_core::simulation::{ClassLabel, PointLabel};
use playground_core::Lab;

use crate::engine::canvas::{Canvas, Color, Rect};
use crate::engine::frame::{FrameContext, Layer};

pub mod graph_view;
pub mod grid_view;
pub mod heatmap_view;
pub mod kmeans_view;
pub mod knn_view;
pub mod linear_view;
pub mod logistic_view;
pub mod svm_view;
pub mod tree_view;

pub use graph_view::AssociationView;
pub use kmeans_view::KMeansView;
pub use knn_view::KnnView;
pub use linear_view::LinearRegressionView;
pub use logistic_view::LogisticView;
pub use svm_view::SvmView;
pub use tree_view::DecisionTreeView;

/// Read-only projection of one lab kind
pub trait LabView {
    type Lab: Lab;

    fn name(&self) -> &'static str;

    /// Draws `layer`; layers a view has nothing for are left empty
    fn draw(&self, layer: Layer, lab: &Self::Lab, frame: &FrameContext<'_>, canvas: &mut dyn Canvas);
}

/// Colors shared by every view
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub grid: Color,
    pub axis: Color,
    pub text: Color,
    pub muted: Color,
    pub class_a: Color,
    pub class_b: Color,
    pub unlabeled: Color,
    pub accent: Color,
    pub highlight: Color,
    /// Cluster colors, reused cyclically
    pub clusters: Vec<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [0.04, 0.05, 0.09, 1.0],
            grid: [1.0, 1.0, 1.0, 0.06],
            axis: [1.0, 1.0, 1.0, 0.35],
            text: [0.9, 0.92, 0.96, 1.0],
            muted: [0.55, 0.58, 0.65, 1.0],
            class_a: [0.94, 0.27, 0.27, 1.0],
            class_b: [0.23, 0.51, 0.96, 1.0],
            unlabeled: [0.75, 0.78, 0.85, 1.0],
            accent: [0.55, 0.36, 0.96, 1.0],
            highlight: [0.98, 0.8, 0.08, 1.0],
            clusters: vec![
                [0.94, 0.27, 0.27, 1.0],
                [0.23, 0.51, 0.96, 1.0],
                [0.13, 0.77, 0.37, 1.0],
                [0.96, 0.62, 0.04, 1.0],
                [0.55, 0.36, 0.96, 1.0],
                [0.93, 0.28, 0.6, 1.0],
                [0.08, 0.72, 0.65, 1.0],
                [0.98, 0.45, 0.09, 1.0],
            ],
        }
    }
}

impl Palette {
    pub fn class(&self, class: ClassLabel) -> Color {
        match class {
            ClassLabel::A => self.class_a,
            ClassLabel::B => self.class_b,
        }
    }

    pub fn cluster(&self, index: usize) -> Color {
        if self.clusters.is_empty() {
            return self.accent;
        }
        self.clusters[index % self.clusters.len()]
    }

    pub fn label(&self, label: PointLabel) -> Color {
        match label {
            PointLabel::Unlabeled => self.unlabeled,
            PointLabel::Class(class) => self.class(class),
            PointLabel::Cluster(index) => self.cluster(index),
        }
    }
}

#[inline]
pub fn vec2(p: PixelPoint) -> Vec2 {
    Vec2::new(p.x as f32, p.y as f32)
}

/// Plot area inside the padding, in logical pixels
pub fn plot_rect(transform: &CoordinateTransform) -> Rect {
    let v = transform.viewport();
    Rect::new(
        Vec2::new(v.padding as f32, v.padding as f32),
        Vec2::new(v.plot_width() as f32, v.plot_height() as f32),
    )
}

/// Radius of a point marker growing in on arrival
pub fn arrival_radius(base: f32, animation_scale: f64) -> f32 {
    base * animation_scale.clamp(0.0, 1.0) as f32
}
