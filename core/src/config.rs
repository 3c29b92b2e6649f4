//! Lab tuning constants
//!
//! The hit radii, convergence epsilon and animation timings are presentation
//! tuning values. They are collected here so hosts can override them from a
//! JSON document; every field falls back to its default when absent.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LabError, LabResult};
use crate::geometry::DomainBounds;

/// Hit-test radii in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitRadii {
    /// K-means centroids
    pub centroid: f64,
    /// KNN query marker
    pub query_marker: f64,
    /// Plain data points (regression, SVM clicks)
    pub point: f64,
    /// Draggable SVM support vectors
    pub support_vector: f64,
    /// Association rule links
    pub link: f64,
    /// Vertical tolerance around the 1D sigmoid curve
    pub curve: f64,
}

impl Default for HitRadii {
    fn default() -> Self {
        Self {
            centroid: 20.0,
            query_marker: 25.0,
            point: 15.0,
            support_vector: 20.0,
            link: 15.0,
            curve: 30.0,
        }
    }
}

/// Animation and scheduling timings in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Minimum spacing between paint-stroke point insertions
    pub paint_throttle_ms: f64,
    /// Delay between automatic k-means steps
    pub auto_step_delay_ms: f64,
    /// Per-point stagger of the assignment reveal
    pub assign_stagger_ms: f64,
    /// Tail added after the last staggered assignment
    pub assign_settle_ms: f64,
    /// Duration of the centroid update phase
    pub update_phase_ms: f64,
    /// Duration of the centroid glide animation
    pub centroid_glide_ms: f64,
    /// Duration of the gradient-descent line tween
    pub gradient_descent_ms: f64,
    /// Duration of a fruit pile move
    pub fruit_move_ms: f64,
    /// Per-fruit stagger when piles move
    pub fruit_stagger_ms: f64,
    /// Delay between automatic tree splits
    pub auto_sort_delay_ms: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            paint_throttle_ms: 50.0,
            auto_step_delay_ms: 500.0,
            assign_stagger_ms: 20.0,
            assign_settle_ms: 300.0,
            update_phase_ms: 600.0,
            centroid_glide_ms: 500.0,
            gradient_descent_ms: 2000.0,
            fruit_move_ms: 800.0,
            fruit_stagger_ms: 50.0,
            auto_sort_delay_ms: 1500.0,
        }
    }
}

/// Complete configuration shared by all labs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Logical data domain
    pub domain: DomainBounds,
    /// Logical pixels reserved around the plot for axes and labels
    pub padding: f64,
    /// Smallest logical canvas edge
    pub min_logical_size: f64,
    /// Initial device pixel ratio
    pub device_pixel_ratio: f64,
    pub hit_radii: HitRadii,
    /// Dragged entities stay this far inside the domain edges
    pub drag_margin: f64,
    /// Minimum data-space distance between painted points
    pub min_separation: f64,
    /// Total centroid displacement below which k-means is converged
    pub convergence_epsilon: f64,
    /// Ghost-trail snapshots kept for rendering
    pub history_capacity: usize,
    pub timings: Timings,
    /// Seed for preset generators; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            domain: DomainBounds::default(),
            padding: 60.0,
            min_logical_size: 300.0,
            device_pixel_ratio: 1.0,
            hit_radii: HitRadii::default(),
            drag_margin: 0.5,
            min_separation: 0.3,
            convergence_epsilon: 0.01,
            history_capacity: 10,
            timings: Timings::default(),
            seed: None,
        }
    }
}

impl LabConfig {
    /// Default configuration with a fixed RNG seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Parses overrides from a JSON document
    pub fn from_json_str(json: &str) -> LabResult<Self> {
        let config: LabConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads overrides from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> LabResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Checks the structural invariants of the configuration
    pub fn validate(&self) -> LabResult<()> {
        self.domain.validate()?;

        let radii = &self.hit_radii;
        let positive = [
            ("hit_radii.centroid", radii.centroid),
            ("hit_radii.query_marker", radii.query_marker),
            ("hit_radii.point", radii.point),
            ("hit_radii.support_vector", radii.support_vector),
            ("hit_radii.link", radii.link),
            ("hit_radii.curve", radii.curve),
            ("device_pixel_ratio", self.device_pixel_ratio),
            ("convergence_epsilon", self.convergence_epsilon),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(LabError::Configuration(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if self.padding < 0.0 || self.drag_margin < 0.0 || self.min_separation < 0.0 {
            return Err(LabError::Configuration(
                "padding, drag_margin and min_separation must be non-negative".into(),
            ));
        }
        if self.history_capacity == 0 {
            return Err(LabError::Configuration(
                "history_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
