//! Simulation state: the point set owned by a lab
//!
//! Points are created by explicit user action or by preset generators,
//! mutated synchronously by interaction handlers and destroyed on clear or
//! reset. Stored positions are always inside the lab's data domain.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod presets;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LabError, LabResult};
use crate::geometry::{DataPoint, DomainBounds};

pub use presets::{Preset, PresetGenerator, Sample};

/// Stable identifier of a point within one lab session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointId(pub u32);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Binary class used by the supervised labs
///
/// `A` is rendered red and stands for class 0 (e.g. "fail"), `B` is blue
/// and stands for class 1 (e.g. "pass").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassLabel {
    A,
    B,
}

impl ClassLabel {
    pub fn other(self) -> ClassLabel {
        match self {
            ClassLabel::A => ClassLabel::B,
            ClassLabel::B => ClassLabel::A,
        }
    }

    /// Signed target used by the margin classifiers
    pub fn sign(self) -> f64 {
        match self {
            ClassLabel::A => -1.0,
            ClassLabel::B => 1.0,
        }
    }

    /// Parses host brush names, accepting both class letters and colors
    pub fn parse(value: &str) -> Option<ClassLabel> {
        match value.trim().to_ascii_lowercase().as_str() {
            "a" | "red" | "0" | "fail" => Some(ClassLabel::A),
            "b" | "blue" | "1" | "pass" => Some(ClassLabel::B),
            _ => None,
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::A => write!(f, "A"),
            ClassLabel::B => write!(f, "B"),
        }
    }
}

/// Label carried by a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointLabel {
    /// No class, or not yet assigned to a cluster
    Unlabeled,
    Class(ClassLabel),
    Cluster(usize),
}

impl PointLabel {
    pub fn class(&self) -> Option<ClassLabel> {
        match self {
            PointLabel::Class(c) => Some(*c),
            _ => None,
        }
    }

    pub fn cluster(&self) -> Option<usize> {
        match self {
            PointLabel::Cluster(c) => Some(*c),
            _ => None,
        }
    }
}

/// Presentation-only state of a point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transient {
    pub is_dragged: bool,
    /// Arrival animation progress in `[0, 1]`
    pub animation_scale: f64,
}

impl Default for Transient {
    fn default() -> Self {
        Self {
            is_dragged: false,
            animation_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub position: DataPoint,
    pub label: PointLabel,
    #[serde(skip)]
    pub transient: Transient,
}

/// Arrival animation growth per 16 ms frame
const ARRIVAL_STEP_PER_FRAME: f64 = 0.1;
const FRAME_MS: f64 = 16.0;

/// Ordered collection of points constrained to a data domain
#[derive(Debug, Clone)]
pub struct PointSet {
    points: Vec<Point>,
    next_id: u32,
    domain: DomainBounds,
    min_separation: f64,
}

impl PointSet {
    pub fn new(domain: DomainBounds, min_separation: f64) -> Self {
        Self {
            points: Vec::new(),
            next_id: 0,
            domain,
            min_separation,
        }
    }

    #[inline]
    pub fn domain(&self) -> &DomainBounds {
        &self.domain
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    pub fn get(&self, id: PointId) -> Option<&Point> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn index_of(&self, id: PointId) -> Option<usize> {
        self.points.iter().position(|p| p.id == id)
    }

    /// Positions in insertion order
    pub fn positions(&self) -> Vec<DataPoint> {
        self.points.iter().map(|p| p.position).collect()
    }

    fn allocate_id(&mut self) -> PointId {
        let id = PointId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Adds a point placed by the user
    ///
    /// Fails when the position lies outside the domain or within the
    /// minimum separation of an existing point. New points start their
    /// arrival animation at scale zero.
    pub fn add_point(&mut self, position: DataPoint, label: PointLabel) -> LabResult<PointId> {
        if !position.is_finite() || !self.domain.contains(&position) {
            return Err(LabError::OutOfBounds {
                x: position.x,
                y: position.y,
            });
        }
        if self
            .points
            .iter()
            .any(|p| p.position.distance(&position) < self.min_separation)
        {
            return Err(LabError::TooClose {
                x: position.x,
                y: position.y,
                min_separation: self.min_separation,
            });
        }

        let id = self.allocate_id();
        self.points.push(Point {
            id,
            position,
            label,
            transient: Transient {
                is_dragged: false,
                animation_scale: 0.0,
            },
        });
        Ok(id)
    }

    /// Inserts a generated sample, clamped into the domain
    ///
    /// Generator output skips the separation check; presets are allowed to
    /// produce dense clusters.
    pub fn insert_sample(&mut self, sample: Sample) -> PointId {
        let id = self.allocate_id();
        self.points.push(Point {
            id,
            position: self.domain.clamp(sample.position),
            label: sample.label,
            transient: Transient::default(),
        });
        id
    }

    /// Replaces the whole set with generated samples
    pub fn replace_with(&mut self, samples: impl IntoIterator<Item = Sample>) {
        self.points.clear();
        for sample in samples {
            self.insert_sample(sample);
        }
    }

    /// Moves a point, clamping into the domain shrunk by `margin`
    pub fn move_point(&mut self, id: PointId, position: DataPoint, margin: f64) -> LabResult<DataPoint> {
        let clamped = self.domain.clamp_with_margin(position, margin);
        let point = self
            .points
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| LabError::UnknownEntity(format!("point {id}")))?;
        point.position = clamped;
        Ok(clamped)
    }

    pub fn remove_point(&mut self, id: PointId) -> Option<Point> {
        let index = self.index_of(id)?;
        Some(self.points.remove(index))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn set_label_at(&mut self, index: usize, label: PointLabel) {
        if let Some(point) = self.points.get_mut(index) {
            point.label = label;
        }
    }

    /// Drops every cluster assignment back to unlabeled
    pub fn reset_cluster_labels(&mut self) {
        for point in &mut self.points {
            if matches!(point.label, PointLabel::Cluster(_)) {
                point.label = PointLabel::Unlabeled;
            }
        }
    }

    pub fn set_dragged(&mut self, id: PointId, dragged: bool) {
        if let Some(point) = self.points.iter_mut().find(|p| p.id == id) {
            point.transient.is_dragged = dragged;
        }
    }

    /// Clears the drag flag on every point
    pub fn release_all(&mut self) {
        for point in &mut self.points {
            point.transient.is_dragged = false;
        }
    }

    /// Advances point arrival animations by `dt_ms`
    pub fn advance_arrivals(&mut self, dt_ms: f64) {
        let step = ARRIVAL_STEP_PER_FRAME * (dt_ms / FRAME_MS);
        for point in &mut self.points {
            if point.transient.animation_scale < 1.0 {
                point.transient.animation_scale = (point.transient.animation_scale + step).min(1.0);
            }
        }
    }

    pub fn count_class(&self, class: ClassLabel) -> usize {
        self.points
            .iter()
            .filter(|p| p.label == PointLabel::Class(class))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> PointSet {
        PointSet::new(DomainBounds::default(), 0.3)
    }

    #[test]
    fn test_add_rejects_out_of_bounds() {
        let mut points = set();
        let err = points
            .add_point(DataPoint::new(10.5, 3.0), PointLabel::Unlabeled)
            .unwrap_err();
        assert!(matches!(err, LabError::OutOfBounds { .. }));
        assert!(points.is_empty());
    }

    #[test]
    fn test_add_rejects_close_duplicates() {
        let mut points = set();
        points
            .add_point(DataPoint::new(5.0, 5.0), PointLabel::Class(ClassLabel::A))
            .unwrap();
        let err = points
            .add_point(DataPoint::new(5.1, 5.1), PointLabel::Class(ClassLabel::A))
            .unwrap_err();
        assert!(matches!(err, LabError::TooClose { .. }));
        assert!(points
            .add_point(DataPoint::new(5.4, 5.0), PointLabel::Class(ClassLabel::B))
            .is_ok());
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_move_clamps_to_margin() {
        let mut points = set();
        let id = points
            .add_point(DataPoint::new(5.0, 5.0), PointLabel::Unlabeled)
            .unwrap();
        let stored = points.move_point(id, DataPoint::new(-40.0, 12.0), 0.5).unwrap();
        assert_eq!(stored, DataPoint::new(0.5, 9.5));
        assert_eq!(points.get(id).unwrap().position, stored);
    }

    #[test]
    fn test_move_unknown_point() {
        let mut points = set();
        assert!(points.move_point(PointId(99), DataPoint::new(1.0, 1.0), 0.0).is_err());
    }

    #[test]
    fn test_ids_are_not_reused_after_removal() {
        let mut points = set();
        let a = points.add_point(DataPoint::new(1.0, 1.0), PointLabel::Unlabeled).unwrap();
        points.remove_point(a);
        let b = points.add_point(DataPoint::new(1.0, 1.0), PointLabel::Unlabeled).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_arrival_animation_completes() {
        let mut points = set();
        let id = points.add_point(DataPoint::new(2.0, 2.0), PointLabel::Unlabeled).unwrap();
        assert_eq!(points.get(id).unwrap().transient.animation_scale, 0.0);
        for _ in 0..12 {
            points.advance_arrivals(16.0);
        }
        assert_eq!(points.get(id).unwrap().transient.animation_scale, 1.0);
    }

    #[test]
    fn test_reset_cluster_labels_keeps_classes() {
        let mut points = set();
        points.insert_sample(Sample::new(1.0, 1.0, PointLabel::Cluster(2)));
        points.insert_sample(Sample::new(3.0, 3.0, PointLabel::Class(ClassLabel::B)));
        points.reset_cluster_labels();
        assert_eq!(points.as_slice()[0].label, PointLabel::Unlabeled);
        assert_eq!(points.as_slice()[1].label, PointLabel::Class(ClassLabel::B));
    }
}
