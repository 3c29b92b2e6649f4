//! Interactive logistic regression lab
//!
//! Two views share the lab. The 1D view plots pass probability against
//! hours studied and lets the user drag the sigmoid sideways. The 2D view
//! shows a straight decision boundary over study and sleep hours with a
//! probability heatmap; the boundary can be dragged and clicks add
//! students (shift-click adds a failing one).
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, info};

use super::{Lab, LabCommand, LabContext, LabKind, LabSnapshot, LabStatistics, ViewMode};
use crate::algorithm::logistic::{Accuracy, Boundary2d, Sigmoid1d, StudySample, BIAS_DRAG_RANGE, POSITION_RANGE};
use crate::algorithm::{find_parameter, ContinuousModel, LabParameter};
use crate::config::LabConfig;
use crate::error::{LabError, LabResult};
use crate::geometry::viewport::{BackingStore, ContainerSize, CoordinateTransform};
use crate::geometry::{DataPoint, DomainBounds, PixelPoint};
use crate::interaction::{
    HitCandidate, HitPriority, HitShape, HitTarget, PointerEvent, PointerEventKind, PointerIntent, PressBehavior,
};
use crate::simulation::{ClassLabel, PointLabel, PointSet, Preset, PresetGenerator};

pub const WEIGHT_RANGE: (f64, f64) = (0.1, 3.0);
pub const ANGLE_RANGE: (f64, f64) = (0.0, 180.0);
pub const THRESHOLD_RANGE: (f64, f64) = (0.1, 0.9);

/// Hours on x, probability on y
const CURVE_DOMAIN: DomainBounds = DomainBounds {
    min_x: 0.0,
    max_x: 10.0,
    min_y: 0.0,
    max_y: 1.0,
};

#[derive(Debug)]
pub struct LogisticLab {
    context: LabContext,
    view: ViewMode,
    curve_transform: CoordinateTransform,
    sigmoid: Sigmoid1d,
    boundary: Boundary2d,
    samples: Vec<StudySample>,
    points: PointSet,
    hover: Option<PixelPoint>,
    accuracy: Accuracy,
}

impl LogisticLab {
    /// A lab with freshly generated students in both views
    pub fn new(config: LabConfig, size: ContainerSize) -> LabResult<Self> {
        let curve_transform = CoordinateTransform::new(
            CURVE_DOMAIN,
            size,
            config.device_pixel_ratio,
            config.padding,
            config.min_logical_size,
        )?;
        let points = PointSet::new(config.domain, config.min_separation);
        let mut lab = Self {
            context: LabContext::new(config, size)?,
            view: ViewMode::OneD,
            curve_transform,
            sigmoid: Sigmoid1d::default(),
            boundary: Boundary2d::default(),
            samples: Vec::new(),
            points,
            hover: None,
            accuracy: Accuracy::default(),
        };
        lab.generate();
        Ok(lab)
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn sigmoid(&self) -> &Sigmoid1d {
        &self.sigmoid
    }

    pub fn boundary(&self) -> &Boundary2d {
        &self.boundary
    }

    pub fn samples(&self) -> &[StudySample] {
        &self.samples
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    /// Transform of the 1D view: hours against probability
    pub fn curve_transform(&self) -> &CoordinateTransform {
        &self.curve_transform
    }

    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    /// Last pointer position over the canvas
    pub fn hover(&self) -> Option<PixelPoint> {
        self.hover
    }

    /// Probability under the pointer in the active view
    pub fn hover_probability(&self) -> Option<f64> {
        let at = self.hover?;
        match self.view {
            ViewMode::OneD => {
                let hours = self.curve_transform.to_data(at).x;
                (CURVE_DOMAIN.min_x..=CURVE_DOMAIN.max_x)
                    .contains(&hours)
                    .then(|| self.sigmoid.probability(hours))
            }
            ViewMode::TwoD => {
                let p = self.context.to_data(at);
                self.points.domain().contains(&p).then(|| self.boundary.probability(&p))
            }
        }
    }

    fn recompute(&mut self) {
        self.accuracy = match self.view {
            ViewMode::OneD => self.sigmoid.recompute(&self.samples),
            ViewMode::TwoD => self.boundary.recompute(&self.points),
        };
    }

    /// Regenerates the students of both views
    pub fn generate(&mut self) {
        self.samples = PresetGenerator::study_hours_1d(&mut self.context.rng)
            .into_iter()
            .map(|(hours, label)| StudySample { hours, label })
            .collect();
        self.points
            .replace_with(PresetGenerator::generate(Preset::StudyHours, &mut self.context.rng));
        self.recompute();
        info!(
            "logistic: generated {} 1D and {} 2D students",
            self.samples.len(),
            self.points.len()
        );
    }

    /// Clears the students of the active view only
    pub fn clear(&mut self) {
        match self.view {
            ViewMode::OneD => self.samples.clear(),
            ViewMode::TwoD => self.points.clear(),
        }
        self.recompute();
    }

    pub fn set_view(&mut self, view: ViewMode) {
        if self.view != view {
            self.view = view;
            self.context.pointer.reset();
            self.recompute();
            debug!("logistic: switched to {view:?}");
        }
    }

    fn add_student(&mut self, at: PixelPoint, shift: bool) {
        if self.view != ViewMode::TwoD {
            return;
        }
        let label = if shift { ClassLabel::A } else { ClassLabel::B };
        let position = self.context.to_data(at);
        match self.points.add_point(position, PointLabel::Class(label)) {
            Ok(_) => self.recompute(),
            Err(error) => {
                self.context.ignore_rejected(LabKind::LogisticRegression, error);
            }
        }
    }

    fn drag(&mut self, target: HitTarget, at: PixelPoint) {
        match target {
            HitTarget::Curve => {
                let hours = self.curve_transform.to_data(at).x;
                self.sigmoid.drag_crossing_to(hours);
            }
            HitTarget::Boundary => {
                let p = self.context.to_data(at);
                self.boundary.drag_to(&p);
            }
            _ => return,
        }
        self.recompute();
    }

    fn hit_candidates(&self, at: PixelPoint) -> Vec<HitCandidate> {
        let tolerance = self.context.config().hit_radii.curve;
        match self.view {
            ViewMode::OneD => {
                let hours = self.curve_transform.to_data(at).x;
                let on_curve = self
                    .curve_transform
                    .to_canvas(DataPoint::new(hours, self.sigmoid.probability(hours)));
                if (at.y - on_curve.y).abs() < tolerance {
                    vec![HitCandidate {
                        target: HitTarget::Curve,
                        shape: HitShape::Anywhere,
                        priority: HitPriority::Marker,
                    }]
                } else {
                    Vec::new()
                }
            }
            ViewMode::TwoD => {
                let extent = self.points.domain().span_x().max(self.points.domain().span_y());
                let (from, to) = self.boundary.segment(extent);
                vec![HitCandidate {
                    target: HitTarget::Boundary,
                    shape: HitShape::Segment {
                        from: self.context.to_canvas(from),
                        to: self.context.to_canvas(to),
                        tolerance,
                    },
                    priority: HitPriority::Marker,
                }]
            }
        }
    }
}

impl Lab for LogisticLab {
    fn kind(&self) -> LabKind {
        LabKind::LogisticRegression
    }

    fn context(&self) -> &LabContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut LabContext {
        &mut self.context
    }

    fn parameters(&self) -> Vec<LabParameter> {
        let view = match self.view {
            ViewMode::OneD => "1d",
            ViewMode::TwoD => "2d",
        };
        vec![
            LabParameter::choice("view", view, &["1d", "2d"]),
            LabParameter::float("weight", self.sigmoid.weight, WEIGHT_RANGE.0, WEIGHT_RANGE.1),
            LabParameter::float("bias", self.sigmoid.bias, BIAS_DRAG_RANGE.0, BIAS_DRAG_RANGE.1),
            LabParameter::float("angle", self.boundary.angle_deg, ANGLE_RANGE.0, ANGLE_RANGE.1),
            LabParameter::float("position", self.boundary.position, POSITION_RANGE.0, POSITION_RANGE.1),
            LabParameter::float("threshold", self.boundary.threshold, THRESHOLD_RANGE.0, THRESHOLD_RANGE.1),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> LabResult<()> {
        let parameters = self.parameters();
        let descriptor = find_parameter(&parameters, name)?;
        match name {
            "view" => {
                let view = match descriptor.parse_choice(value)? {
                    "2d" => ViewMode::TwoD,
                    _ => ViewMode::OneD,
                };
                self.set_view(view);
                return Ok(());
            }
            "weight" => self.sigmoid.weight = descriptor.parse_float(value)?,
            "bias" => self.sigmoid.bias = descriptor.parse_float(value)?,
            "angle" => self.boundary.angle_deg = descriptor.parse_float(value)?,
            "position" => self.boundary.position = descriptor.parse_float(value)?,
            "threshold" => self.boundary.threshold = descriptor.parse_float(value)?,
            _ => return Err(LabError::invalid_parameter(name, "unknown parameter")),
        }
        self.recompute();
        Ok(())
    }

    fn trigger_action(&mut self, command: &LabCommand) -> LabResult<()> {
        self.context.clear_notices();
        let result = match command {
            LabCommand::Clear => {
                self.clear();
                Ok(())
            }
            LabCommand::LoadPreset(name) if matches!(name.as_str(), "generate" | "study-hours") => {
                self.generate();
                Ok(())
            }
            LabCommand::LoadPreset(name) => Err(LabError::UnknownPreset {
                lab: LabKind::LogisticRegression.id().into(),
                preset: name.clone(),
            }),
            LabCommand::View(view) => {
                self.set_view(*view);
                Ok(())
            }
            other => Err(other.unsupported(LabKind::LogisticRegression)),
        };
        result.or_else(|error| self.context.report(LabKind::LogisticRegression, error))
    }

    fn handle_pointer(&mut self, event: &PointerEvent) {
        self.hover = match event.kind {
            PointerEventKind::Leave => None,
            _ => Some(event.position),
        };
        let candidates = self.hit_candidates(event.position);
        let press = match self.view {
            ViewMode::OneD => PressBehavior::Ignore,
            ViewMode::TwoD => PressBehavior::Click,
        };
        match self.context.pointer.handle(event, &candidates, press) {
            PointerIntent::Click { at, shift } => self.add_student(at, shift),
            PointerIntent::DragTo(target, at) => self.drag(target, at),
            _ => {}
        }
    }

    fn resize(&mut self, size: ContainerSize) -> Option<BackingStore> {
        let backing = self.context.resize(size)?;
        self.curve_transform.resize(size.width, size.height);
        Some(backing)
    }

    fn tick(&mut self, dt_ms: f64) {
        self.context.advance_clock(dt_ms);
        self.points.advance_arrivals(dt_ms);
    }

    fn snapshot(&self) -> LabSnapshot {
        let point_count = match self.view {
            ViewMode::OneD => self.samples.len(),
            ViewMode::TwoD => self.points.len(),
        };
        LabSnapshot {
            lab: LabKind::LogisticRegression,
            phase: match self.view {
                ViewMode::OneD => "1d",
                ViewMode::TwoD => "2d",
            }
            .to_owned(),
            parameters: self.parameters(),
            statistics: LabStatistics::LogisticRegression {
                view: self.view,
                accuracy: self.accuracy,
                crossing: self.sigmoid.crossing(),
                hover_probability: self.hover_probability(),
            },
            notices: self.context.notices().to_vec(),
            cursor: self.cursor(),
            point_count,
            auto_running: false,
            animating: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lab() -> LogisticLab {
        LogisticLab::new(LabConfig::seeded(21), ContainerSize::new(800.0, 600.0)).unwrap()
    }

    #[test]
    fn test_generates_both_views() {
        let lab = lab();
        assert_eq!(lab.samples().len(), 25);
        assert_eq!(lab.points().len(), 30);
        assert_eq!(lab.accuracy().total, 25);
    }

    #[test]
    fn test_curve_drag_moves_crossing() {
        let mut lab = lab();
        let on_curve = lab.curve_transform().to_canvas(DataPoint::new(5.0, 0.5));
        let target = lab.curve_transform().to_canvas(DataPoint::new(3.0, 0.5));
        lab.handle_pointer(&PointerEvent::down(on_curve.x, on_curve.y + 10.0, 0.0));
        lab.handle_pointer(&PointerEvent::moved(target.x, target.y, 16.0));
        lab.handle_pointer(&PointerEvent::up(target.x, target.y, 32.0));
        assert_relative_eq!(lab.sigmoid().bias, -3.0, epsilon = 1e-9);
        assert_relative_eq!(lab.sigmoid().crossing().unwrap(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_press_far_from_curve_does_nothing() {
        let mut lab = lab();
        let below = lab.curve_transform().to_canvas(DataPoint::new(9.0, 0.05));
        lab.handle_pointer(&PointerEvent::down(below.x, below.y, 0.0));
        lab.handle_pointer(&PointerEvent::moved(below.x - 100.0, below.y, 16.0));
        assert_eq!(lab.sigmoid().bias, -5.0);
    }

    #[test]
    fn test_shift_click_adds_failing_student() {
        let mut lab = lab();
        lab.trigger("view:2d").unwrap();
        lab.trigger("clear").unwrap();
        assert_eq!(lab.samples().len(), 25);

        let at = lab.context.to_canvas(DataPoint::new(2.0, 2.0));
        lab.handle_pointer(&PointerEvent::down(at.x, at.y, 0.0).with_shift());
        lab.handle_pointer(&PointerEvent::up(at.x, at.y, 5.0));
        let at = lab.context.to_canvas(DataPoint::new(8.0, 8.0));
        lab.handle_pointer(&PointerEvent::down(at.x, at.y, 10.0));
        assert_eq!(lab.points().count_class(ClassLabel::A), 1);
        assert_eq!(lab.points().count_class(ClassLabel::B), 1);
    }

    #[test]
    fn test_boundary_drag_is_clamped() {
        let mut lab = lab();
        lab.set_parameter("view", "2d").unwrap();
        let anchor = lab.context.to_canvas(DataPoint::new(5.0, 5.0));
        let far = lab.context.to_canvas(DataPoint::new(9.9, 9.9));
        lab.handle_pointer(&PointerEvent::down(anchor.x, anchor.y, 0.0));
        lab.handle_pointer(&PointerEvent::moved(far.x, far.y, 16.0));
        assert_eq!(lab.boundary().position, 90.0);
        assert_eq!(lab.get_parameter("position").unwrap(), "90");
    }

    #[test]
    fn test_hover_probability_follows_view() {
        let mut lab = lab();
        let mid = lab.curve_transform().to_canvas(DataPoint::new(5.0, 0.9));
        lab.handle_pointer(&PointerEvent::moved(mid.x, mid.y, 0.0));
        assert_relative_eq!(lab.hover_probability().unwrap(), 0.5, epsilon = 1e-9);
        lab.handle_pointer(&PointerEvent::leave(10.0));
        assert!(lab.hover_probability().is_none());
    }
}
