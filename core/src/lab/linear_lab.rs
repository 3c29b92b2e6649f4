//! Interactive linear regression lab
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, info};

use super::{Lab, LabCommand, LabContext, LabKind, LabSnapshot, LabStatistics};
use crate::algorithm::regression::{optimal_line, outlier_position, FitStatistics, Line, LinearModel};
use crate::algorithm::{find_parameter, ContinuousModel, LabParameter};
use crate::config::LabConfig;
use crate::error::{LabError, LabResult};
use crate::execution::{EasingFunction, Tween};
use crate::geometry::viewport::ContainerSize;
use crate::geometry::PixelPoint;
use crate::interaction::{HitCandidate, HitTarget, PointerEvent, PointerIntent, PressBehavior};
use crate::simulation::{PointId, PointLabel, PointSet, Preset, PresetGenerator};

pub const SLOPE_RANGE: (f64, f64) = (-2.0, 3.0);
pub const INTERCEPT_RANGE: (f64, f64) = (0.0, 10.0);
pub const PHASE_RANGE: (i64, i64) = (1, 4);
/// Narrative phase from which residuals and their squares are drawn
pub const RESIDUAL_PHASE: i64 = 3;

#[derive(Debug)]
pub struct LinearRegressionLab {
    context: LabContext,
    points: PointSet,
    model: LinearModel,
    phase: i64,
    descent: Option<Tween<(f64, f64)>>,
    outliers: Vec<PointId>,
    statistics: Option<FitStatistics>,
}

impl LinearRegressionLab {
    pub fn new(config: LabConfig, size: ContainerSize) -> LabResult<Self> {
        let points = PointSet::new(config.domain, config.min_separation);
        Ok(Self {
            context: LabContext::new(config, size)?,
            points,
            model: LinearModel::default(),
            phase: PHASE_RANGE.0,
            descent: None,
            outliers: Vec::new(),
            statistics: None,
        })
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn line(&self) -> Line {
        self.model.line
    }

    pub fn statistics(&self) -> Option<FitStatistics> {
        self.statistics
    }

    pub fn is_outlier(&self, id: PointId) -> bool {
        self.outliers.contains(&id)
    }

    pub fn shows_residuals(&self) -> bool {
        self.phase >= RESIDUAL_PHASE
    }

    pub fn is_descending(&self) -> bool {
        self.descent.is_some()
    }

    fn recompute(&mut self) {
        self.statistics = self.model.recompute(&self.points);
    }

    pub fn load_preset(&mut self, name: &str) -> LabResult<()> {
        let preset = match name {
            "positive" => Preset::PositiveTrend,
            "negative" => Preset::NegativeTrend,
            "random" | "random-trend" => Preset::RandomTrend,
            other => {
                return Err(LabError::UnknownPreset {
                    lab: LabKind::LinearRegression.id().into(),
                    preset: other.to_owned(),
                })
            }
        };
        self.outliers.clear();
        self.points
            .replace_with(PresetGenerator::generate(preset, &mut self.context.rng));
        self.recompute();
        info!("linear: loaded preset {} ({} points)", preset.name(), self.points.len());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.outliers.clear();
        self.recompute();
    }

    /// Tweens the line towards the least-squares fit
    ///
    /// Ignored while a descent is running or with fewer than two points.
    pub fn run_gradient_descent(&mut self) -> bool {
        if self.descent.is_some() {
            return false;
        }
        let Some(target) = optimal_line(&self.points.positions()) else {
            return false;
        };
        let from = (self.model.line.slope, self.model.line.intercept);
        self.descent = Some(Tween::new(
            from,
            (target.slope, target.intercept),
            self.context.now_ms(),
            self.context.config().timings.gradient_descent_ms,
            EasingFunction::CubicOut,
        ));
        debug!("linear: descending to slope {:.3}, intercept {:.3}", target.slope, target.intercept);
        true
    }

    /// Adds a point well away from the current line
    pub fn add_outlier(&mut self) {
        let position = outlier_position(&self.model.line, &mut self.context.rng);
        match self.points.add_point(position, PointLabel::Unlabeled) {
            Ok(id) => {
                self.outliers.push(id);
                self.recompute();
            }
            Err(error) => {
                self.context.ignore_rejected(LabKind::LinearRegression, error);
            }
        }
    }

    fn add_point_at(&mut self, at: PixelPoint) {
        let position = self.context.to_data(at);
        match self.points.add_point(position, PointLabel::Unlabeled) {
            Ok(_) => self.recompute(),
            Err(error) => {
                self.context.ignore_rejected(LabKind::LinearRegression, error);
            }
        }
    }

    fn drag_point(&mut self, id: PointId, at: PixelPoint) {
        let position = self.context.to_data(at);
        let margin = self.context.config().drag_margin;
        if self.points.move_point(id, position, margin).is_ok() {
            self.recompute();
        }
    }

    fn hit_candidates(&self) -> Vec<HitCandidate> {
        let radius = self.context.config().hit_radii.point;
        self.points
            .iter()
            .map(|p| HitCandidate::point(p.id, self.context.to_canvas(p.position), radius))
            .collect()
    }
}

impl Lab for LinearRegressionLab {
    fn kind(&self) -> LabKind {
        LabKind::LinearRegression
    }

    fn context(&self) -> &LabContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut LabContext {
        &mut self.context
    }

    fn parameters(&self) -> Vec<LabParameter> {
        vec![
            LabParameter::float("slope", self.model.line.slope, SLOPE_RANGE.0, SLOPE_RANGE.1),
            LabParameter::float("intercept", self.model.line.intercept, INTERCEPT_RANGE.0, INTERCEPT_RANGE.1),
            LabParameter::integer("phase", self.phase, PHASE_RANGE.0, PHASE_RANGE.1),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> LabResult<()> {
        let parameters = self.parameters();
        let descriptor = find_parameter(&parameters, name)?;
        match name {
            "slope" => self.model.line.slope = descriptor.parse_float(value)?,
            "intercept" => self.model.line.intercept = descriptor.parse_float(value)?,
            _ => {
                self.phase = descriptor.parse_integer(value)?;
                return Ok(());
            }
        }
        // Manual adjustment takes over from a running descent
        self.descent = None;
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
            LabCommand::LoadPreset(name) => self.load_preset(name),
            LabCommand::AddOutlier => {
                self.add_outlier();
                Ok(())
            }
            LabCommand::RunGradientDescent => {
                self.run_gradient_descent();
                Ok(())
            }
            other => Err(other.unsupported(LabKind::LinearRegression)),
        };
        result.or_else(|error| self.context.report(LabKind::LinearRegression, error))
    }

    fn handle_pointer(&mut self, event: &PointerEvent) {
        let candidates = self.hit_candidates();
        match self.context.pointer.handle(event, &candidates, PressBehavior::Click) {
            PointerIntent::Click { at, .. } => self.add_point_at(at),
            PointerIntent::BeginDrag(HitTarget::Point(id), _) => self.points.set_dragged(id, true),
            PointerIntent::DragTo(HitTarget::Point(id), at) => self.drag_point(id, at),
            PointerIntent::EndDrag(HitTarget::Point(id)) => self.points.set_dragged(id, false),
            _ => {}
        }
    }

    fn tick(&mut self, dt_ms: f64) {
        let now = self.context.advance_clock(dt_ms);
        self.points.advance_arrivals(dt_ms);
        if let Some(descent) = self.descent {
            let (slope, intercept) = descent.sample(now);
            self.model.line = Line::new(slope, intercept);
            if descent.is_finished(now) {
                self.descent = None;
                info!("linear: gradient descent finished");
            }
            self.recompute();
        }
    }

    fn snapshot(&self) -> LabSnapshot {
        LabSnapshot {
            lab: LabKind::LinearRegression,
            phase: format!("phase-{}", self.phase),
            parameters: self.parameters(),
            statistics: LabStatistics::LinearRegression {
                slope: self.model.line.slope,
                intercept: self.model.line.intercept,
                fit: self.statistics,
            },
            notices: self.context.notices().to_vec(),
            cursor: self.cursor(),
            point_count: self.points.len(),
            auto_running: false,
            animating: self.descent.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DataPoint;
    use crate::simulation::Sample;
    use approx::assert_relative_eq;

    fn lab() -> LinearRegressionLab {
        LinearRegressionLab::new(LabConfig::seeded(8), ContainerSize::new(800.0, 600.0)).unwrap()
    }

    #[test]
    fn test_statistics_need_two_points() {
        let mut lab = lab();
        assert!(lab.statistics().is_none());
        let at = lab.context.to_canvas(DataPoint::new(2.0, 3.0));
        lab.handle_pointer(&PointerEvent::down(at.x, at.y, 0.0));
        lab.handle_pointer(&PointerEvent::up(at.x, at.y, 5.0));
        assert!(lab.statistics().is_none());
        let at = lab.context.to_canvas(DataPoint::new(6.0, 5.0));
        lab.handle_pointer(&PointerEvent::down(at.x, at.y, 10.0));
        assert!(lab.statistics().is_some());
    }

    #[test]
    fn test_gradient_descent_reaches_optimum() {
        let mut lab = lab();
        lab.trigger("load-preset:positive").unwrap();
        let target = optimal_line(&lab.points().positions()).unwrap();
        lab.trigger("run-gradient-descent").unwrap();
        assert!(lab.snapshot().animating);
        // A second request while running is ignored
        assert!(!lab.run_gradient_descent());
        for _ in 0..130 {
            lab.tick(16.0);
        }
        assert!(!lab.is_descending());
        assert_relative_eq!(lab.line().slope, target.slope, epsilon = 1e-9);
        assert_relative_eq!(lab.line().intercept, target.intercept, epsilon = 1e-9);
    }

    #[test]
    fn test_dragging_a_point_updates_fit() {
        let mut lab = lab();
        lab.points.insert_sample(Sample::new(2.0, 2.0, PointLabel::Unlabeled));
        lab.points.insert_sample(Sample::new(8.0, 8.0, PointLabel::Unlabeled));
        lab.set_parameter("slope", "1").unwrap();
        lab.set_parameter("intercept", "0").unwrap();
        assert_relative_eq!(lab.statistics().unwrap().sse, 0.0, epsilon = 1e-12);

        let grab = lab.context.to_canvas(DataPoint::new(8.0, 8.0));
        let drop = lab.context.to_canvas(DataPoint::new(8.0, 6.0));
        lab.handle_pointer(&PointerEvent::down(grab.x, grab.y, 0.0));
        lab.handle_pointer(&PointerEvent::moved(drop.x, drop.y, 16.0));
        lab.handle_pointer(&PointerEvent::up(drop.x, drop.y, 32.0));
        assert_relative_eq!(lab.statistics().unwrap().sse, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_drag_stops_short_of_domain_edge() {
        let mut lab = lab();
        lab.points.insert_sample(Sample::new(5.0, 5.0, PointLabel::Unlabeled));
        let grab = lab.context.to_canvas(DataPoint::new(5.0, 5.0));
        lab.handle_pointer(&PointerEvent::down(grab.x, grab.y, 0.0));
        lab.handle_pointer(&PointerEvent::moved(-500.0, -500.0, 16.0));
        lab.handle_pointer(&PointerEvent::up(-500.0, -500.0, 32.0));

        let moved = lab.points().as_slice()[0].position;
        assert_relative_eq!(moved.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(moved.y, 9.5, epsilon = 1e-12);
    }

    #[test]
    fn test_outlier_is_tracked() {
        let mut lab = lab();
        lab.trigger("add-outlier").unwrap();
        let id = lab.points().as_slice()[0].id;
        assert!(lab.is_outlier(id));
    }

    #[test]
    fn test_phase_controls_residuals() {
        let mut lab = lab();
        assert!(!lab.shows_residuals());
        lab.set_parameter("phase", "3").unwrap();
        assert!(lab.shows_residuals());
        assert!(lab.set_parameter("phase", "5").is_err());
    }
}
