//! Interactive k-means lab
//!
//! Stepped clustering with animated transitions. Assignment is revealed
//! point by point on a stagger, centroid updates glide to their new means,
//! and the automatic run waits for both before scheduling the next step.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, info};

use super::{Lab, LabCommand, LabContext, LabKind, LabSnapshot, LabStatistics};
use crate::algorithm::kmeans::{KMeansEngine, KMeansPhase};
use crate::algorithm::{find_parameter, LabParameter, SteppedAlgorithm};
use crate::config::LabConfig;
use crate::error::{LabError, LabResult};
use crate::execution::{AutoRunner, EasingFunction, Tween};
use crate::geometry::viewport::ContainerSize;
use crate::geometry::{DataPoint, PixelPoint};
use crate::interaction::{HitCandidate, HitTarget, PointerEvent, PointerIntent, PressBehavior};
use crate::simulation::{PointLabel, PointSet, Preset, PresetGenerator};

pub const K_RANGE: (i64, i64) = (2, 8);
const DEFAULT_K: usize = 3;

/// Staggered reveal of a fresh assignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentReveal {
    pub start_ms: f64,
    pub stagger_ms: f64,
}

impl AssignmentReveal {
    /// Whether the point at `index` already shows its new cluster at `now_ms`
    pub fn is_revealed(&self, index: usize, now_ms: f64) -> bool {
        now_ms >= self.start_ms + index as f64 * self.stagger_ms
    }
}

#[derive(Debug)]
pub struct KMeansLab {
    context: LabContext,
    points: PointSet,
    engine: KMeansEngine,
    runner: AutoRunner,
    glides: Vec<Tween<DataPoint>>,
    reveal: Option<AssignmentReveal>,
    busy_until_ms: f64,
}

impl KMeansLab {
    pub fn new(config: LabConfig, size: ContainerSize) -> LabResult<Self> {
        let points = PointSet::new(config.domain, config.min_separation);
        let engine = KMeansEngine::new(DEFAULT_K, config.convergence_epsilon, config.history_capacity);
        let runner = AutoRunner::new(config.timings.auto_step_delay_ms);
        Ok(Self {
            context: LabContext::new(config, size)?,
            points,
            engine,
            runner,
            glides: Vec::new(),
            reveal: None,
            busy_until_ms: 0.0,
        })
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn engine(&self) -> &KMeansEngine {
        &self.engine
    }

    pub fn runner(&self) -> &AutoRunner {
        &self.runner
    }

    pub fn reveal(&self) -> Option<AssignmentReveal> {
        self.reveal
    }

    /// Centroid positions as currently drawn, mid-glide when animating
    pub fn displayed_centroids(&self) -> Vec<DataPoint> {
        let now = self.context.now_ms();
        if self.glides.len() == self.engine.centroids().len() {
            self.glides.iter().map(|glide| glide.sample(now)).collect()
        } else {
            self.engine.centroids().to_vec()
        }
    }

    pub fn is_animating(&self) -> bool {
        self.context.now_ms() < self.busy_until_ms
    }

    fn cancel_animations(&mut self) {
        self.glides.clear();
        self.reveal = None;
        self.busy_until_ms = self.context.now_ms();
    }

    fn reset_clustering(&mut self) {
        self.runner.stop();
        self.engine.reset(&mut self.points);
        self.cancel_animations();
    }

    pub fn load_preset(&mut self, name: &str) -> LabResult<()> {
        let preset = match name.parse::<Preset>() {
            Ok(preset @ (Preset::RandomScatter | Preset::GaussianBlobs)) => preset,
            _ => {
                return Err(LabError::UnknownPreset {
                    lab: LabKind::KMeans.id().into(),
                    preset: name.to_owned(),
                })
            }
        };
        self.reset_clustering();
        self.points
            .replace_with(PresetGenerator::generate(preset, &mut self.context.rng));
        info!("kmeans: loaded preset {} ({} points)", preset.name(), self.points.len());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.reset_clustering();
        self.points.clear();
        debug!("kmeans: cleared");
    }

    pub fn initialize_centroids(&mut self) -> LabResult<()> {
        self.engine
            .initialize_centroids(&mut self.points, &mut self.context.rng)?;
        self.cancel_animations();
        Ok(())
    }

    /// Assigns points with a staggered reveal; ignored while animating
    pub fn step_assign(&mut self) -> bool {
        if self.is_animating() || !self.engine.step_assign(&mut self.points) {
            return false;
        }
        let now = self.context.now_ms();
        let timings = self.context.config().timings;
        self.reveal = Some(AssignmentReveal {
            start_ms: now,
            stagger_ms: timings.assign_stagger_ms,
        });
        self.busy_until_ms = now + self.points.len() as f64 * timings.assign_stagger_ms + timings.assign_settle_ms;
        true
    }

    /// Moves centroids to their means and starts the glide; ignored while animating
    pub fn step_update(&mut self) -> bool {
        if self.is_animating() {
            return false;
        }
        let Some(report) = self.engine.step_update(&mut self.points) else {
            return false;
        };
        let now = self.context.now_ms();
        let timings = self.context.config().timings;
        self.reveal = None;
        self.glides = report
            .previous
            .iter()
            .zip(self.engine.centroids())
            .map(|(from, to)| Tween::new(*from, *to, now, timings.centroid_glide_ms, EasingFunction::QuadraticOut))
            .collect();
        self.busy_until_ms = now + timings.update_phase_ms;
        debug!(
            "kmeans: iteration {} moved centroids by {:.4}",
            self.engine.iteration(),
            report.displacement
        );
        true
    }

    /// One automatic transition; returns whether the run should continue
    fn auto_step(&mut self) -> bool {
        match self.engine.phase() {
            // Waits for centroids to appear
            KMeansPhase::Uninitialized => true,
            KMeansPhase::Converged => false,
            KMeansPhase::Seeded | KMeansPhase::Updated => {
                self.step_assign();
                true
            }
            KMeansPhase::Assigned => {
                self.step_update();
                !self.engine.is_converged()
            }
        }
    }

    fn add_point_at(&mut self, at: PixelPoint) {
        let position = self.context.to_data(at);
        if let Err(error) = self.points.add_point(position, PointLabel::Unlabeled) {
            // Rejected input is never user-visible
            self.context.ignore_rejected(LabKind::KMeans, error);
        }
    }

    fn drag_centroid(&mut self, index: usize, at: PixelPoint) {
        let config = self.context.config();
        let position = config
            .domain
            .clamp_with_margin(self.context.to_data(at), config.drag_margin);
        if self.engine.move_centroid(index, position, &mut self.points).is_ok() {
            self.cancel_animations();
        }
    }

    fn hit_candidates(&self) -> Vec<HitCandidate> {
        let radius = self.context.config().hit_radii.centroid;
        self.displayed_centroids()
            .iter()
            .enumerate()
            .map(|(i, c)| HitCandidate::marker(HitTarget::Centroid(i), self.context.to_canvas(*c), radius))
            .collect()
    }
}

impl Lab for KMeansLab {
    fn kind(&self) -> LabKind {
        LabKind::KMeans
    }

    fn context(&self) -> &LabContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut LabContext {
        &mut self.context
    }

    fn parameters(&self) -> Vec<LabParameter> {
        vec![LabParameter::integer("k", self.engine.k() as i64, K_RANGE.0, K_RANGE.1)]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> LabResult<()> {
        let parameters = self.parameters();
        let descriptor = find_parameter(&parameters, name)?;
        let k = descriptor.parse_integer(value)? as usize;
        if k != self.engine.k() {
            self.runner.stop();
            self.engine.set_k(k, &mut self.points);
            self.cancel_animations();
            debug!("kmeans: k = {k}");
        }
        Ok(())
    }

    fn trigger_action(&mut self, command: &LabCommand) -> LabResult<()> {
        self.context.clear_notices();
        let result = match command {
            LabCommand::InitCentroids => self.initialize_centroids(),
            LabCommand::StepAssign => {
                self.step_assign();
                Ok(())
            }
            LabCommand::StepUpdate => {
                self.step_update();
                Ok(())
            }
            LabCommand::ToggleAuto => {
                let running = self.runner.toggle(self.context.now_ms());
                info!("kmeans: auto-run {}", if running { "started" } else { "cancelled" });
                Ok(())
            }
            LabCommand::Clear => {
                self.clear();
                Ok(())
            }
            LabCommand::LoadPreset(name) => self.load_preset(name),
            other => Err(other.unsupported(LabKind::KMeans)),
        };
        result.or_else(|error| self.context.report(LabKind::KMeans, error))
    }

    fn handle_pointer(&mut self, event: &PointerEvent) {
        let candidates = self.hit_candidates();
        // Points can only be placed before clustering starts
        let press = if self.engine.centroids().is_empty() {
            PressBehavior::Click
        } else {
            PressBehavior::Ignore
        };
        match self.context.pointer.handle(event, &candidates, press) {
            PointerIntent::Click { at, .. } => self.add_point_at(at),
            PointerIntent::DragTo(HitTarget::Centroid(index), at) => self.drag_centroid(index, at),
            _ => {}
        }
    }

    fn tick(&mut self, dt_ms: f64) {
        let now = self.context.advance_clock(dt_ms);
        self.points.advance_arrivals(dt_ms);
        if self.glides.iter().all(|glide| glide.is_finished(now)) {
            self.glides.clear();
        }

        let busy = self.is_animating() || self.context.pointer.dragged().is_some();
        if let Some(ticket) = self.runner.poll(now, busy) {
            let keep_going = self.auto_step();
            let ready_at = self.busy_until_ms.max(now);
            self.runner.finish(ticket, ready_at, keep_going);
        }
    }

    fn snapshot(&self) -> LabSnapshot {
        LabSnapshot {
            lab: LabKind::KMeans,
            phase: self.engine.phase().label().to_owned(),
            parameters: self.parameters(),
            statistics: LabStatistics::KMeans {
                iteration: self.engine.iteration(),
                wcss: self.engine.wcss(&self.points),
                unassigned: self.engine.unassigned_count(&self.points),
                centroids: self.engine.centroids().to_vec(),
                last_displacement: self.engine.last_displacement(),
            },
            notices: self.context.notices().to_vec(),
            cursor: self.cursor(),
            point_count: self.points.len(),
            auto_running: self.runner.is_enabled(),
            animating: self.is_animating(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::PointerEvent;

    fn lab() -> KMeansLab {
        KMeansLab::new(LabConfig::seeded(11), ContainerSize::new(800.0, 600.0)).unwrap()
    }

    fn run_frames(lab: &mut KMeansLab, frames: usize) {
        for _ in 0..frames {
            lab.tick(16.0);
        }
    }

    #[test]
    fn test_init_without_points_reports_notice() {
        let mut lab = lab();
        assert!(lab.trigger("init-centroids").is_ok());
        let snapshot = lab.snapshot();
        assert_eq!(snapshot.notices.len(), 1);
        assert_eq!(snapshot.notices[0].message, "Need at least 3 points to create 3 clusters!");
        assert_eq!(snapshot.phase, "uninitialized");
    }

    #[test]
    fn test_click_adds_points_only_before_centroids() {
        let mut lab = lab();
        let at = lab.context.to_canvas(DataPoint::new(5.0, 5.0));
        lab.handle_pointer(&PointerEvent::down(at.x, at.y, 0.0));
        lab.handle_pointer(&PointerEvent::up(at.x, at.y, 10.0));
        assert_eq!(lab.points().len(), 1);

        lab.trigger("load-preset:clusters").unwrap();
        lab.trigger("init-centroids").unwrap();
        let corner = lab.context.to_canvas(DataPoint::new(0.2, 9.8));
        lab.handle_pointer(&PointerEvent::down(corner.x, corner.y, 20.0));
        assert_eq!(lab.points().len(), 45);
    }

    #[test]
    fn test_steps_are_ignored_while_animating() {
        let mut lab = lab();
        lab.trigger("load-preset:random").unwrap();
        lab.trigger("init-centroids").unwrap();
        assert!(lab.step_assign());
        assert!(lab.is_animating());
        assert!(!lab.step_update());
        // 40 points * 20 ms + 300 ms
        run_frames(&mut lab, 70);
        assert!(!lab.is_animating());
        assert!(lab.step_update());
    }

    #[test]
    fn test_auto_run_converges() {
        let mut lab = lab();
        lab.trigger("load-preset:clusters").unwrap();
        lab.trigger("init-centroids").unwrap();
        lab.trigger("toggle-auto").unwrap();
        for _ in 0..20_000 {
            lab.tick(16.0);
            if lab.engine().is_converged() {
                break;
            }
        }
        assert!(lab.engine().is_converged());
        run_frames(&mut lab, 200);
        assert!(!lab.snapshot().auto_running);
    }

    #[test]
    fn test_centroid_drag_resets_assignment() {
        let mut lab = lab();
        lab.trigger("load-preset:clusters").unwrap();
        lab.trigger("init-centroids").unwrap();
        lab.step_assign();
        run_frames(&mut lab, 100);
        assert_eq!(lab.engine().unassigned_count(lab.points()), 0);

        let centroid = lab.engine().centroids()[0];
        let from = lab.context.to_canvas(centroid);
        lab.handle_pointer(&PointerEvent::down(from.x, from.y, 0.0));
        lab.handle_pointer(&PointerEvent::moved(-500.0, -500.0, 16.0));
        lab.handle_pointer(&PointerEvent::up(-500.0, -500.0, 32.0));

        let moved = lab.engine().centroids()[0];
        assert_eq!(moved, DataPoint::new(0.5, 9.5));
        assert_eq!(lab.engine().phase(), KMeansPhase::Seeded);
        assert_eq!(lab.engine().unassigned_count(lab.points()), 45);
    }

    #[test]
    fn test_changing_k_drops_centroids() {
        let mut lab = lab();
        lab.trigger("load-preset:random").unwrap();
        lab.trigger("init-centroids").unwrap();
        lab.set_parameter("k", "5").unwrap();
        assert!(lab.engine().centroids().is_empty());
        assert_eq!(lab.get_parameter("k").unwrap(), "5");
        assert!(lab.set_parameter("k", "9").is_err());
    }

    #[test]
    fn test_foreign_preset_is_rejected() {
        let mut lab = lab();
        assert!(lab.trigger("load-preset:separable").is_err());
        assert!(lab.trigger("add-outlier").is_err());
    }
}
