//! Interactive decision tree lab
//!
//! Fruit are sorted into piles by color or shape. Every split or prune
//! moves the fruit to their new piles on a short stagger; the automatic
//! sort keeps splitting by the best-gain feature until every pile is pure.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, info};

use super::{Lab, LabCommand, LabContext, LabKind, LabSnapshot, LabStatistics};
use crate::algorithm::decision_tree::{Feature, FruitSorter, TreePhase};
use crate::algorithm::{LabParameter, StepOutcome, SteppedAlgorithm};
use crate::config::LabConfig;
use crate::error::{LabError, LabResult};
use crate::execution::{AutoRunner, EasingFunction, Tween};
use crate::geometry::viewport::{BackingStore, ContainerSize};
use crate::geometry::PixelPoint;
use crate::interaction::{PointerEvent, PressBehavior};

#[derive(Debug)]
pub struct DecisionTreeLab {
    context: LabContext,
    sorter: FruitSorter,
    runner: AutoRunner,
    /// One tween per fruit, in logical pixels
    moves: Vec<Tween<(f64, f64)>>,
    busy_until_ms: f64,
}

impl DecisionTreeLab {
    pub fn new(config: LabConfig, size: ContainerSize) -> LabResult<Self> {
        let runner = AutoRunner::new(config.timings.auto_sort_delay_ms);
        let mut context = LabContext::new(config, size)?;
        let sorter = FruitSorter::generate(&mut context.rng);
        let mut lab = Self {
            context,
            sorter,
            runner,
            moves: Vec::new(),
            busy_until_ms: 0.0,
        };
        lab.snap_to_layout();
        Ok(lab)
    }

    pub fn sorter(&self) -> &FruitSorter {
        &self.sorter
    }

    pub fn runner(&self) -> &AutoRunner {
        &self.runner
    }

    pub fn phase(&self) -> TreePhase {
        self.sorter.phase()
    }

    pub fn is_animating(&self) -> bool {
        self.context.now_ms() < self.busy_until_ms
    }

    /// Current on-screen position of every fruit, indexed by fruit id
    pub fn fruit_positions(&self) -> Vec<PixelPoint> {
        let now = self.context.now_ms();
        self.moves
            .iter()
            .map(|tween| {
                let (x, y) = tween.sample(now);
                PixelPoint::new(x, y)
            })
            .collect()
    }

    fn layout_targets(&self) -> Vec<PixelPoint> {
        let viewport = self.context.transform().viewport();
        self.sorter.layout(viewport.logical_width, viewport.logical_height)
    }

    /// Places every fruit on its pile without animation
    fn snap_to_layout(&mut self) {
        let now = self.context.now_ms();
        self.moves = self
            .layout_targets()
            .into_iter()
            .map(|p| Tween::new((p.x, p.y), (p.x, p.y), now, 0.0, EasingFunction::Linear))
            .collect();
        self.busy_until_ms = now;
    }

    /// Starts staggered moves from the current positions to the new piles
    fn animate_to_layout(&mut self) {
        let now = self.context.now_ms();
        let timings = self.context.config().timings;
        let current = self.fruit_positions();
        let targets = self.layout_targets();
        self.moves = targets
            .iter()
            .enumerate()
            .map(|(i, to)| {
                let from = current.get(i).copied().unwrap_or(*to);
                Tween::new(
                    (from.x, from.y),
                    (to.x, to.y),
                    now + i as f64 * timings.fruit_stagger_ms,
                    timings.fruit_move_ms,
                    EasingFunction::QuadraticOut,
                )
            })
            .collect();
        let last_start = targets.len().saturating_sub(1) as f64 * timings.fruit_stagger_ms;
        self.busy_until_ms = now + last_start + timings.fruit_move_ms;
    }

    pub fn regenerate(&mut self) {
        self.runner.stop();
        self.sorter = FruitSorter::generate(&mut self.context.rng);
        self.snap_to_layout();
        info!("tree: new pile of {} fruit", self.sorter.fruits().len());
    }

    pub fn split(&mut self, feature: Feature) -> LabResult<()> {
        if self.sorter.is_perfectly_sorted() {
            return Err(LabError::PreconditionFailed("the fruit are already sorted".into()));
        }
        if !self.sorter.split(feature) {
            return Err(LabError::PreconditionFailed(format!(
                "no pile holds more than one {feature}"
            )));
        }
        self.animate_to_layout();
        Ok(())
    }

    pub fn prune(&mut self) -> LabResult<()> {
        if !self.sorter.prune() {
            return Err(LabError::PreconditionFailed("there is no split to undo".into()));
        }
        self.runner.stop();
        self.animate_to_layout();
        Ok(())
    }

    /// One automatic split; returns whether the run should continue
    fn auto_step(&mut self) -> bool {
        match self.sorter.step(&mut ()) {
            Ok(StepOutcome::Advanced) => {
                self.animate_to_layout();
                true
            }
            Ok(StepOutcome::Finished) => {
                self.animate_to_layout();
                info!("tree: sorted after {} splits", self.sorter.depth());
                false
            }
            Ok(StepOutcome::Idle) | Err(_) => false,
        }
    }
}

impl Lab for DecisionTreeLab {
    fn kind(&self) -> LabKind {
        LabKind::DecisionTrees
    }

    fn context(&self) -> &LabContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut LabContext {
        &mut self.context
    }

    fn parameters(&self) -> Vec<LabParameter> {
        Vec::new()
    }

    fn set_parameter(&mut self, name: &str, _value: &str) -> LabResult<()> {
        Err(LabError::invalid_parameter(name, "the decision tree lab has no parameters"))
    }

    fn trigger_action(&mut self, command: &LabCommand) -> LabResult<()> {
        self.context.clear_notices();
        let result = match command {
            LabCommand::Split(feature) => self.split(*feature),
            LabCommand::Prune => self.prune(),
            LabCommand::AutoSort => {
                if self.sorter.is_terminal() && !self.runner.is_enabled() {
                    Err(LabError::PreconditionFailed("the fruit are already sorted".into()))
                } else {
                    let running = self.runner.toggle(self.context.now_ms());
                    info!("tree: auto-sort {}", if running { "started" } else { "cancelled" });
                    Ok(())
                }
            }
            LabCommand::Clear => {
                self.regenerate();
                Ok(())
            }
            LabCommand::LoadPreset(name) if matches!(name.as_str(), "generate" | "random") => {
                self.regenerate();
                Ok(())
            }
            LabCommand::LoadPreset(name) => Err(LabError::UnknownPreset {
                lab: LabKind::DecisionTrees.id().into(),
                preset: name.clone(),
            }),
            other => Err(other.unsupported(LabKind::DecisionTrees)),
        };
        result.or_else(|error| self.context.report(LabKind::DecisionTrees, error))
    }

    fn handle_pointer(&mut self, event: &PointerEvent) {
        self.context.pointer.handle(event, &[], PressBehavior::Ignore);
    }

    fn resize(&mut self, size: ContainerSize) -> Option<BackingStore> {
        let backing = self.context.resize(size)?;
        self.snap_to_layout();
        Some(backing)
    }

    fn tick(&mut self, dt_ms: f64) {
        let now = self.context.advance_clock(dt_ms);
        if let Some(ticket) = self.runner.poll(now, self.is_animating()) {
            let keep_going = self.auto_step();
            let ready_at = self.busy_until_ms.max(now);
            self.runner.finish(ticket, ready_at, keep_going);
            debug!("tree: auto step at depth {}", self.sorter.depth());
        }
    }

    fn snapshot(&self) -> LabSnapshot {
        let phase = match self.sorter.phase() {
            TreePhase::Mixed => "mixed",
            TreePhase::Partial => "partial",
            TreePhase::Sorted => "sorted",
        };
        LabSnapshot {
            lab: LabKind::DecisionTrees,
            phase: phase.to_owned(),
            parameters: self.parameters(),
            statistics: LabStatistics::DecisionTrees {
                entropy: self.sorter.overall_entropy(),
                gain_color: self.sorter.information_gain(Feature::Color),
                gain_shape: self.sorter.information_gain(Feature::Shape),
                depth: self.sorter.depth(),
                piles: self.sorter.piles().len(),
                sorted: self.sorter.is_perfectly_sorted(),
            },
            notices: self.context.notices().to_vec(),
            cursor: self.cursor(),
            point_count: self.sorter.fruits().len(),
            auto_running: self.runner.is_enabled(),
            animating: self.is_animating(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::decision_tree::FRUIT_COUNT;
    use approx::assert_relative_eq;

    fn lab() -> DecisionTreeLab {
        DecisionTreeLab::new(LabConfig::seeded(8), ContainerSize::new(800.0, 600.0)).unwrap()
    }

    fn run(lab: &mut DecisionTreeLab, frames: usize) {
        for _ in 0..frames {
            lab.tick(16.0);
        }
    }

    #[test]
    fn test_starts_mixed_and_at_rest() {
        let lab = lab();
        assert_eq!(lab.phase(), TreePhase::Mixed);
        assert_eq!(lab.fruit_positions().len(), FRUIT_COUNT);
        assert!(!lab.is_animating());
    }

    #[test]
    fn test_split_animates_fruit_to_piles() {
        let mut lab = lab();
        lab.trigger("split:color").unwrap();
        assert!(lab.is_animating());
        // Stagger: 11 * 50 ms plus an 800 ms move
        run(&mut lab, 90);
        assert!(!lab.is_animating());
        let targets = lab.layout_targets();
        for (at, target) in lab.fruit_positions().iter().zip(&targets) {
            assert_relative_eq!(at.x, target.x, epsilon = 1e-9);
            assert_relative_eq!(at.y, target.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_prune_without_split_is_a_notice() {
        let mut lab = lab();
        lab.trigger("prune").unwrap();
        let snapshot = lab.snapshot();
        assert_eq!(snapshot.notices.len(), 1);
        assert_eq!(snapshot.phase, "mixed");
    }

    #[test]
    fn test_auto_sort_finishes_sorted() {
        let mut lab = lab();
        lab.trigger("auto-sort").unwrap();
        run(&mut lab, 600);
        assert_eq!(lab.phase(), TreePhase::Sorted);
        assert!(!lab.runner().is_enabled());
        match lab.snapshot().statistics {
            LabStatistics::DecisionTrees { entropy, sorted, .. } => {
                assert_eq!(entropy, 0.0);
                assert!(sorted);
            }
            other => panic!("unexpected statistics {other:?}"),
        }
        // A sorted pile cannot be split again
        lab.trigger("split:shape").unwrap();
        assert_eq!(lab.snapshot().notices.len(), 1);
    }

    #[test]
    fn test_regenerate_stops_auto_sort() {
        let mut lab = lab();
        lab.trigger("auto-sort").unwrap();
        lab.trigger("load-preset:generate").unwrap();
        assert!(!lab.runner().is_enabled());
        assert_eq!(lab.sorter().depth(), 0);
        assert!(lab.trigger("load-preset:bananas").is_err());
    }

    #[test]
    fn test_resize_relayouts_piles() {
        let mut lab = lab();
        let before = lab.fruit_positions();
        lab.resize(ContainerSize::new(400.0, 300.0)).unwrap();
        assert_ne!(lab.fruit_positions(), before);
        assert!(lab.fruit_positions().iter().all(|p| p.x < 400.0));
    }
}
