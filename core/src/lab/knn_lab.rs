//! Interactive k-nearest-neighbour lab
//!
//! Points are painted with the current class brush; the query marker can be
//! dragged anywhere inside the domain. Every mutation recomputes the
//! neighbour set from scratch.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, info};

use super::{Lab, LabCommand, LabContext, LabKind, LabSnapshot, LabStatistics};
use crate::algorithm::knn::{KnnModel, KnnResult, Vote};
use crate::algorithm::{find_parameter, ContinuousModel, LabParameter};
use crate::config::LabConfig;
use crate::error::{LabError, LabResult};
use crate::geometry::viewport::ContainerSize;
use crate::geometry::{DataPoint, PixelPoint};
use crate::interaction::{HitCandidate, HitTarget, PointerEvent, PointerIntent, PressBehavior};
use crate::simulation::{ClassLabel, PointLabel, PointSet, Preset, PresetGenerator};

pub const K_RANGE: (i64, i64) = (1, 15);

#[derive(Debug)]
pub struct KnnLab {
    context: LabContext,
    points: PointSet,
    model: KnnModel,
    brush: ClassLabel,
    result: KnnResult,
}

impl KnnLab {
    /// A lab pre-populated with the class-cluster preset
    pub fn new(config: LabConfig, size: ContainerSize) -> LabResult<Self> {
        let points = PointSet::new(config.domain, config.min_separation);
        let query = config.domain.center();
        let mut lab = Self {
            context: LabContext::new(config, size)?,
            points,
            model: KnnModel::new(3, query),
            brush: ClassLabel::A,
            result: KnnResult::default(),
        };
        lab.load_preset("clusters")?;
        Ok(lab)
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn result(&self) -> &KnnResult {
        &self.result
    }

    pub fn k(&self) -> usize {
        self.model.k
    }

    pub fn query(&self) -> DataPoint {
        self.model.query.unwrap_or_else(|| self.points.domain().center())
    }

    pub fn brush(&self) -> ClassLabel {
        self.brush
    }

    fn recompute(&mut self) {
        self.result = self.model.recompute(&self.points);
    }

    pub fn load_preset(&mut self, name: &str) -> LabResult<()> {
        let preset = match name {
            "clusters" | "class-clusters" => Preset::ClassClusters,
            "scattered" => Preset::ScatteredClasses,
            other => {
                return Err(LabError::UnknownPreset {
                    lab: LabKind::Knn.id().into(),
                    preset: other.to_owned(),
                })
            }
        };
        self.points
            .replace_with(PresetGenerator::generate(preset, &mut self.context.rng));
        self.recompute();
        info!("knn: loaded preset {} ({} points)", preset.name(), self.points.len());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.recompute();
    }

    /// Moves the query marker, kept inside the domain by the drag margin
    pub fn move_query(&mut self, position: DataPoint) {
        let config = self.context.config();
        self.model.query = Some(config.domain.clamp_with_margin(position, config.drag_margin));
        self.recompute();
    }

    fn paint_at(&mut self, at: PixelPoint) {
        let position = self.context.to_data(at);
        match self.points.add_point(position, PointLabel::Class(self.brush)) {
            Ok(_) => self.recompute(),
            Err(error) => {
                self.context.ignore_rejected(LabKind::Knn, error);
            }
        }
    }

    fn hit_candidates(&self) -> Vec<HitCandidate> {
        vec![HitCandidate::marker(
            HitTarget::QueryMarker,
            self.context.to_canvas(self.query()),
            self.context.config().hit_radii.query_marker,
        )]
    }

    fn phase_label(&self) -> &'static str {
        match self.result.prediction {
            None => "empty",
            Some(Vote::Tie) => "tie",
            Some(Vote::Class(ClassLabel::A)) => "class-a",
            Some(Vote::Class(ClassLabel::B)) => "class-b",
        }
    }
}

impl Lab for KnnLab {
    fn kind(&self) -> LabKind {
        LabKind::Knn
    }

    fn context(&self) -> &LabContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut LabContext {
        &mut self.context
    }

    fn parameters(&self) -> Vec<LabParameter> {
        vec![
            LabParameter::integer("k", self.model.k as i64, K_RANGE.0, K_RANGE.1),
            LabParameter::choice("brush", &self.brush.to_string().to_lowercase(), &["a", "b"]),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> LabResult<()> {
        let parameters = self.parameters();
        let descriptor = find_parameter(&parameters, name)?;
        match name {
            "k" => {
                self.model.k = descriptor.parse_integer(value)? as usize;
                self.recompute();
                debug!("knn: k = {}", self.model.k);
            }
            _ => {
                let choice = descriptor.parse_choice(&value.to_lowercase())?.to_owned();
                self.brush = ClassLabel::parse(&choice)
                    .ok_or_else(|| LabError::invalid_parameter(name, format!("unknown class '{choice}'")))?;
            }
        }
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
            LabCommand::Brush(class) => {
                self.brush = *class;
                Ok(())
            }
            other => Err(other.unsupported(LabKind::Knn)),
        };
        result.or_else(|error| self.context.report(LabKind::Knn, error))
    }

    fn handle_pointer(&mut self, event: &PointerEvent) {
        let candidates = self.hit_candidates();
        match self.context.pointer.handle(event, &candidates, PressBehavior::Paint) {
            PointerIntent::Paint(at) => self.paint_at(at),
            PointerIntent::DragTo(HitTarget::QueryMarker, at) => {
                let position = self.context.to_data(at);
                self.move_query(position);
            }
            _ => {}
        }
    }

    fn tick(&mut self, dt_ms: f64) {
        self.context.advance_clock(dt_ms);
        self.points.advance_arrivals(dt_ms);
    }

    fn snapshot(&self) -> LabSnapshot {
        LabSnapshot {
            lab: LabKind::Knn,
            phase: self.phase_label().to_owned(),
            parameters: self.parameters(),
            statistics: LabStatistics::Knn {
                votes_a: self.result.votes_a,
                votes_b: self.result.votes_b,
                prediction: self.result.prediction,
                k_radius: self.result.k_radius,
                query: self.query(),
            },
            notices: self.context.notices().to_vec(),
            cursor: self.cursor(),
            point_count: self.points.len(),
            auto_running: false,
            animating: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::CursorHint;
    use crate::simulation::Sample;
    use approx::assert_relative_eq;

    fn empty_lab() -> KnnLab {
        let mut lab = KnnLab::new(LabConfig::seeded(5), ContainerSize::new(800.0, 600.0)).unwrap();
        lab.trigger("clear").unwrap();
        lab
    }

    #[test]
    fn test_starts_with_class_clusters() {
        let lab = KnnLab::new(LabConfig::seeded(5), ContainerSize::new(800.0, 600.0)).unwrap();
        assert!(lab.points().count_class(ClassLabel::A) > 0);
        assert!(lab.points().count_class(ClassLabel::B) > 0);
        assert_eq!(lab.result().neighbors.len(), 3);
    }

    #[test]
    fn test_query_drag_recomputes_neighbours() {
        let mut lab = empty_lab();
        lab.set_parameter("k", "1").unwrap();
        lab.points.insert_sample(Sample::new(1.0, 1.0, PointLabel::Class(ClassLabel::A)));
        lab.points.insert_sample(Sample::new(9.0, 9.0, PointLabel::Class(ClassLabel::B)));

        let marker = lab.context.to_canvas(lab.query());
        let target = lab.context.to_canvas(DataPoint::new(1.1, 1.1));
        lab.handle_pointer(&PointerEvent::down(marker.x + 3.0, marker.y, 0.0));
        assert_eq!(lab.cursor(), CursorHint::Grabbing);
        lab.handle_pointer(&PointerEvent::moved(target.x, target.y, 16.0));
        lab.handle_pointer(&PointerEvent::up(target.x, target.y, 32.0));

        let result = lab.result();
        assert_eq!(result.prediction, Some(Vote::Class(ClassLabel::A)));
        assert_relative_eq!(result.neighbors[0].distance, 0.02f64.sqrt(), epsilon = 1e-9);
        assert_eq!(lab.points().len(), 2);
    }

    #[test]
    fn test_query_is_clamped_inside_margin() {
        let mut lab = empty_lab();
        lab.move_query(DataPoint::new(-3.0, 42.0));
        assert_eq!(lab.query(), DataPoint::new(0.5, 9.5));
    }

    #[test]
    fn test_paint_stroke_is_throttled() {
        let mut lab = empty_lab();
        lab.trigger("brush:blue").unwrap();
        let start = lab.context.to_canvas(DataPoint::new(2.0, 2.0));
        lab.handle_pointer(&PointerEvent::down(start.x, start.y, 0.0));
        // 10 ms later: throttled
        lab.handle_pointer(&PointerEvent::moved(start.x + 40.0, start.y, 10.0));
        // 60 ms after the last insertion: accepted
        lab.handle_pointer(&PointerEvent::moved(start.x + 80.0, start.y, 60.0));
        lab.handle_pointer(&PointerEvent::up(start.x + 80.0, start.y, 70.0));
        assert_eq!(lab.points().len(), 2);
        assert_eq!(lab.points().count_class(ClassLabel::B), 2);
    }

    #[test]
    fn test_painting_on_existing_point_is_ignored() {
        let mut lab = empty_lab();
        let at = lab.context.to_canvas(DataPoint::new(2.0, 2.0));
        lab.handle_pointer(&PointerEvent::down(at.x, at.y, 0.0));
        lab.handle_pointer(&PointerEvent::up(at.x, at.y, 5.0));
        lab.handle_pointer(&PointerEvent::down(at.x + 1.0, at.y, 100.0));
        lab.handle_pointer(&PointerEvent::up(at.x + 1.0, at.y, 105.0));
        assert_eq!(lab.points().len(), 1);
        assert!(lab.snapshot().notices.is_empty());
    }

    #[test]
    fn test_brush_parameter_validation() {
        let mut lab = empty_lab();
        lab.set_parameter("brush", "B").unwrap();
        assert_eq!(lab.brush(), ClassLabel::B);
        assert!(lab.set_parameter("brush", "green").is_err());
        assert!(lab.set_parameter("k", "0").is_err());
    }
}
