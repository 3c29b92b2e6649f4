//! Interactive support vector machine lab
//!
//! Support vectors can be dragged; every move refits the model. Clicking
//! empty canvas adds a point of the selected class.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, info};

use super::{Lab, LabCommand, LabContext, LabKind, LabSnapshot, LabStatistics};
use crate::algorithm::logistic::Accuracy;
use crate::algorithm::svm::{Kernel, SvmFit, SvmModel};
use crate::algorithm::{find_parameter, ContinuousModel, LabParameter};
use crate::config::LabConfig;
use crate::error::{LabError, LabResult};
use crate::geometry::viewport::ContainerSize;
use crate::geometry::PixelPoint;
use crate::interaction::{HitCandidate, HitTarget, PointerEvent, PointerIntent, PressBehavior};
use crate::simulation::{ClassLabel, PointId, PointLabel, PointSet, Preset, PresetGenerator};

/// Range of the base-10 regularisation exponent
pub const C_RANGE: (f64, f64) = (-2.0, 2.0);
pub const GAMMA_RANGE: (f64, f64) = (0.05, 5.0);

#[derive(Debug)]
pub struct SvmLab {
    context: LabContext,
    points: PointSet,
    model: SvmModel,
    selected_class: ClassLabel,
    fit: SvmFit,
}

impl SvmLab {
    /// A lab pre-populated with separable data
    pub fn new(config: LabConfig, size: ContainerSize) -> LabResult<Self> {
        let points = PointSet::new(config.domain, config.min_separation);
        let model = SvmModel::default();
        let fit = model.recompute(&points);
        let mut lab = Self {
            context: LabContext::new(config, size)?,
            points,
            model,
            selected_class: ClassLabel::A,
            fit,
        };
        lab.load_preset("separable")?;
        Ok(lab)
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn model(&self) -> &SvmModel {
        &self.model
    }

    pub fn fit(&self) -> &SvmFit {
        &self.fit
    }

    pub fn selected_class(&self) -> ClassLabel {
        self.selected_class
    }

    fn refit(&mut self) {
        self.fit = self.model.recompute(&self.points);
        if self.fit.degenerate {
            debug!("svm: class centroids coincide, fell back to a vertical boundary");
        }
    }

    /// Training accuracy of the current fit
    pub fn accuracy(&self) -> Accuracy {
        self.points
            .iter()
            .filter_map(|p| Some((self.fit.predict(&p.position)?, p.label.class()?)))
            .fold(Accuracy::default(), |acc, (predicted, actual)| Accuracy {
                correct: acc.correct + usize::from(predicted == actual),
                total: acc.total + 1,
            })
    }

    pub fn load_preset(&mut self, name: &str) -> LabResult<()> {
        let preset = match name {
            "separable" => Preset::Separable,
            "overlapping" | "overlap" => Preset::Overlapping,
            "circular" => Preset::Circular,
            other => {
                return Err(LabError::UnknownPreset {
                    lab: LabKind::Svm.id().into(),
                    preset: other.to_owned(),
                })
            }
        };
        // Rings cannot be separated by a line
        self.model.kernel = if preset == Preset::Circular {
            Kernel::Rbf
        } else {
            Kernel::Linear
        };
        self.points
            .replace_with(PresetGenerator::generate(preset, &mut self.context.rng));
        self.refit();
        info!("svm: loaded preset {} with {} kernel", preset.name(), self.model.kernel.name());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.refit();
    }

    fn add_point_at(&mut self, at: PixelPoint) {
        let radius = self.context.config().hit_radii.point;
        let on_existing = self
            .points
            .iter()
            .any(|p| self.context.to_canvas(p.position).distance(&at) < radius);
        if on_existing {
            return;
        }
        let position = self.context.to_data(at);
        match self.points.add_point(position, PointLabel::Class(self.selected_class)) {
            Ok(_) => self.refit(),
            Err(error) => {
                self.context.ignore_rejected(LabKind::Svm, error);
            }
        }
    }

    fn drag_point(&mut self, id: PointId, at: PixelPoint) {
        let position = self.context.to_data(at);
        let margin = self.context.config().drag_margin;
        if self.points.move_point(id, position, margin).is_ok() {
            self.refit();
        }
    }

    fn hit_candidates(&self) -> Vec<HitCandidate> {
        let radius = self.context.config().hit_radii.support_vector;
        self.fit
            .support_vectors
            .iter()
            .filter_map(|sv| self.points.get(sv.id))
            .map(|p| HitCandidate::point(p.id, self.context.to_canvas(p.position), radius))
            .collect()
    }
}

impl Lab for SvmLab {
    fn kind(&self) -> LabKind {
        LabKind::Svm
    }

    fn context(&self) -> &LabContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut LabContext {
        &mut self.context
    }

    fn parameters(&self) -> Vec<LabParameter> {
        vec![
            LabParameter::choice("kernel", self.model.kernel.name(), &["linear", "rbf"]),
            LabParameter::float("c", self.model.c, C_RANGE.0, C_RANGE.1),
            LabParameter::float("gamma", self.model.gamma, GAMMA_RANGE.0, GAMMA_RANGE.1),
            LabParameter::choice("class", &self.selected_class.to_string().to_lowercase(), &["a", "b"]),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> LabResult<()> {
        let parameters = self.parameters();
        let descriptor = find_parameter(&parameters, name)?;
        match name {
            "kernel" => {
                self.model.kernel = match descriptor.parse_choice(value)? {
                    "rbf" => Kernel::Rbf,
                    _ => Kernel::Linear,
                };
            }
            "c" => self.model.c = descriptor.parse_float(value)?,
            "gamma" => self.model.gamma = descriptor.parse_float(value)?,
            _ => {
                let choice = descriptor.parse_choice(&value.to_lowercase())?.to_owned();
                self.selected_class = ClassLabel::parse(&choice)
                    .ok_or_else(|| LabError::invalid_parameter(name, format!("unknown class '{choice}'")))?;
                return Ok(());
            }
        }
        self.refit();
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
                self.selected_class = *class;
                Ok(())
            }
            other => Err(other.unsupported(LabKind::Svm)),
        };
        result.or_else(|error| self.context.report(LabKind::Svm, error))
    }

    fn handle_pointer(&mut self, event: &PointerEvent) {
        let candidates = self.hit_candidates();
        match self.context.pointer.handle(event, &candidates, PressBehavior::Click) {
            PointerIntent::Click { at, .. } => self.add_point_at(at),
            PointerIntent::DragTo(HitTarget::Point(id), at) => self.drag_point(id, at),
            PointerIntent::EndDrag(HitTarget::Point(id)) => self.points.set_dragged(id, false),
            PointerIntent::BeginDrag(HitTarget::Point(id), _) => self.points.set_dragged(id, true),
            _ => {}
        }
    }

    fn tick(&mut self, dt_ms: f64) {
        self.context.advance_clock(dt_ms);
        self.points.advance_arrivals(dt_ms);
    }

    fn snapshot(&self) -> LabSnapshot {
        LabSnapshot {
            lab: LabKind::Svm,
            phase: if self.fit.is_empty() { "unfitted" } else { "fitted" }.to_owned(),
            parameters: self.parameters(),
            statistics: LabStatistics::Svm {
                kernel: self.fit.kernel.name().to_owned(),
                support_vectors: self.fit.support_vectors.len(),
                margin: self.fit.margin,
                accuracy: self.accuracy(),
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
    use crate::geometry::DataPoint;
    use crate::simulation::Sample;

    fn lab() -> SvmLab {
        SvmLab::new(LabConfig::seeded(3), ContainerSize::new(800.0, 600.0)).unwrap()
    }

    #[test]
    fn test_separable_preset_fits_linear_boundary() {
        let lab = lab();
        assert_eq!(lab.model().kernel, Kernel::Linear);
        assert!(lab.fit().hyperplane.is_some());
        assert!(lab.fit().support_vectors.len() >= 2);
        assert!(lab.fit().margin > 0.0);
    }

    #[test]
    fn test_circular_preset_switches_to_rbf() {
        let mut lab = lab();
        lab.trigger("load-preset:circular").unwrap();
        assert_eq!(lab.model().kernel, Kernel::Rbf);
        assert_eq!(lab.get_parameter("kernel").unwrap(), "rbf");
        lab.trigger("load-preset:overlap").unwrap();
        assert_eq!(lab.model().kernel, Kernel::Linear);
    }

    #[test]
    fn test_single_class_gives_empty_fit() {
        let mut lab = lab();
        lab.trigger("clear").unwrap();
        lab.points.insert_sample(Sample::new(2.0, 2.0, PointLabel::Class(ClassLabel::A)));
        lab.refit();
        assert!(lab.fit().is_empty());
        assert_eq!(lab.snapshot().phase, "unfitted");
    }

    #[test]
    fn test_dragging_support_vector_refits() {
        let mut lab = lab();
        lab.trigger("clear").unwrap();
        lab.points.insert_sample(Sample::new(3.0, 5.0, PointLabel::Class(ClassLabel::A)));
        lab.points.insert_sample(Sample::new(7.0, 5.0, PointLabel::Class(ClassLabel::B)));
        lab.refit();
        let before = lab.fit().hyperplane.unwrap();

        let grab = lab.context.to_canvas(DataPoint::new(7.0, 5.0));
        let drop = lab.context.to_canvas(DataPoint::new(9.0, 5.0));
        lab.handle_pointer(&PointerEvent::down(grab.x, grab.y, 0.0));
        lab.handle_pointer(&PointerEvent::moved(drop.x, drop.y, 16.0));
        lab.handle_pointer(&PointerEvent::up(drop.x, drop.y, 32.0));

        let after = lab.fit().hyperplane.unwrap();
        assert!((before.b - after.b).abs() > 0.5);
        assert_eq!(lab.points().len(), 2);
    }

    #[test]
    fn test_click_adds_selected_class() {
        let mut lab = lab();
        lab.trigger("clear").unwrap();
        lab.trigger("brush:b").unwrap();
        let at = lab.context.to_canvas(DataPoint::new(4.0, 4.0));
        lab.handle_pointer(&PointerEvent::down(at.x, at.y, 0.0));
        lab.handle_pointer(&PointerEvent::up(at.x, at.y, 5.0));
        // A second click on the same spot is swallowed
        lab.handle_pointer(&PointerEvent::down(at.x + 2.0, at.y, 10.0));
        assert_eq!(lab.points().count_class(ClassLabel::B), 1);
    }

    #[test]
    fn test_c_is_validated() {
        let mut lab = lab();
        lab.set_parameter("c", "0.5").unwrap();
        assert_eq!(lab.model().c, 0.5);
        assert!(lab.set_parameter("c", "7").is_err());
    }
}
