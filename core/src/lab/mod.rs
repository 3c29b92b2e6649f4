//! Lab instances and the host command surface
//!
//! A lab owns its simulation state, its engine and the pointer machine that
//! drives them. Hosts talk to a lab through the [`Lab`] trait: parameter
//! strings from sliders, action strings from buttons, pointer events in
//! logical pixels, container resizes and one `tick` per display frame.
//! Everything the host shows is read back through [`LabSnapshot`].
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod association_lab;
pub mod kmeans_lab;
pub mod knn_lab;
pub mod linear_lab;
pub mod logistic_lab;
pub mod svm_lab;
pub mod tree_lab;

use std::fmt;
use std::str::FromStr;

use log::{trace, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::algorithm::association::PairRule;
use crate::algorithm::association::Item;
use crate::algorithm::decision_tree::Feature;
use crate::algorithm::knn::Vote;
use crate::algorithm::logistic::Accuracy;
use crate::algorithm::regression::FitStatistics;
use crate::algorithm::{find_parameter, LabParameter};
use crate::config::LabConfig;
use crate::error::{ErrorKind, LabError, LabResult};
use crate::execution::AnimationClock;
use crate::geometry::viewport::{BackingStore, ContainerSize, CoordinateTransform, ResizeSignal};
use crate::geometry::{DataPoint, DomainBounds, PixelPoint};
use crate::interaction::{CursorHint, PointerEvent, PointerStateMachine};
use crate::simulation::ClassLabel;

pub use association_lab::AssociationLab;
pub use kmeans_lab::KMeansLab;
pub use knn_lab::KnnLab;
pub use linear_lab::LinearRegressionLab;
pub use logistic_lab::LogisticLab;
pub use svm_lab::SvmLab;
pub use tree_lab::DecisionTreeLab;

/// Identifier of a lab, matching the host page ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabKind {
    LinearRegression,
    LogisticRegression,
    DecisionTrees,
    Svm,
    Knn,
    #[serde(rename = "kmeans")]
    KMeans,
    AssociationRules,
}

impl LabKind {
    pub const ALL: [LabKind; 7] = [
        LabKind::LinearRegression,
        LabKind::LogisticRegression,
        LabKind::DecisionTrees,
        LabKind::Svm,
        LabKind::Knn,
        LabKind::KMeans,
        LabKind::AssociationRules,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            LabKind::LinearRegression => "linear-regression",
            LabKind::LogisticRegression => "logistic-regression",
            LabKind::DecisionTrees => "decision-trees",
            LabKind::Svm => "svm",
            LabKind::Knn => "knn",
            LabKind::KMeans => "kmeans",
            LabKind::AssociationRules => "association-rules",
        }
    }
}

impl fmt::Display for LabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for LabKind {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        // The achievement page historically used the short id
        if id == "association" {
            return Ok(LabKind::AssociationRules);
        }
        LabKind::ALL
            .into_iter()
            .find(|kind| kind.id() == id)
            .ok_or_else(|| LabError::UnknownEntity(format!("lab '{id}'")))
    }
}

/// 1D or 2D logistic view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    OneD,
    TwoD,
}

/// Enumerated host actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabCommand {
    InitCentroids,
    StepAssign,
    StepUpdate,
    ToggleAuto,
    Clear,
    LoadPreset(String),
    AddOutlier,
    RunGradientDescent,
    Split(Feature),
    Prune,
    AutoSort,
    AddBasket,
    AddItem { basket: u32, item: Item },
    RemoveItem { basket: u32, item: Item },
    SelectRule(usize),
    Brush(ClassLabel),
    View(ViewMode),
}

impl LabCommand {
    pub fn name(&self) -> &'static str {
        match self {
            LabCommand::InitCentroids => "init-centroids",
            LabCommand::StepAssign => "step-assign",
            LabCommand::StepUpdate => "step-update",
            LabCommand::ToggleAuto => "toggle-auto",
            LabCommand::Clear => "clear",
            LabCommand::LoadPreset(_) => "load-preset",
            LabCommand::AddOutlier => "add-outlier",
            LabCommand::RunGradientDescent => "run-gradient-descent",
            LabCommand::Split(_) => "split",
            LabCommand::Prune => "prune",
            LabCommand::AutoSort => "auto-sort",
            LabCommand::AddBasket => "add-basket",
            LabCommand::AddItem { .. } => "add-item",
            LabCommand::RemoveItem { .. } => "remove-item",
            LabCommand::SelectRule(_) => "select-rule",
            LabCommand::Brush(_) => "brush",
            LabCommand::View(_) => "view",
        }
    }

    /// Error for a command the receiving lab does not understand
    pub(crate) fn unsupported(&self, lab: LabKind) -> LabError {
        LabError::UnknownAction(format!("{} is not available in the {lab} lab", self.name()))
    }
}

impl FromStr for LabCommand {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (head, argument) = match raw.split_once(':') {
            Some((head, rest)) => (head, Some(rest)),
            None => (raw, None),
        };
        let missing = || LabError::UnknownAction(format!("'{raw}' needs an argument"));

        let command = match (head, argument) {
            ("init-centroids", None) => LabCommand::InitCentroids,
            ("step-assign", None) => LabCommand::StepAssign,
            ("step-update", None) => LabCommand::StepUpdate,
            ("toggle-auto", None) => LabCommand::ToggleAuto,
            ("clear", None) => LabCommand::Clear,
            ("add-outlier", None) => LabCommand::AddOutlier,
            ("run-gradient-descent", None) => LabCommand::RunGradientDescent,
            ("prune", None) => LabCommand::Prune,
            ("auto-sort", None) => LabCommand::AutoSort,
            ("add-basket", None) => LabCommand::AddBasket,
            ("load-preset", Some(name)) if !name.is_empty() => LabCommand::LoadPreset(name.to_owned()),
            ("split", Some(feature)) => LabCommand::Split(feature.parse()?),
            ("add-item", Some(rest)) => {
                let (basket, item) = crate::algorithm::association::parse_basket_item(rest)?;
                LabCommand::AddItem { basket, item }
            }
            ("remove-item", Some(rest)) => {
                let (basket, item) = crate::algorithm::association::parse_basket_item(rest)?;
                LabCommand::RemoveItem { basket, item }
            }
            ("select-rule", Some(index)) => LabCommand::SelectRule(
                index
                    .parse()
                    .map_err(|_| LabError::UnknownEntity(format!("rule '{index}'")))?,
            ),
            ("brush", Some(class)) => LabCommand::Brush(
                ClassLabel::parse(class).ok_or_else(|| LabError::UnknownEntity(format!("class '{class}'")))?,
            ),
            ("view", Some("1d")) => LabCommand::View(ViewMode::OneD),
            ("view", Some("2d")) => LabCommand::View(ViewMode::TwoD),
            ("load-preset" | "split" | "add-item" | "remove-item" | "select-rule" | "brush" | "view", _) => {
                return Err(missing())
            }
            _ => return Err(LabError::UnknownAction(raw.to_owned())),
        };
        Ok(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// User-facing message carried by the read model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Read-only summary of one association rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub rule: PairRule<Item>,
    pub selected: bool,
}

/// Lab-specific derived statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "lab", rename_all = "kebab-case")]
pub enum LabStatistics {
    #[serde(rename = "kmeans")]
    KMeans {
        iteration: usize,
        wcss: f64,
        unassigned: usize,
        centroids: Vec<DataPoint>,
        last_displacement: Option<f64>,
    },
    Knn {
        votes_a: usize,
        votes_b: usize,
        prediction: Option<Vote>,
        k_radius: f64,
        query: DataPoint,
    },
    Svm {
        kernel: String,
        support_vectors: usize,
        margin: f64,
        accuracy: Accuracy,
    },
    LinearRegression {
        slope: f64,
        intercept: f64,
        fit: Option<FitStatistics>,
    },
    LogisticRegression {
        view: ViewMode,
        accuracy: Accuracy,
        crossing: Option<f64>,
        hover_probability: Option<f64>,
    },
    DecisionTrees {
        entropy: f64,
        gain_color: f64,
        gain_shape: f64,
        depth: usize,
        piles: usize,
        sorted: bool,
    },
    AssociationRules {
        baskets: usize,
        transactions: usize,
        rules: Vec<RuleSummary>,
    },
}

/// Plain-data read model rendered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabSnapshot {
    pub lab: LabKind,
    pub phase: String,
    pub parameters: Vec<LabParameter>,
    pub statistics: LabStatistics,
    pub notices: Vec<Notice>,
    pub cursor: CursorHint,
    pub point_count: usize,
    pub auto_running: bool,
    pub animating: bool,
}

/// State every lab carries besides its domain data
#[derive(Debug, Clone)]
pub struct LabContext {
    config: LabConfig,
    transform: CoordinateTransform,
    resize_signal: ResizeSignal,
    pub pointer: PointerStateMachine,
    clock: AnimationClock,
    pub rng: ChaCha8Rng,
    notices: Vec<Notice>,
}

impl LabContext {
    pub fn new(config: LabConfig, size: ContainerSize) -> LabResult<Self> {
        let domain = config.domain;
        Self::with_domain(config, domain, size)
    }

    /// Context whose transform maps a lab-specific domain
    pub fn with_domain(config: LabConfig, domain: DomainBounds, size: ContainerSize) -> LabResult<Self> {
        config.validate()?;
        let transform = CoordinateTransform::new(
            domain,
            size,
            config.device_pixel_ratio,
            config.padding,
            config.min_logical_size,
        )?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut resize_signal = ResizeSignal::new();
        resize_signal.observe(size);
        Ok(Self {
            pointer: PointerStateMachine::new(config.timings.paint_throttle_ms),
            config,
            transform,
            resize_signal,
            clock: AnimationClock::new(),
            rng,
            notices: Vec::new(),
        })
    }

    #[inline]
    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    #[inline]
    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn advance_clock(&mut self, dt_ms: f64) -> f64 {
        self.clock.advance(dt_ms)
    }

    /// Resizes the transform when the container really changed
    pub fn resize(&mut self, size: ContainerSize) -> Option<BackingStore> {
        let size = self.resize_signal.observe(size)?;
        let backing = self.transform.resize(size.width, size.height);
        trace!("resized to {}x{} ({}x{} backing)", size.width, size.height, backing.width, backing.height);
        Some(backing)
    }

    pub fn to_data(&self, p: PixelPoint) -> DataPoint {
        self.transform.to_data(p)
    }

    pub fn to_canvas(&self, p: DataPoint) -> PixelPoint {
        self.transform.to_canvas(p)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn push_notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    /// Drops the notices of the previous command
    pub fn clear_notices(&mut self) {
        self.notices.clear();
    }

    /// Applies the propagation policy to a failed operation
    ///
    /// Precondition failures become user-visible notices, rejected input is
    /// dropped, everything else is logged and handed back to the caller.
    pub fn report(&mut self, lab: LabKind, error: LabError) -> LabResult<()> {
        match error.kind() {
            ErrorKind::InvalidCommand | ErrorKind::Configuration => {
                warn!("{lab}: rejected: {error}");
                Err(error)
            }
            _ => {
                self.ignore_rejected(lab, error);
                Ok(())
            }
        }
    }

    /// Absorbs a failure raised by pointer input, which has no caller to answer
    ///
    /// Precondition failures still surface as notices; anything else is only
    /// traced.
    pub fn ignore_rejected(&mut self, lab: LabKind, error: LabError) {
        match error.kind() {
            ErrorKind::PreconditionFailed => {
                warn!("{lab}: {error}");
                self.push_notice(NoticeLevel::Error, error.to_string());
            }
            _ => trace!("{lab}: ignored {error}"),
        }
    }
}

/// Host-facing surface of a lab
pub trait Lab {
    fn kind(&self) -> LabKind;

    fn context(&self) -> &LabContext;

    fn context_mut(&mut self) -> &mut LabContext;

    /// Current parameter descriptors, values included
    fn parameters(&self) -> Vec<LabParameter>;

    /// Validates and applies a host parameter value
    fn set_parameter(&mut self, name: &str, value: &str) -> LabResult<()>;

    fn get_parameter(&self, name: &str) -> LabResult<String> {
        let parameters = self.parameters();
        find_parameter(&parameters, name).map(|p| p.value.clone())
    }

    /// Runs one command; precondition failures are recorded as notices
    fn trigger_action(&mut self, command: &LabCommand) -> LabResult<()>;

    /// Parses and runs a host action string
    fn trigger(&mut self, action: &str) -> LabResult<()> {
        let command = match action.parse::<LabCommand>() {
            Ok(command) => command,
            Err(error) => {
                warn!("{}: {error}", self.kind());
                return Err(error);
            }
        };
        self.trigger_action(&command)
    }

    fn handle_pointer(&mut self, event: &PointerEvent);

    fn resize(&mut self, size: ContainerSize) -> Option<BackingStore> {
        self.context_mut().resize(size)
    }

    /// Advances animations and scheduled work by one frame
    fn tick(&mut self, dt_ms: f64);

    fn snapshot(&self) -> LabSnapshot;

    fn transform(&self) -> &CoordinateTransform {
        self.context().transform()
    }

    fn elapsed_ms(&self) -> f64 {
        self.context().now_ms()
    }

    fn cursor(&self) -> CursorHint {
        self.context().pointer.cursor()
    }
}

/// Builds the lab for `kind`
pub fn create_lab(kind: LabKind, config: LabConfig, size: ContainerSize) -> LabResult<Box<dyn Lab>> {
    let lab: Box<dyn Lab> = match kind {
        LabKind::LinearRegression => Box::new(LinearRegressionLab::new(config, size)?),
        LabKind::LogisticRegression => Box::new(LogisticLab::new(config, size)?),
        LabKind::DecisionTrees => Box::new(DecisionTreeLab::new(config, size)?),
        LabKind::Svm => Box::new(SvmLab::new(config, size)?),
        LabKind::Knn => Box::new(KnnLab::new(config, size)?),
        LabKind::KMeans => Box::new(KMeansLab::new(config, size)?),
        LabKind::AssociationRules => Box::new(AssociationLab::new(config, size)?),
    };
    Ok(lab)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!("init-centroids".parse::<LabCommand>().unwrap(), LabCommand::InitCentroids);
        assert_eq!(
            "load-preset:clusters".parse::<LabCommand>().unwrap(),
            LabCommand::LoadPreset("clusters".into())
        );
        assert_eq!("split:color".parse::<LabCommand>().unwrap(), LabCommand::Split(Feature::Color));
        assert_eq!(
            "add-item:2:beer".parse::<LabCommand>().unwrap(),
            LabCommand::AddItem { basket: 2, item: Item::Beer }
        );
        assert_eq!("brush:blue".parse::<LabCommand>().unwrap(), LabCommand::Brush(ClassLabel::B));
        assert_eq!("view:1d".parse::<LabCommand>().unwrap(), LabCommand::View(ViewMode::OneD));
        assert_eq!("select-rule:3".parse::<LabCommand>().unwrap(), LabCommand::SelectRule(3));
    }

    #[test]
    fn test_unknown_commands_are_invalid() {
        for raw in ["fly", "load-preset", "view:3d", "split:taste", "brush:green", "clear:now"] {
            let err = raw.parse::<LabCommand>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidCommand, "{raw}");
        }
    }

    #[test]
    fn test_lab_ids_round_trip() {
        for kind in LabKind::ALL {
            assert_eq!(kind.id().parse::<LabKind>().unwrap(), kind);
        }
        assert_eq!("association".parse::<LabKind>().unwrap(), LabKind::AssociationRules);
    }

    #[test]
    fn test_report_policy() {
        let mut context = LabContext::new(LabConfig::seeded(1), ContainerSize::new(800.0, 600.0)).unwrap();
        assert!(context
            .report(LabKind::KMeans, LabError::PreconditionFailed("Need at least 3 points".into()))
            .is_ok());
        assert_eq!(context.notices().len(), 1);
        assert!(context
            .report(LabKind::KMeans, LabError::OutOfBounds { x: -1.0, y: 0.0 })
            .is_ok());
        assert_eq!(context.notices().len(), 1);
        assert!(context
            .report(LabKind::KMeans, LabError::UnknownAction("x".into()))
            .is_err());
    }

    #[test]
    fn test_ignore_rejected_never_fails() {
        let mut context = LabContext::new(LabConfig::seeded(1), ContainerSize::new(800.0, 600.0)).unwrap();
        context.ignore_rejected(LabKind::Knn, LabError::UnknownAction("x".into()));
        context.ignore_rejected(LabKind::Knn, LabError::OutOfBounds { x: -1.0, y: 0.0 });
        assert!(context.notices().is_empty());
        context.ignore_rejected(LabKind::Knn, LabError::PreconditionFailed("Need a point".into()));
        assert_eq!(context.notices().len(), 1);
    }

    #[test]
    fn test_resize_only_on_change() {
        let mut context = LabContext::new(LabConfig::default(), ContainerSize::new(800.0, 600.0)).unwrap();
        assert!(context.resize(ContainerSize::new(800.0, 600.0)).is_none());
        let backing = context.resize(ContainerSize::new(400.0, 300.0)).unwrap();
        assert_eq!(backing, BackingStore { width: 400, height: 300 });
    }
}
