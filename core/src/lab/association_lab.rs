//! Interactive association rule lab
//!
//! Shopping baskets are edited item by item; rules between item pairs are
//! re-mined after every edit and drawn as a graph. Clicking a link (or the
//! `select-rule` command) highlights one rule.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, info};

use super::{Lab, LabCommand, LabContext, LabKind, LabSnapshot, LabStatistics, RuleSummary};
use crate::algorithm::association::{
    classic_baskets, random_baskets, AssociationModel, Basket, Item, PairRule, RuleGraph,
};
use crate::algorithm::{find_parameter, ContinuousModel, LabParameter};
use crate::config::LabConfig;
use crate::error::{LabError, LabResult};
use crate::geometry::viewport::{BackingStore, ContainerSize};
use crate::interaction::{HitCandidate, HitPriority, HitShape, HitTarget, PointerEvent, PointerIntent, PressBehavior};

pub const SUPPORT_RANGE: (f64, f64) = (0.05, 0.6);
pub const CONFIDENCE_RANGE: (f64, f64) = (0.1, 1.0);
const EMPTY_BASKETS: u32 = 3;

#[derive(Debug)]
pub struct AssociationLab {
    context: LabContext,
    baskets: Vec<Basket>,
    model: AssociationModel,
    rules: Vec<PairRule<Item>>,
    graph: RuleGraph,
    /// Antecedent and consequent of the highlighted rule
    selected: Option<(Item, Item)>,
}

impl AssociationLab {
    /// A lab holding the classic grocery transactions
    pub fn new(config: LabConfig, size: ContainerSize) -> LabResult<Self> {
        let mut lab = Self {
            context: LabContext::new(config, size)?,
            baskets: classic_baskets(),
            model: AssociationModel::default(),
            rules: Vec::new(),
            graph: RuleGraph::default(),
            selected: None,
        };
        lab.recompute();
        Ok(lab)
    }

    pub fn baskets(&self) -> &[Basket] {
        &self.baskets
    }

    pub fn rules(&self) -> &[PairRule<Item>] {
        &self.rules
    }

    pub fn graph(&self) -> &RuleGraph {
        &self.graph
    }

    /// Index of the highlighted rule
    pub fn selected_rule(&self) -> Option<usize> {
        let (antecedent, consequent) = self.selected?;
        self.rules
            .iter()
            .position(|r| r.antecedent == antecedent && r.consequent == consequent)
    }

    /// Every basket is a transaction, empty ones included
    pub fn transaction_count(&self) -> usize {
        self.baskets.len()
    }

    fn relayout(&mut self) {
        let viewport = self.context.transform().viewport();
        self.graph = RuleGraph::layout(&self.rules, viewport.logical_width, viewport.logical_height);
    }

    fn recompute(&mut self) {
        self.rules = self.model.recompute(&self.baskets);
        if self.selected_rule().is_none() {
            self.selected = None;
        }
        self.relayout();
        debug!("association: {} rules from {} transactions", self.rules.len(), self.baskets.len());
    }

    pub fn load_preset(&mut self, name: &str) -> LabResult<()> {
        self.baskets = match name {
            "classic" => classic_baskets(),
            "random" => random_baskets(&mut self.context.rng),
            other => {
                return Err(LabError::UnknownPreset {
                    lab: LabKind::AssociationRules.id().into(),
                    preset: other.to_owned(),
                })
            }
        };
        self.selected = None;
        self.recompute();
        info!("association: loaded {name} baskets ({} rules)", self.rules.len());
        Ok(())
    }

    /// Replaces every basket with a few empty ones
    pub fn clear(&mut self) {
        self.baskets = (1..=EMPTY_BASKETS).map(Basket::new).collect();
        self.selected = None;
        self.recompute();
    }

    pub fn add_basket(&mut self) -> u32 {
        let id = self.baskets.iter().map(|b| b.id).max().unwrap_or(0) + 1;
        self.baskets.push(Basket::new(id));
        id
    }

    fn basket_mut(&mut self, id: u32) -> LabResult<&mut Basket> {
        self.baskets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| LabError::UnknownEntity(format!("basket {id}")))
    }

    pub fn add_item(&mut self, basket: u32, item: Item) -> LabResult<()> {
        if !self.basket_mut(basket)?.add(item) {
            return Err(LabError::PreconditionFailed(format!("basket {basket} already holds {item}")));
        }
        self.recompute();
        Ok(())
    }

    pub fn remove_item(&mut self, basket: u32, item: Item) -> LabResult<()> {
        if !self.basket_mut(basket)?.remove(item) {
            return Err(LabError::PreconditionFailed(format!("basket {basket} holds no {item}")));
        }
        self.recompute();
        Ok(())
    }

    /// Highlights rule `index`, or clears the highlight when it is already selected
    pub fn toggle_rule(&mut self, index: usize) -> LabResult<()> {
        let rule = self
            .rules
            .get(index)
            .ok_or_else(|| LabError::UnknownEntity(format!("rule {index}")))?;
        let key = (rule.antecedent, rule.consequent);
        self.selected = if self.selected == Some(key) { None } else { Some(key) };
        Ok(())
    }

    fn hit_candidates(&self) -> Vec<HitCandidate> {
        let tolerance = self.context.config().hit_radii.link;
        (0..self.graph.links.len())
            .filter_map(|i| {
                let (from, to) = self.graph.link_segment(i)?;
                Some(HitCandidate {
                    target: HitTarget::Link(i),
                    shape: HitShape::Segment { from, to, tolerance },
                    priority: HitPriority::Marker,
                })
            })
            .collect()
    }
}

impl Lab for AssociationLab {
    fn kind(&self) -> LabKind {
        LabKind::AssociationRules
    }

    fn context(&self) -> &LabContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut LabContext {
        &mut self.context
    }

    fn parameters(&self) -> Vec<LabParameter> {
        vec![
            LabParameter::float("min_support", self.model.min_support, SUPPORT_RANGE.0, SUPPORT_RANGE.1),
            LabParameter::float(
                "min_confidence",
                self.model.min_confidence,
                CONFIDENCE_RANGE.0,
                CONFIDENCE_RANGE.1,
            ),
        ]
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> LabResult<()> {
        let parameters = self.parameters();
        let descriptor = find_parameter(&parameters, name)?;
        match name {
            "min_support" => self.model.min_support = descriptor.parse_float(value)?,
            _ => self.model.min_confidence = descriptor.parse_float(value)?,
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
            LabCommand::LoadPreset(name) => self.load_preset(name),
            LabCommand::AddBasket => {
                let id = self.add_basket();
                debug!("association: added basket {id}");
                Ok(())
            }
            LabCommand::AddItem { basket, item } => self.add_item(*basket, *item),
            LabCommand::RemoveItem { basket, item } => self.remove_item(*basket, *item),
            LabCommand::SelectRule(index) => self.toggle_rule(*index),
            other => Err(other.unsupported(LabKind::AssociationRules)),
        };
        result.or_else(|error| self.context.report(LabKind::AssociationRules, error))
    }

    fn handle_pointer(&mut self, event: &PointerEvent) {
        let candidates = self.hit_candidates();
        if let PointerIntent::BeginDrag(HitTarget::Link(index), _) =
            self.context.pointer.handle(event, &candidates, PressBehavior::Ignore)
        {
            if let Err(error) = self.toggle_rule(index) {
                self.context.ignore_rejected(LabKind::AssociationRules, error);
            }
        }
    }

    fn resize(&mut self, size: ContainerSize) -> Option<BackingStore> {
        let backing = self.context.resize(size)?;
        self.relayout();
        Some(backing)
    }

    fn tick(&mut self, dt_ms: f64) {
        self.context.advance_clock(dt_ms);
    }

    fn snapshot(&self) -> LabSnapshot {
        let selected = self.selected_rule();
        let rules = self
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| RuleSummary {
                rule: rule.clone(),
                selected: selected == Some(i),
            })
            .collect();
        LabSnapshot {
            lab: LabKind::AssociationRules,
            phase: if self.rules.is_empty() { "no-rules" } else { "mined" }.to_owned(),
            parameters: self.parameters(),
            statistics: LabStatistics::AssociationRules {
                baskets: self.baskets.len(),
                transactions: self.transaction_count(),
                rules,
            },
            notices: self.context.notices().to_vec(),
            cursor: self.cursor(),
            point_count: self.baskets.iter().map(|b| b.items.len()).sum(),
            auto_running: false,
            animating: false,
        }
    }
}
