//! Greedy decision-tree construction over a pile of fruit
//!
//! Each split partitions every mixed pile by one categorical feature.
//! Gains and entropies are measured over fruit kinds in bits.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::traits::{StepOutcome, SteppedAlgorithm};
use crate::error::{LabError, LabResult};
use crate::geometry::PixelPoint;

/// Fruits generated for a fresh pile
pub const FRUIT_COUNT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FruitKind {
    RedApple,
    GreenApple,
    Banana,
    Orange,
    Lemon,
    Grape,
}

impl FruitKind {
    pub const ALL: [FruitKind; 6] = [
        FruitKind::RedApple,
        FruitKind::GreenApple,
        FruitKind::Banana,
        FruitKind::Orange,
        FruitKind::Lemon,
        FruitKind::Grape,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FruitKind::RedApple => "Red Apple",
            FruitKind::GreenApple => "Green Apple",
            FruitKind::Banana => "Banana",
            FruitKind::Orange => "Orange",
            FruitKind::Lemon => "Lemon",
            FruitKind::Grape => "Grape",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            FruitKind::RedApple => "red",
            FruitKind::GreenApple => "green",
            FruitKind::Banana | FruitKind::Lemon => "yellow",
            FruitKind::Orange => "orange",
            FruitKind::Grape => "purple",
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            FruitKind::Banana => "long",
            FruitKind::Lemon => "oval",
            _ => "round",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Color,
    Shape,
}

impl Feature {
    pub const ALL: [Feature; 2] = [Feature::Color, Feature::Shape];

    pub fn value_of(&self, kind: FruitKind) -> &'static str {
        match self {
            Feature::Color => kind.color(),
            Feature::Shape => kind.shape(),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Color => write!(f, "color"),
            Feature::Shape => write!(f, "shape"),
        }
    }
}

impl FromStr for Feature {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "color" => Ok(Feature::Color),
            "shape" => Ok(Feature::Shape),
            other => Err(LabError::invalid_parameter("feature", format!("unknown feature '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fruit {
    pub id: usize,
    pub kind: FruitKind,
}

/// A leaf of the current tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pile {
    /// Feature values on the path from the root, e.g. `["yellow", "long"]`
    pub path: Vec<String>,
    /// Indices into the fruit list
    pub members: Vec<usize>,
}

impl Pile {
    pub fn label(&self) -> &str {
        self.path.last().map_or("mixed", String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRecord {
    pub feature: Feature,
    pub level: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreePhase {
    /// One pile, no splits
    Mixed,
    Partial,
    /// Every pile holds a single kind
    Sorted,
}

/// Shannon entropy in bits of a multiset of fruit kinds
pub fn entropy<I: IntoIterator<Item = FruitKind>>(kinds: I) -> f64 {
    let mut counts: HashMap<FruitKind, usize> = HashMap::new();
    let mut total = 0usize;
    for kind in kinds {
        *counts.entry(kind).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / total as f64;
            -p * p.log2()
        })
        .sum()
}

/// Distinct feature values in order of first appearance
fn distinct_values(fruits: &[Fruit], members: &[usize], feature: Feature) -> Vec<&'static str> {
    let mut values = Vec::new();
    for &m in members {
        let value = feature.value_of(fruits[m].kind);
        if !values.contains(&value) {
            values.push(value);
        }
    }
    values
}

#[derive(Debug, Clone)]
pub struct FruitSorter {
    fruits: Vec<Fruit>,
    piles: Vec<Pile>,
    splits: Vec<SplitRecord>,
    /// Pile layouts before each split, restored by pruning
    undo: Vec<Vec<Pile>>,
}

impl FruitSorter {
    pub fn new(kinds: &[FruitKind]) -> Self {
        let fruits: Vec<Fruit> = kinds.iter().enumerate().map(|(id, &kind)| Fruit { id, kind }).collect();
        let members = (0..fruits.len()).collect();
        Self {
            fruits,
            piles: vec![Pile {
                path: Vec::new(),
                members,
            }],
            splits: Vec::new(),
            undo: Vec::new(),
        }
    }

    /// A fresh mixed pile of uniformly drawn fruit
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let kinds: Vec<FruitKind> = (0..FRUIT_COUNT)
            .map(|_| FruitKind::ALL[rng.gen_range(0..FruitKind::ALL.len())])
            .collect();
        Self::new(&kinds)
    }

    pub fn fruits(&self) -> &[Fruit] {
        &self.fruits
    }

    pub fn piles(&self) -> &[Pile] {
        &self.piles
    }

    pub fn splits(&self) -> &[SplitRecord] {
        &self.splits
    }

    pub fn depth(&self) -> usize {
        self.splits.len()
    }

    fn kinds_of<'a>(&'a self, members: &'a [usize]) -> impl Iterator<Item = FruitKind> + 'a {
        members.iter().map(move |&m| self.fruits[m].kind)
    }

    pub fn pile_entropy(&self, pile: &Pile) -> f64 {
        entropy(self.kinds_of(&pile.members))
    }

    /// Summed gain of splitting every splittable pile by `feature`
    pub fn information_gain(&self, feature: Feature) -> f64 {
        self.piles
            .iter()
            .filter(|pile| pile.members.len() > 1)
            .map(|pile| {
                let values = distinct_values(&self.fruits, &pile.members, feature);
                if values.len() <= 1 {
                    return 0.0;
                }
                let parent = self.pile_entropy(pile);
                let weighted: f64 = values
                    .iter()
                    .map(|value| {
                        let subset: Vec<usize> = pile
                            .members
                            .iter()
                            .copied()
                            .filter(|&m| feature.value_of(self.fruits[m].kind) == *value)
                            .collect();
                        let weight = subset.len() as f64 / pile.members.len() as f64;
                        weight * entropy(self.kinds_of(&subset))
                    })
                    .sum();
                parent - weighted
            })
            .sum()
    }

    /// Size-weighted mean entropy over all piles
    pub fn overall_entropy(&self) -> f64 {
        let total = self.fruits.len();
        if total == 0 {
            return 0.0;
        }
        let weighted: f64 = self
            .piles
            .iter()
            .map(|pile| self.pile_entropy(pile) * pile.members.len() as f64)
            .sum();
        weighted / total as f64
    }

    /// Upper bound on pile entropy given the kind catalog
    pub fn max_entropy() -> f64 {
        (FruitKind::ALL.len() as f64).log2()
    }

    pub fn is_perfectly_sorted(&self) -> bool {
        self.piles.iter().all(|pile| {
            let mut kinds = self.kinds_of(&pile.members);
            match kinds.next() {
                None => true,
                Some(first) => kinds.all(|k| k == first),
            }
        })
    }

    /// Feature with the strictly largest positive gain; color wins ties
    pub fn best_feature(&self) -> Option<(Feature, f64)> {
        let mut best: Option<(Feature, f64)> = None;
        for feature in Feature::ALL {
            let gain = self.information_gain(feature);
            if gain > best.map_or(0.0, |(_, g)| g) {
                best = Some((feature, gain));
            }
        }
        best
    }

    /// Splits every pile holding more than one value of `feature`
    ///
    /// Returns `false` and records nothing when no pile can be split.
    pub fn split(&mut self, feature: Feature) -> bool {
        let splittable = self.piles.iter().any(|pile| {
            pile.members.len() > 1 && distinct_values(&self.fruits, &pile.members, feature).len() > 1
        });
        if !splittable {
            return false;
        }

        let mut next = Vec::with_capacity(self.piles.len() * 2);
        for pile in &self.piles {
            let values = distinct_values(&self.fruits, &pile.members, feature);
            if pile.members.len() > 1 && values.len() > 1 {
                for value in values {
                    let mut path = pile.path.clone();
                    path.push(value.to_owned());
                    let members = pile
                        .members
                        .iter()
                        .copied()
                        .filter(|&m| feature.value_of(self.fruits[m].kind) == value)
                        .collect();
                    next.push(Pile { path, members });
                }
            } else {
                next.push(pile.clone());
            }
        }

        let previous = std::mem::replace(&mut self.piles, next);
        self.undo.push(previous);
        self.splits.push(SplitRecord {
            feature,
            level: self.splits.len(),
        });
        debug!("split by {feature}: {} piles", self.piles.len());
        true
    }

    /// Undoes the most recent split
    pub fn prune(&mut self) -> bool {
        match (self.splits.pop(), self.undo.pop()) {
            (Some(split), Some(piles)) => {
                self.piles = piles;
                debug!("pruned split by {}", split.feature);
                true
            }
            _ => false,
        }
    }

    /// Resting positions of every fruit, indexed by fruit id
    ///
    /// Piles sit side by side above the conveyor, centred, each at most
    /// 180 px wide, fruit stacked in rows of 45 px.
    pub fn layout(&self, width: f64, height: f64) -> Vec<PixelPoint> {
        let mut targets = vec![PixelPoint::new(0.0, 0.0); self.fruits.len()];
        let pile_count = self.piles.len();
        if pile_count == 0 {
            return targets;
        }
        let available = (width - 60.0).max(1.0);
        let pile_width = (available / pile_count as f64).min(180.0);
        let start_x = (width - pile_width * pile_count as f64) / 2.0 + pile_width / 2.0;
        let spacing = (pile_width / 4.5).min(40.0);
        let cols = ((pile_width / spacing).floor() as usize).max(2);

        for (pile_index, pile) in self.piles.iter().enumerate() {
            let pile_x = start_x + pile_index as f64 * pile_width;
            let pile_y = height - 80.0;
            for (i, &member) in pile.members.iter().enumerate() {
                let col = (i % cols) as f64;
                let row = (i / cols) as f64;
                let offset = (col - (cols as f64 - 1.0) / 2.0) * spacing;
                targets[member] = PixelPoint::new(pile_x + offset, pile_y - row * 45.0);
            }
        }
        targets
    }
}

impl SteppedAlgorithm for FruitSorter {
    type Input = ();
    type Phase = TreePhase;

    fn phase(&self) -> TreePhase {
        if self.is_perfectly_sorted() {
            TreePhase::Sorted
        } else if self.splits.is_empty() {
            TreePhase::Mixed
        } else {
            TreePhase::Partial
        }
    }

    /// Splits by the best-gain feature
    fn step(&mut self, _: &mut ()) -> LabResult<StepOutcome> {
        let Some((feature, _)) = self.best_feature() else {
            return Ok(StepOutcome::Idle);
        };
        if !self.split(feature) {
            return Ok(StepOutcome::Idle);
        }
        Ok(if self.is_terminal() {
            StepOutcome::Finished
        } else {
            StepOutcome::Advanced
        })
    }

    fn is_terminal(&self) -> bool {
        self.is_perfectly_sorted() || self.best_feature().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sorter() -> FruitSorter {
        FruitSorter::new(&[
            FruitKind::RedApple,
            FruitKind::Banana,
            FruitKind::Lemon,
            FruitKind::GreenApple,
            FruitKind::Banana,
            FruitKind::RedApple,
        ])
    }

    #[test]
    fn test_entropy() {
        assert_eq!(entropy(Vec::<FruitKind>::new()), 0.0);
        assert_eq!(entropy([FruitKind::Grape, FruitKind::Grape]), 0.0);
        assert_relative_eq!(entropy([FruitKind::Grape, FruitKind::Lemon]), 1.0);
    }

    #[test]
    fn test_color_split_creates_piles_in_first_seen_order() {
        let mut tree = sorter();
        assert!(tree.split(Feature::Color));
        let labels: Vec<&str> = tree.piles().iter().map(Pile::label).collect();
        assert_eq!(labels, vec!["red", "yellow", "green"]);
        assert_eq!(tree.phase(), TreePhase::Partial);
        // Yellow holds bananas and a lemon; shape separates them
        assert!(tree.information_gain(Feature::Shape) > 0.0);
        assert!(tree.split(Feature::Shape));
        assert!(tree.is_perfectly_sorted());
        assert_relative_eq!(tree.overall_entropy(), 0.0);
    }

    #[test]
    fn test_useless_split_is_rejected() {
        let mut tree = FruitSorter::new(&[FruitKind::RedApple, FruitKind::GreenApple]);
        assert!(!tree.split(Feature::Shape));
        assert!(tree.splits().is_empty());
    }

    #[test]
    fn test_prune_restores_previous_piles() {
        let mut tree = sorter();
        let before = tree.piles().to_vec();
        let entropy_before = tree.overall_entropy();
        tree.split(Feature::Shape);
        assert!(tree.overall_entropy() < entropy_before);
        assert!(tree.prune());
        assert_eq!(tree.piles(), before.as_slice());
        assert!(!tree.prune());
    }

    #[test]
    fn test_auto_steps_terminate_sorted() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut tree = FruitSorter::generate(&mut rng);
        let mut steps = 0;
        while !tree.is_terminal() {
            assert_ne!(tree.step(&mut ()).unwrap(), StepOutcome::Idle);
            steps += 1;
            assert!(steps <= 2);
        }
        // Color and shape together identify every kind
        assert!(tree.is_perfectly_sorted());
    }

    #[test]
    fn test_layout_stays_on_canvas() {
        let mut tree = sorter();
        tree.split(Feature::Color);
        let targets = tree.layout(600.0, 400.0);
        assert_eq!(targets.len(), 6);
        assert!(targets.iter().all(|p| p.x > 0.0 && p.x < 600.0 && p.y <= 320.0));
    }
}
