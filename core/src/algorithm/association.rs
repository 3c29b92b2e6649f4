//! Pairwise association rules over shopping baskets
//!
//! Only single-item antecedents and consequents are mined: every unordered
//! pair that co-occurs in some basket yields up to two rules, `a -> b` and
//! `b -> a`, filtered by minimum support and confidence and ordered by
//! descending lift.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::traits::ContinuousModel;
use crate::error::{LabError, LabResult};
use crate::geometry::PixelPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Item {
    Milk,
    Bread,
    Beer,
    Diapers,
    Eggs,
    Butter,
    Cheese,
    Chips,
}

impl Item {
    pub const ALL: [Item; 8] = [
        Item::Milk,
        Item::Bread,
        Item::Beer,
        Item::Diapers,
        Item::Eggs,
        Item::Butter,
        Item::Cheese,
        Item::Chips,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Item::Milk => "milk",
            Item::Bread => "bread",
            Item::Beer => "beer",
            Item::Diapers => "diapers",
            Item::Eggs => "eggs",
            Item::Butter => "butter",
            Item::Cheese => "cheese",
            Item::Chips => "chips",
        }
    }
}

/// Items order alphabetically by key
impl Ord for Item {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(other.key())
    }
}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Item {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Item::ALL
            .into_iter()
            .find(|item| item.key() == s)
            .ok_or_else(|| LabError::UnknownEntity(format!("item '{s}'")))
    }
}

/// One transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    pub id: u32,
    pub items: Vec<Item>,
}

impl Basket {
    pub fn new(id: u32) -> Self {
        Self { id, items: Vec::new() }
    }

    /// Adds `item` unless already present; returns whether it was added
    pub fn add(&mut self, item: Item) -> bool {
        if self.items.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, item: Item) -> bool {
        let before = self.items.len();
        self.items.retain(|i| *i != item);
        self.items.len() != before
    }
}

/// The classic twelve-transaction dataset with a strong beer/diapers pairing
pub fn classic_baskets() -> Vec<Basket> {
    use Item::*;
    let transactions: [&[Item]; 12] = [
        &[Milk, Bread, Butter],
        &[Beer, Diapers],
        &[Milk, Bread, Eggs],
        &[Beer, Diapers, Chips],
        &[Milk, Bread, Butter, Eggs],
        &[Beer, Diapers],
        &[Bread, Butter, Cheese],
        &[Milk, Eggs],
        &[Beer, Diapers, Chips],
        &[Bread, Cheese, Butter],
        &[Milk, Bread],
        &[Beer, Diapers],
    ];
    transactions
        .iter()
        .zip(1..)
        .map(|(items, id)| Basket {
            id,
            items: items.to_vec(),
        })
        .collect()
}

/// Ten baskets of two to five distinct random items
pub fn random_baskets<R: Rng + ?Sized>(rng: &mut R) -> Vec<Basket> {
    (1..=10)
        .map(|id| {
            let count = rng.gen_range(2..=5);
            let mut items = Item::ALL.to_vec();
            items.shuffle(rng);
            items.truncate(count);
            Basket { id, items }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRule<T> {
    pub antecedent: T,
    pub consequent: T,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
}

/// Mines single-item rules from `baskets`
///
/// Duplicate items inside one basket are counted once. Every basket counts
/// as a transaction, empty ones included. Pairs are keyed smaller item
/// first and visited in the order they first appear, so rules with equal
/// lift keep that order.
pub fn mine_pair_rules<T>(baskets: &[Vec<T>], min_support: f64, min_confidence: f64) -> Vec<PairRule<T>>
where
    T: Ord + Clone,
{
    if baskets.is_empty() {
        return Vec::new();
    }
    let total = baskets.len() as f64;

    let mut item_counts: BTreeMap<T, usize> = BTreeMap::new();
    let mut pair_counts: Vec<((T, T), usize)> = Vec::new();
    for basket in baskets {
        let mut unique: Vec<&T> = Vec::with_capacity(basket.len());
        for item in basket {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        for item in &unique {
            *item_counts.entry((*item).clone()).or_insert(0) += 1;
        }
        for (i, a) in unique.iter().enumerate() {
            for b in &unique[i + 1..] {
                let key = if a <= b {
                    ((*a).clone(), (*b).clone())
                } else {
                    ((*b).clone(), (*a).clone())
                };
                match pair_counts.iter_mut().find(|(pair, _)| *pair == key) {
                    Some((_, count)) => *count += 1,
                    None => pair_counts.push((key, 1)),
                }
            }
        }
    }

    let mut rules = Vec::new();
    for ((a, b), count) in pair_counts {
        let support = count as f64 / total;
        if support < min_support {
            continue;
        }
        let count_a = item_counts.get(&a).copied().unwrap_or(0) as f64;
        let count_b = item_counts.get(&b).copied().unwrap_or(0) as f64;
        let lift = support / ((count_a / total) * (count_b / total));
        for (antecedent, consequent, antecedent_count) in [(&a, &b, count_a), (&b, &a, count_b)] {
            let confidence = count as f64 / antecedent_count;
            if confidence >= min_confidence {
                rules.push(PairRule {
                    antecedent: antecedent.clone(),
                    consequent: consequent.clone(),
                    support,
                    confidence,
                    lift,
                });
            }
        }
    }
    // Stable: equal lifts keep first-seen pair order
    rules.sort_by(|x, y| y.lift.total_cmp(&x.lift));
    rules
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub item: Item,
    pub position: PixelPoint,
}

/// Rule graph laid out on a circle; `links[i]` connects the nodes of rule `i`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<(usize, usize)>,
}

impl RuleGraph {
    /// Places every item used by a rule evenly on a circle, first at the top
    pub fn layout(rules: &[PairRule<Item>], width: f64, height: f64) -> Self {
        let mut items: Vec<Item> = Vec::new();
        for rule in rules {
            for item in [rule.antecedent, rule.consequent] {
                if !items.contains(&item) {
                    items.push(item);
                }
            }
        }
        let (cx, cy) = (width / 2.0, height / 2.0);
        let radius = (cx.min(cy) - 60.0).max(0.0);
        let count = items.len().max(1) as f64;
        let nodes: Vec<GraphNode> = items
            .iter()
            .enumerate()
            .map(|(i, &item)| {
                let angle = i as f64 / count * TAU - FRAC_PI_2;
                GraphNode {
                    item,
                    position: PixelPoint::new(cx + angle.cos() * radius, cy + angle.sin() * radius),
                }
            })
            .collect();
        let index_of = |item: Item| items.iter().position(|i| *i == item).unwrap_or(0);
        let links = rules
            .iter()
            .map(|r| (index_of(r.antecedent), index_of(r.consequent)))
            .collect();
        Self { nodes, links }
    }

    /// Endpoints of the link for rule `index`
    pub fn link_segment(&self, index: usize) -> Option<(PixelPoint, PixelPoint)> {
        let &(from, to) = self.links.get(index)?;
        Some((self.nodes.get(from)?.position, self.nodes.get(to)?.position))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssociationModel {
    pub min_support: f64,
    pub min_confidence: f64,
}

impl Default for AssociationModel {
    fn default() -> Self {
        Self {
            min_support: 0.2,
            min_confidence: 0.5,
        }
    }
}

impl ContinuousModel for AssociationModel {
    type Input = [Basket];
    type Output = Vec<PairRule<Item>>;

    fn recompute(&self, baskets: &[Basket]) -> Vec<PairRule<Item>> {
        let transactions: Vec<Vec<Item>> = baskets.iter().map(|b| b.items.clone()).collect();
        mine_pair_rules(&transactions, self.min_support, self.min_confidence)
    }
}

/// Parses `<basket-id>:<item>` as used by the add/remove item commands
pub fn parse_basket_item(raw: &str) -> LabResult<(u32, Item)> {
    let (basket, item) = raw
        .split_once(':')
        .ok_or_else(|| LabError::UnknownAction(format!("expected <basket>:<item>, got '{raw}'")))?;
    let basket = basket
        .parse()
        .map_err(|_| LabError::UnknownEntity(format!("basket '{basket}'")))?;
    Ok((basket, item.parse()?))
}
