//! Quiz progress and badge tracking
//!
//! The host page reports `(lab, score, total)` after each lab quiz. A badge
//! unlocks on the first perfect score for a lab; the grandmaster badge
//! unlocks once every lab has one. Progress is persisted as JSON through a
//! [`ProgressStore`].
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::{BTreeMap, HashMap};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{LabError, LabResult};
use crate::lab::LabKind;

/// Storage key of the serialized progress
pub const PROGRESS_KEY: &str = "ml_playground_progress";

const GRANDMASTER: &str = "grandmaster";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub name: &'static str,
    pub description: &'static str,
}

/// Badge earned by a perfect quiz in `lab`
pub fn badge_for(lab: LabKind) -> Badge {
    let (name, description) = match lab {
        LabKind::LinearRegression => ("Line Finder", "Master Linear Regression"),
        LabKind::LogisticRegression => ("Probability Pro", "Master Logistic Regression"),
        LabKind::DecisionTrees => ("Tree Builder", "Master Decision Trees"),
        LabKind::Svm => ("Margin Maximizer", "Master Support Vector Machines"),
        LabKind::Knn => ("Neighbor Expert", "Master K-Nearest Neighbors"),
        LabKind::KMeans => ("Cluster Champion", "Master K-Means Clustering"),
        LabKind::AssociationRules => ("Pattern Finder", "Master Association Rules"),
    };
    Badge { name, description }
}

pub const GRANDMASTER_BADGE: Badge = Badge {
    name: "ML Grandmaster",
    description: "Complete all labs with perfect scores",
};

/// Emitted for the host UI to celebrate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AchievementEvent {
    BadgeUnlocked { lab: LabKind, badge: Badge },
    Grandmaster { badge: Badge },
}

/// Receives quiz results from the host page
pub trait AchievementTracker {
    fn record_quiz_result(&mut self, lab: LabKind, score: u32, total: u32) -> LabResult<Vec<AchievementEvent>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabProgress {
    /// Best score seen so far
    pub score: u32,
    pub perfect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
    pub completed_labs: BTreeMap<LabKind, LabProgress>,
    pub total_quiz_attempts: u32,
    pub achievements: Vec<String>,
}

impl UserProgress {
    pub fn perfect_count(&self) -> usize {
        self.completed_labs.values().filter(|p| p.perfect).count()
    }

    pub fn is_grandmaster(&self) -> bool {
        LabKind::ALL
            .iter()
            .all(|lab| self.completed_labs.get(lab).is_some_and(|p| p.perfect))
    }

    /// Lab badges plus the grandmaster badge
    pub fn unlocked_count(&self) -> usize {
        self.perfect_count() + usize::from(self.is_grandmaster())
    }
}

/// Key-value persistence for serialized progress
pub trait ProgressStore {
    fn load(&self, key: &str) -> LabResult<Option<String>>;
    fn save(&mut self, key: &str, value: &str) -> LabResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self, key: &str) -> LabResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> LabResult<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Achievement tracker persisting through `S`
#[derive(Debug)]
pub struct ProgressTracker<S: ProgressStore> {
    store: S,
    progress: UserProgress,
}

impl<S: ProgressStore> ProgressTracker<S> {
    /// Restores saved progress, starting fresh when nothing is stored
    pub fn load(store: S) -> LabResult<Self> {
        let progress = match store.load(PROGRESS_KEY)? {
            Some(json) => serde_json::from_str(&json)?,
            None => UserProgress::default(),
        };
        debug!("loaded progress: {} perfect labs", progress.perfect_count());
        Ok(Self { store, progress })
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn save(&mut self) -> LabResult<()> {
        let json = serde_json::to_string(&self.progress)?;
        self.store.save(PROGRESS_KEY, &json)
    }
}

impl<S: ProgressStore> AchievementTracker for ProgressTracker<S> {
    fn record_quiz_result(&mut self, lab: LabKind, score: u32, total: u32) -> LabResult<Vec<AchievementEvent>> {
        if total == 0 || score > total {
            return Err(LabError::invalid_parameter(
                "score",
                format!("{score} out of {total} is not a quiz result"),
            ));
        }
        self.progress.total_quiz_attempts += 1;

        let mut events = Vec::new();
        let current = self.progress.completed_labs.entry(lab).or_default();
        current.score = current.score.max(score);
        if score == total && !current.perfect {
            current.perfect = true;
            info!("badge unlocked: {}", badge_for(lab).name);
            events.push(AchievementEvent::BadgeUnlocked {
                lab,
                badge: badge_for(lab),
            });
        }

        if self.progress.is_grandmaster() && !self.progress.achievements.iter().any(|a| a == GRANDMASTER) {
            self.progress.achievements.push(GRANDMASTER.to_owned());
            info!("grandmaster unlocked");
            events.push(AchievementEvent::Grandmaster {
                badge: GRANDMASTER_BADGE,
            });
        }

        self.save()?;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ProgressTracker<MemoryStore> {
        ProgressTracker::load(MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_best_score_is_kept() {
        let mut tracker = tracker();
        assert!(tracker.record_quiz_result(LabKind::Knn, 3, 5).unwrap().is_empty());
        tracker.record_quiz_result(LabKind::Knn, 1, 5).unwrap();
        let progress = tracker.progress().completed_labs[&LabKind::Knn];
        assert_eq!(progress.score, 3);
        assert!(!progress.perfect);
        assert_eq!(tracker.progress().total_quiz_attempts, 2);
    }

    #[test]
    fn test_badge_unlocks_once() {
        let mut tracker = tracker();
        let events = tracker.record_quiz_result(LabKind::KMeans, 5, 5).unwrap();
        assert_eq!(
            events,
            vec![AchievementEvent::BadgeUnlocked {
                lab: LabKind::KMeans,
                badge: badge_for(LabKind::KMeans),
            }]
        );
        assert!(tracker.record_quiz_result(LabKind::KMeans, 5, 5).unwrap().is_empty());
    }

    #[test]
    fn test_grandmaster_after_all_labs() {
        let mut tracker = tracker();
        let (last, rest) = LabKind::ALL.split_last().unwrap();
        for lab in rest {
            tracker.record_quiz_result(*lab, 4, 4).unwrap();
        }
        assert!(!tracker.progress().is_grandmaster());
        let events = tracker.record_quiz_result(*last, 4, 4).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], AchievementEvent::Grandmaster { .. }));
        assert_eq!(tracker.progress().unlocked_count(), 8);
    }

    #[test]
    fn test_progress_round_trips_through_store() {
        let mut tracker = tracker();
        tracker.record_quiz_result(LabKind::Svm, 2, 2).unwrap();
        let json = tracker.store().load(PROGRESS_KEY).unwrap().unwrap();
        assert!(json.contains("\"completedLabs\":{\"svm\""));

        let restored = ProgressTracker::load(tracker.store().clone()).unwrap();
        assert_eq!(restored.progress(), tracker.progress());
    }

    #[test]
    fn test_rejects_impossible_scores() {
        let mut tracker = tracker();
        assert!(tracker.record_quiz_result(LabKind::Svm, 3, 2).is_err());
        assert!(tracker.record_quiz_result(LabKind::Svm, 0, 0).is_err());
        assert_eq!(tracker.progress().total_quiz_attempts, 0);
    }
}
