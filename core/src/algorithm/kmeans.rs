//! Stepped k-means clustering
//!
//! The engine exposes Lloyd's algorithm as user-triggerable transitions:
//!
//! ```text
//! Uninitialized --initialize--> Seeded --assign--> Assigned --update--> Updated
//!                                  ^                   ^                   |
//!                                  |                   +------assign-------+
//!                       centroid drag                  update (moved < eps) --> Converged
//! ```
//!
//! Cluster membership is written straight into the point labels so views
//! and statistics read one source of truth.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, info};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::traits::{StepOutcome, SteppedAlgorithm};
use crate::error::{LabError, LabResult};
use crate::execution::HistoryBuffer;
use crate::geometry::DataPoint;
use crate::simulation::{PointLabel, PointSet};

/// Phase of the clustering state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KMeansPhase {
    /// No centroids exist
    Uninitialized,
    /// Centroids exist but no point carries a current assignment
    Seeded,
    Assigned,
    Updated,
    /// Terminal until re-seeded or a centroid is dragged
    Converged,
}

impl KMeansPhase {
    pub fn label(&self) -> &'static str {
        match self {
            KMeansPhase::Uninitialized => "uninitialized",
            KMeansPhase::Seeded => "seeded",
            KMeansPhase::Assigned => "assigned",
            KMeansPhase::Updated => "updated",
            KMeansPhase::Converged => "converged",
        }
    }
}

/// Outcome of a centroid update
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    /// Centroid positions before the update
    pub previous: Vec<DataPoint>,
    /// Total Euclidean displacement across all centroids
    pub displacement: f64,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct KMeansEngine {
    k: usize,
    centroids: Vec<DataPoint>,
    phase: KMeansPhase,
    history: HistoryBuffer<Vec<DataPoint>>,
    iteration: usize,
    epsilon: f64,
    last_displacement: Option<f64>,
}

impl KMeansEngine {
    pub fn new(k: usize, epsilon: f64, history_capacity: usize) -> Self {
        Self {
            k: k.max(1),
            centroids: Vec::new(),
            phase: KMeansPhase::Uninitialized,
            history: HistoryBuffer::new(history_capacity),
            iteration: 0,
            epsilon,
            last_displacement: None,
        }
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn centroids(&self) -> &[DataPoint] {
        &self.centroids
    }

    #[inline]
    pub fn history(&self) -> &HistoryBuffer<Vec<DataPoint>> {
        &self.history
    }

    #[inline]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn is_converged(&self) -> bool {
        self.phase == KMeansPhase::Converged
    }

    pub fn last_displacement(&self) -> Option<f64> {
        self.last_displacement
    }

    /// Changes the cluster count; existing centroids no longer match and are dropped
    pub fn set_k(&mut self, k: usize, points: &mut PointSet) {
        let k = k.max(1);
        if k != self.k {
            self.k = k;
            self.reset(points);
        }
    }

    /// Removes all centroids and assignments
    pub fn reset(&mut self, points: &mut PointSet) {
        self.centroids.clear();
        self.clear_progress(points);
        self.phase = KMeansPhase::Uninitialized;
    }

    fn clear_progress(&mut self, points: &mut PointSet) {
        self.history.clear();
        self.iteration = 0;
        self.last_displacement = None;
        points.reset_cluster_labels();
    }

    /// Seeds `k` centroids with k-means++ weighting
    ///
    /// The first centroid is a uniformly chosen point; each further one is
    /// drawn with probability proportional to the squared distance to the
    /// nearest centroid chosen so far. Fails without touching any state
    /// when there are fewer points than clusters.
    pub fn initialize_centroids<R: Rng + ?Sized>(&mut self, points: &mut PointSet, rng: &mut R) -> LabResult<()> {
        if points.len() < self.k {
            return Err(LabError::PreconditionFailed(format!(
                "Need at least {k} points to create {k} clusters!",
                k = self.k
            )));
        }

        let positions = points.positions();
        let mut centroids = Vec::with_capacity(self.k);
        centroids.push(positions[rng.gen_range(0..positions.len())]);

        while centroids.len() < self.k {
            let weights: Vec<f64> = positions
                .iter()
                .map(|p| {
                    centroids
                        .iter()
                        .map(|c| p.distance_squared(c))
                        .fold(f64::INFINITY, f64::min)
                })
                .collect();
            // All-zero weights mean every point already coincides with a centroid
            let index = match WeightedIndex::new(&weights) {
                Ok(dist) => dist.sample(rng),
                Err(_) => rng.gen_range(0..positions.len()),
            };
            centroids.push(positions[index]);
        }

        self.centroids = centroids;
        self.clear_progress(points);
        self.phase = KMeansPhase::Seeded;
        info!("initialised {} centroids over {} points", self.k, points.len());
        Ok(())
    }

    /// Assigns every point to its nearest centroid
    ///
    /// Ties go to the lowest centroid index. Returns `false` without acting
    /// when there are no centroids or the run has converged.
    pub fn step_assign(&mut self, points: &mut PointSet) -> bool {
        if self.centroids.is_empty() || self.is_converged() {
            return false;
        }
        for index in 0..points.len() {
            let position = points.as_slice()[index].position;
            let nearest = nearest_centroid(&self.centroids, &position);
            points.set_label_at(index, PointLabel::Cluster(nearest));
        }
        self.phase = KMeansPhase::Assigned;
        debug!("assignment step over {} points", points.len());
        true
    }

    /// Moves every centroid to the mean of its members
    ///
    /// Assigns first when the current assignment is missing or stale.
    /// Centroids without members keep their position.
    pub fn step_update(&mut self, points: &mut PointSet) -> Option<UpdateReport> {
        if self.phase != KMeansPhase::Assigned && !self.step_assign(points) {
            return None;
        }

        let previous = self.centroids.clone();
        self.history.push(previous.clone());

        let mut displacement = 0.0;
        for (index, centroid) in self.centroids.iter_mut().enumerate() {
            let members = points
                .iter()
                .filter(|p| p.label.cluster() == Some(index))
                .map(|p| &p.position);
            if let Some(mean) = DataPoint::mean(members) {
                displacement += centroid.distance(&mean);
                *centroid = mean;
            }
        }

        self.iteration += 1;
        self.last_displacement = Some(displacement);
        let converged = displacement < self.epsilon;
        self.phase = if converged {
            info!("k-means converged after {} iterations", self.iteration);
            KMeansPhase::Converged
        } else {
            KMeansPhase::Updated
        };

        Some(UpdateReport {
            previous,
            displacement,
            converged,
        })
    }

    /// Places a centroid by hand, invalidating all cached assignments
    pub fn move_centroid(&mut self, index: usize, position: DataPoint, points: &mut PointSet) -> LabResult<()> {
        let centroid = self
            .centroids
            .get_mut(index)
            .ok_or_else(|| LabError::UnknownEntity(format!("centroid {index}")))?;
        *centroid = position;
        self.clear_progress(points);
        self.phase = KMeansPhase::Seeded;
        Ok(())
    }

    /// Within-cluster sum of squared distances over assigned points
    pub fn wcss(&self, points: &PointSet) -> f64 {
        if self.centroids.is_empty() {
            return 0.0;
        }
        points
            .iter()
            .filter_map(|p| {
                let cluster = p.label.cluster()?;
                self.centroids.get(cluster).map(|c| p.position.distance_squared(c))
            })
            .sum()
    }

    /// Number of points currently without a cluster
    pub fn unassigned_count(&self, points: &PointSet) -> usize {
        points.iter().filter(|p| p.label.cluster().is_none()).count()
    }
}

/// Index of the nearest centroid, lowest index on ties
pub fn nearest_centroid(centroids: &[DataPoint], position: &DataPoint) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, centroid) in centroids.iter().enumerate() {
        let d = position.distance_squared(centroid);
        if d < best_distance {
            best_distance = d;
            best = index;
        }
    }
    best
}

impl SteppedAlgorithm for KMeansEngine {
    type Input = PointSet;
    type Phase = KMeansPhase;

    fn phase(&self) -> KMeansPhase {
        self.phase
    }

    fn step(&mut self, points: &mut PointSet) -> LabResult<StepOutcome> {
        let outcome = match self.phase {
            KMeansPhase::Uninitialized | KMeansPhase::Converged => StepOutcome::Idle,
            KMeansPhase::Seeded | KMeansPhase::Updated => {
                if self.step_assign(points) {
                    StepOutcome::Advanced
                } else {
                    StepOutcome::Idle
                }
            }
            KMeansPhase::Assigned => match self.step_update(points) {
                Some(report) if report.converged => StepOutcome::Finished,
                Some(_) => StepOutcome::Advanced,
                None => StepOutcome::Idle,
            },
        };
        Ok(outcome)
    }

    fn is_terminal(&self) -> bool {
        self.is_converged()
    }
}
