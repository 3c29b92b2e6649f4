//! Pedagogical support vector machine
//!
//! Not a quadratic-program solver. The linear kernel places the boundary
//! through the midpoint of the two class centroids, perpendicular to the
//! line joining them; "support vectors" are the points visually closest to
//! that boundary. The RBF kernel marks points near the opposite class and
//! classifies by a kernel-weighted vote over them. `c` is a base-10
//! exponent: the effective regularisation is `10^c`.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::trace;
use serde::{Deserialize, Serialize};

use super::traits::ContinuousModel;
use crate::geometry::DataPoint;
use crate::simulation::{ClassLabel, PointId, PointSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Linear,
    Rbf,
}

impl Kernel {
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Linear => "linear",
            Kernel::Rbf => "rbf",
        }
    }
}

/// `w1 * x + w2 * y + b = 0` with unit normal `(w1, w2)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperplane {
    pub w1: f64,
    pub w2: f64,
    pub b: f64,
}

impl Hyperplane {
    /// Signed distance; positive on the class B side
    pub fn signed_distance(&self, p: &DataPoint) -> f64 {
        let norm = self.w1.hypot(self.w2);
        if norm == 0.0 {
            return 0.0;
        }
        (self.w1 * p.x + self.w2 * p.y + self.b) / norm
    }

    pub fn classify(&self, p: &DataPoint) -> ClassLabel {
        if self.signed_distance(p) >= 0.0 {
            ClassLabel::B
        } else {
            ClassLabel::A
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportVector {
    pub id: PointId,
    pub position: DataPoint,
    pub class: ClassLabel,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmFit {
    pub kernel: Kernel,
    pub hyperplane: Option<Hyperplane>,
    pub support_vectors: Vec<SupportVector>,
    pub margin: f64,
    pub gamma: f64,
    /// Class centroids coincided and the fallback direction was used
    pub degenerate: bool,
}

impl SvmFit {
    fn empty(kernel: Kernel, gamma: f64) -> Self {
        Self {
            kernel,
            hyperplane: None,
            support_vectors: Vec::new(),
            margin: 0.0,
            gamma,
            degenerate: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.support_vectors.is_empty()
    }

    pub fn is_support_vector(&self, id: PointId) -> bool {
        self.support_vectors.iter().any(|sv| sv.id == id)
    }

    /// Predicted class at `p`, `None` for an empty fit
    pub fn predict(&self, p: &DataPoint) -> Option<ClassLabel> {
        match self.kernel {
            Kernel::Linear => self.hyperplane.map(|h| h.classify(p)),
            Kernel::Rbf => {
                if self.support_vectors.is_empty() {
                    return None;
                }
                let sum: f64 = self
                    .support_vectors
                    .iter()
                    .map(|sv| sv.alpha * sv.class.sign() * rbf(p, &sv.position, self.gamma))
                    .sum();
                Some(if sum >= 0.0 { ClassLabel::B } else { ClassLabel::A })
            }
        }
    }
}

/// Gaussian kernel `exp(-gamma * |a - b|^2)`
pub fn rbf(a: &DataPoint, b: &DataPoint, gamma: f64) -> f64 {
    (-gamma * a.distance_squared(b)).exp()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvmModel {
    pub kernel: Kernel,
    /// Base-10 exponent of the regularisation strength
    pub c: f64,
    pub gamma: f64,
}

impl Default for SvmModel {
    fn default() -> Self {
        Self {
            kernel: Kernel::Linear,
            c: 1.0,
            gamma: 0.5,
        }
    }
}

struct Labelled {
    id: PointId,
    position: DataPoint,
    class: ClassLabel,
}

impl SvmModel {
    fn fit_linear(&self, labelled: &[Labelled]) -> SvmFit {
        let centroid_of = |class: ClassLabel| {
            DataPoint::mean(labelled.iter().filter(|p| p.class == class).map(|p| &p.position))
        };
        let (Some(centroid_a), Some(centroid_b)) = (centroid_of(ClassLabel::A), centroid_of(ClassLabel::B)) else {
            return SvmFit::empty(self.kernel, self.gamma);
        };

        let (mut dx, mut dy) = (centroid_b.x - centroid_a.x, centroid_b.y - centroid_a.y);
        let length = dx.hypot(dy);
        let degenerate = length == 0.0;
        if degenerate {
            trace!("class centroids coincide; using horizontal normal");
            dx = 1.0;
            dy = 0.0;
        } else {
            dx /= length;
            dy /= length;
        }
        let midpoint = centroid_a.lerp(&centroid_b, 0.5);
        let hyperplane = Hyperplane {
            w1: dx,
            w2: dy,
            b: -(dx * midpoint.x + dy * midpoint.y),
        };

        let c_scale = 10f64.powf(self.c);
        let closest = |class: ClassLabel| {
            labelled
                .iter()
                .enumerate()
                .filter(|(_, p)| p.class == class)
                .map(|(i, p)| (i, hyperplane.signed_distance(&p.position).abs()))
                .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                    Some((_, bd)) if bd <= d => best,
                    _ => Some((i, d)),
                })
        };
        let (Some((closest_a, min_a)), Some((closest_b, min_b))) = (closest(ClassLabel::A), closest(ClassLabel::B)) else {
            return SvmFit::empty(self.kernel, self.gamma);
        };

        let support = |p: &Labelled, alpha: f64| SupportVector {
            id: p.id,
            position: p.position,
            class: p.class,
            alpha,
        };
        let mut support_vectors = vec![support(&labelled[closest_a], 1.0), support(&labelled[closest_b], 1.0)];
        let threshold = min_a.max(min_b) * (1.5 / c_scale + 1.0);
        support_vectors.extend(
            labelled
                .iter()
                .enumerate()
                .filter(|(i, p)| {
                    *i != closest_a && *i != closest_b && hyperplane.signed_distance(&p.position).abs() < threshold
                })
                .map(|(_, p)| support(p, 0.5)),
        );

        SvmFit {
            kernel: Kernel::Linear,
            hyperplane: Some(hyperplane),
            support_vectors,
            margin: min_a.min(min_b) * 2.0 * (1.0 + 1.0 / c_scale),
            gamma: self.gamma,
            degenerate,
        }
    }

    fn fit_rbf(&self, labelled: &[Labelled]) -> SvmFit {
        let nearest_other = |p: &Labelled| {
            labelled
                .iter()
                .filter(|o| o.class != p.class)
                .map(|o| o.position.distance(&p.position))
                .fold(f64::INFINITY, f64::min)
        };
        let threshold = 3.0 / 10f64.powf(self.c * 0.5);

        let mut margin_sum = 0.0;
        let mut support_vectors = Vec::new();
        for p in labelled {
            let d = nearest_other(p);
            if d < threshold {
                margin_sum += d;
                support_vectors.push(SupportVector {
                    id: p.id,
                    position: p.position,
                    class: p.class,
                    alpha: 1.0 / (1.0 + d),
                });
            }
        }

        let margin = if support_vectors.is_empty() {
            // Nothing near the other class: fall back to the closest opposite pair
            let mut best: Option<(&Labelled, &Labelled, f64)> = None;
            for a in labelled.iter().filter(|p| p.class == ClassLabel::A) {
                for b in labelled.iter().filter(|p| p.class == ClassLabel::B) {
                    let d = a.position.distance(&b.position);
                    if best.map_or(true, |(_, _, bd)| d < bd) {
                        best = Some((a, b, d));
                    }
                }
            }
            let Some((a, b, d)) = best else {
                return SvmFit::empty(self.kernel, self.gamma);
            };
            for p in [a, b] {
                support_vectors.push(SupportVector {
                    id: p.id,
                    position: p.position,
                    class: p.class,
                    alpha: 1.0,
                });
            }
            d
        } else {
            margin_sum / support_vectors.len() as f64
        };

        SvmFit {
            kernel: Kernel::Rbf,
            hyperplane: None,
            support_vectors,
            margin,
            gamma: self.gamma,
            degenerate: false,
        }
    }
}

impl ContinuousModel for SvmModel {
    type Input = PointSet;
    type Output = SvmFit;

    fn recompute(&self, points: &PointSet) -> SvmFit {
        let labelled: Vec<Labelled> = points
            .iter()
            .filter_map(|p| {
                p.label.class().map(|class| Labelled {
                    id: p.id,
                    position: p.position,
                    class,
                })
            })
            .collect();
        let has_both = labelled.iter().any(|p| p.class == ClassLabel::A)
            && labelled.iter().any(|p| p.class == ClassLabel::B);
        if labelled.len() < 2 || !has_both {
            return SvmFit::empty(self.kernel, self.gamma);
        }
        match self.kernel {
            Kernel::Linear => self.fit_linear(&labelled),
            Kernel::Rbf => self.fit_rbf(&labelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::DomainBounds;
    use crate::simulation::{PointLabel, Preset, PresetGenerator, Sample};
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn labelled(samples: &[(f64, f64, ClassLabel)]) -> PointSet {
        let mut points = PointSet::new(DomainBounds::default(), 0.3);
        points.replace_with(
            samples
                .iter()
                .map(|&(x, y, c)| Sample::new(x, y, PointLabel::Class(c))),
        );
        points
    }

    #[test]
    fn test_linear_boundary_through_midpoint() {
        let points = labelled(&[(2.0, 5.0, ClassLabel::A), (8.0, 5.0, ClassLabel::B)]);
        let model = SvmModel { c: 0.0, ..SvmModel::default() };
        let fit = model.recompute(&points);
        let plane = fit.hyperplane.unwrap();
        assert_relative_eq!(plane.signed_distance(&DataPoint::new(5.0, 1.0)), 0.0);
        assert_eq!(fit.predict(&DataPoint::new(1.0, 1.0)), Some(ClassLabel::A));
        assert_eq!(fit.predict(&DataPoint::new(9.0, 9.0)), Some(ClassLabel::B));
        // min distance 3, doubled, scaled by 1 + 1/10^0
        assert_relative_eq!(fit.margin, 12.0);
        assert_eq!(fit.support_vectors.len(), 2);
    }

    #[test]
    fn test_coincident_centroids_use_fallback_direction() {
        let points = labelled(&[
            (4.0, 4.0, ClassLabel::A),
            (6.0, 6.0, ClassLabel::A),
            (4.0, 6.0, ClassLabel::B),
            (6.0, 4.0, ClassLabel::B),
        ]);
        let fit = SvmModel::default().recompute(&points);
        assert!(fit.degenerate);
        let plane = fit.hyperplane.unwrap();
        assert_eq!((plane.w1, plane.w2), (1.0, 0.0));
        assert!(fit.margin.is_finite());
    }

    #[test]
    fn test_missing_class_gives_empty_fit() {
        let points = labelled(&[(2.0, 2.0, ClassLabel::A), (3.0, 3.0, ClassLabel::A)]);
        let fit = SvmModel::default().recompute(&points);
        assert!(fit.is_empty());
        assert_eq!(fit.predict(&DataPoint::new(5.0, 5.0)), None);
        assert!(SvmModel::default().recompute(&labelled(&[(2.0, 2.0, ClassLabel::B)])).is_empty());
    }

    #[test]
    fn test_rbf_falls_back_to_closest_pair() {
        let points = labelled(&[
            (1.0, 1.0, ClassLabel::A),
            (1.5, 1.0, ClassLabel::A),
            (9.0, 9.0, ClassLabel::B),
        ]);
        let model = SvmModel { kernel: Kernel::Rbf, c: 2.0, gamma: 0.5 };
        let fit = model.recompute(&points);
        assert_eq!(fit.support_vectors.len(), 2);
        assert_relative_eq!(fit.margin, DataPoint::new(1.5, 1.0).distance(&DataPoint::new(9.0, 9.0)));
        assert_eq!(fit.predict(&DataPoint::new(1.2, 1.0)), Some(ClassLabel::A));
        assert_eq!(fit.predict(&DataPoint::new(8.0, 8.0)), Some(ClassLabel::B));
    }

    #[test]
    fn test_rbf_separates_circular_data() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut points = PointSet::new(DomainBounds::default(), 0.3);
        points.replace_with(PresetGenerator::generate(Preset::Circular, &mut rng));
        let model = SvmModel { kernel: Kernel::Rbf, c: 0.0, gamma: 0.5 };
        let fit = model.recompute(&points);
        assert!(!fit.is_empty());
        assert_eq!(fit.predict(&DataPoint::new(5.0, 5.0)), Some(ClassLabel::A));
        assert_eq!(fit, model.recompute(&points));
    }
}
