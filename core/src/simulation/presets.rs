//! Deterministic-in-structure data generators
//!
//! Each preset reproduces the shape of a textbook dataset (blobs, two
//! labelled clusters, a trend line, concentric rings). Individual draws come
//! from the caller's RNG so tests can seed them.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::f64::consts::PI;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::{ClassLabel, PointLabel};
use crate::error::LabError;
use crate::geometry::DataPoint;

/// A generated position with its label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub position: DataPoint,
    pub label: PointLabel,
}

impl Sample {
    pub const fn new(x: f64, y: f64, label: PointLabel) -> Self {
        Self {
            position: DataPoint::new(x, y),
            label,
        }
    }
}

/// Named dataset generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// 40 unlabeled points, uniform over `[1, 9]^2`
    RandomScatter,
    /// Three unlabeled Gaussian blobs of 15 points
    GaussianBlobs,
    /// Class A lower-left, class B upper-right, a few mixed in the middle
    ClassClusters,
    /// 30 uniformly scattered points with random classes
    ScatteredClasses,
    /// Two well separated classes of 8
    Separable,
    /// Two overlapping classes of 10
    Overlapping,
    /// Class A disc inside a class B ring
    Circular,
    PositiveTrend,
    NegativeTrend,
    RandomTrend,
    /// Fail/pass students by study and sleep hours
    StudyHours,
}

impl Preset {
    pub fn name(&self) -> &'static str {
        match self {
            Preset::RandomScatter => "random",
            Preset::GaussianBlobs => "clusters",
            Preset::ClassClusters => "class-clusters",
            Preset::ScatteredClasses => "scattered",
            Preset::Separable => "separable",
            Preset::Overlapping => "overlapping",
            Preset::Circular => "circular",
            Preset::PositiveTrend => "positive",
            Preset::NegativeTrend => "negative",
            Preset::RandomTrend => "random-trend",
            Preset::StudyHours => "study-hours",
        }
    }
}

impl FromStr for Preset {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let preset = match s.trim() {
            "random" => Preset::RandomScatter,
            "clusters" => Preset::GaussianBlobs,
            "class-clusters" => Preset::ClassClusters,
            "scattered" => Preset::ScatteredClasses,
            "separable" => Preset::Separable,
            "overlapping" => Preset::Overlapping,
            "circular" => Preset::Circular,
            "positive" => Preset::PositiveTrend,
            "negative" => Preset::NegativeTrend,
            "random-trend" => Preset::RandomTrend,
            "study-hours" | "generate" => Preset::StudyHours,
            other => {
                return Err(LabError::UnknownPreset {
                    lab: "any".into(),
                    preset: other.to_owned(),
                })
            }
        };
        Ok(preset)
    }
}

/// Stateless generator façade over an RNG
pub struct PresetGenerator;

const BLOB_CENTERS: [(f64, f64); 3] = [(2.5, 2.5), (7.5, 2.5), (5.0, 7.5)];
const BLOB_SIGMA: f64 = 0.75;

impl PresetGenerator {
    /// Produces the samples of `preset`
    pub fn generate<R: Rng + ?Sized>(preset: Preset, rng: &mut R) -> Vec<Sample> {
        match preset {
            Preset::RandomScatter => (0..40)
                .map(|_| uniform(rng, 1.0, 9.0, 1.0, 9.0, PointLabel::Unlabeled))
                .collect(),
            Preset::GaussianBlobs => Self::gaussian_blobs(rng),
            Preset::ClassClusters => {
                let mut samples = Vec::with_capacity(35);
                samples.extend((0..15).map(|_| uniform(rng, 1.0, 4.0, 1.0, 4.0, class(ClassLabel::A))));
                samples.extend((0..15).map(|_| uniform(rng, 6.0, 9.0, 6.0, 9.0, class(ClassLabel::B))));
                for _ in 0..5 {
                    let label = random_class(rng);
                    samples.push(uniform(rng, 3.0, 7.0, 3.0, 7.0, class(label)));
                }
                samples
            }
            Preset::ScatteredClasses => (0..30)
                .map(|_| {
                    let label = random_class(rng);
                    uniform(rng, 1.0, 9.0, 1.0, 9.0, class(label))
                })
                .collect(),
            Preset::Separable => {
                let mut samples = Vec::with_capacity(16);
                samples.extend((0..8).map(|_| uniform(rng, 1.0, 4.0, 1.0, 4.0, class(ClassLabel::A))));
                samples.extend((0..8).map(|_| uniform(rng, 6.0, 9.0, 6.0, 9.0, class(ClassLabel::B))));
                samples
            }
            Preset::Overlapping => {
                let mut samples = Vec::with_capacity(20);
                samples.extend((0..10).map(|_| uniform(rng, 1.0, 6.0, 1.0, 6.0, class(ClassLabel::A))));
                samples.extend((0..10).map(|_| uniform(rng, 4.0, 9.0, 4.0, 9.0, class(ClassLabel::B))));
                samples
            }
            Preset::Circular => {
                let mut samples = Vec::with_capacity(24);
                samples.extend((0..12).map(|_| ring(rng, 0.5, 2.0, class(ClassLabel::A))));
                samples.extend((0..12).map(|_| ring(rng, 3.0, 4.5, class(ClassLabel::B))));
                samples
            }
            Preset::PositiveTrend => (0..15)
                .map(|_| {
                    let x = rng.gen_range(1.0..9.0);
                    let y = x * 0.8 + rng.gen_range(-0.75..0.75) + 1.0;
                    Sample::new(x, y.clamp(0.5, 9.5), PointLabel::Unlabeled)
                })
                .collect(),
            Preset::NegativeTrend => (0..15)
                .map(|_| {
                    let x = rng.gen_range(1.0..9.0);
                    let y = -x * 0.3 + rng.gen_range(-1.0..1.0) + 7.0;
                    Sample::new(x, y.clamp(0.5, 9.5), PointLabel::Unlabeled)
                })
                .collect(),
            Preset::RandomTrend => (0..15)
                .map(|_| uniform(rng, 1.0, 9.0, 1.0, 9.0, PointLabel::Unlabeled))
                .collect(),
            Preset::StudyHours => {
                let mut samples = Vec::with_capacity(30);
                samples.extend((0..12).map(|_| uniform(rng, 1.0, 4.0, 1.0, 4.0, class(ClassLabel::A))));
                samples.extend((0..12).map(|_| uniform(rng, 6.0, 9.0, 6.0, 9.0, class(ClassLabel::B))));
                for _ in 0..6 {
                    let x = rng.gen_range(3.0..7.0);
                    let y = rng.gen_range(3.0..7.0);
                    let label = if x + y > 10.0 { ClassLabel::B } else { ClassLabel::A };
                    samples.push(Sample::new(x, y, class(label)));
                }
                samples
            }
        }
    }

    /// One-dimensional study-hours samples `(hours, passed)` for the sigmoid view
    pub fn study_hours_1d<R: Rng + ?Sized>(rng: &mut R) -> Vec<(f64, ClassLabel)> {
        let mut samples = Vec::with_capacity(25);
        samples.extend((0..10).map(|_| (rng.gen_range(1.0..5.0), ClassLabel::A)));
        samples.extend((0..10).map(|_| (rng.gen_range(6.0..10.0), ClassLabel::B)));
        for _ in 0..5 {
            let hours = rng.gen_range(4.0..7.0);
            samples.push((hours, random_class(rng)));
        }
        samples
    }

    fn gaussian_blobs<R: Rng + ?Sized>(rng: &mut R) -> Vec<Sample> {
        let mut samples = Vec::with_capacity(45);
        // A positive finite sigma never fails; fall back to uniform jitter regardless
        let normal = Normal::new(0.0, BLOB_SIGMA).ok();
        for &(cx, cy) in &BLOB_CENTERS {
            for _ in 0..15 {
                let (dx, dy) = match &normal {
                    Some(n) => (n.sample(rng), n.sample(rng)),
                    None => (rng.gen_range(-1.5..1.5), rng.gen_range(-1.5..1.5)),
                };
                // Keep blobs tight enough to stay recognisable
                let dx = dx.clamp(-2.0, 2.0);
                let dy = dy.clamp(-2.0, 2.0);
                samples.push(Sample::new(cx + dx, cy + dy, PointLabel::Unlabeled));
            }
        }
        samples
    }
}

fn class(label: ClassLabel) -> PointLabel {
    PointLabel::Class(label)
}

fn random_class<R: Rng + ?Sized>(rng: &mut R) -> ClassLabel {
    if rng.gen_bool(0.5) {
        ClassLabel::B
    } else {
        ClassLabel::A
    }
}

fn uniform<R: Rng + ?Sized>(
    rng: &mut R,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    label: PointLabel,
) -> Sample {
    Sample::new(rng.gen_range(min_x..max_x), rng.gen_range(min_y..max_y), label)
}

fn ring<R: Rng + ?Sized>(rng: &mut R, inner: f64, outer: f64, label: PointLabel) -> Sample {
    let angle = rng.gen_range(0.0..2.0 * PI);
    let r = rng.gen_range(inner..outer);
    Sample::new(5.0 + angle.cos() * r, 5.0 + angle.sin() * r, label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_preset_sizes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(PresetGenerator::generate(Preset::RandomScatter, &mut rng).len(), 40);
        assert_eq!(PresetGenerator::generate(Preset::GaussianBlobs, &mut rng).len(), 45);
        assert_eq!(PresetGenerator::generate(Preset::ClassClusters, &mut rng).len(), 35);
        assert_eq!(PresetGenerator::generate(Preset::Separable, &mut rng).len(), 16);
        assert_eq!(PresetGenerator::generate(Preset::Circular, &mut rng).len(), 24);
        assert_eq!(PresetGenerator::generate(Preset::StudyHours, &mut rng).len(), 30);
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = PresetGenerator::generate(Preset::GaussianBlobs, &mut ChaCha8Rng::seed_from_u64(9));
        let b = PresetGenerator::generate(Preset::GaussianBlobs, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_separable_classes_are_split() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for sample in PresetGenerator::generate(Preset::Separable, &mut rng) {
            match sample.label {
                PointLabel::Class(ClassLabel::A) => assert!(sample.position.x < 4.0),
                PointLabel::Class(ClassLabel::B) => assert!(sample.position.x >= 6.0),
                other => panic!("unexpected label {other:?}"),
            }
        }
    }

    #[test]
    fn test_trend_points_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for sample in PresetGenerator::generate(Preset::PositiveTrend, &mut rng) {
            assert!((0.5..=9.5).contains(&sample.position.y));
        }
    }

    #[test]
    fn test_preset_names_round_trip() {
        for preset in [Preset::RandomScatter, Preset::GaussianBlobs, Preset::Circular, Preset::NegativeTrend] {
            assert_eq!(preset.name().parse::<Preset>().unwrap(), preset);
        }
        assert!("spiral".parse::<Preset>().is_err());
    }
}
