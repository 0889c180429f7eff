//! Heuristic disease risk scoring of annotated variants.

use rand::{rngs::StdRng, Rng as _, SeedableRng as _};

use crate::annotate::{AnnotatedVariant, Pathogenicity, RiskTier};

/// Lower bound of the reported probability.
pub const MIN_PROBABILITY: f64 = 0.05;
/// Upper bound of the reported probability.
pub const MAX_PROBABILITY: f64 = 0.95;
/// Probability reported for an empty variant set.
pub const NEUTRAL_PROBABILITY: f64 = 0.5;
/// Mean quality below which the linear score is penalized.
pub const LOW_QUALITY: f64 = 20.0;
/// Largest accepted noise amplitude, the width of the probability scale.
pub const MAX_NOISE_AMPLITUDE: f64 = 1.0;

/// Summary features of all annotated variants of one analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeatureVector {
    /// Number of variants.
    pub total: usize,
    /// Number of variants with risk tier `High`.
    pub high: usize,
    /// Number of variants with risk tier `Medium`.
    pub medium: usize,
    /// Number of variants with risk tier `Low`.
    pub low: usize,
    /// Number of variants labeled `Pathogenic`.
    pub pathogenic: usize,
    /// Mean of the present quality values, absent if no variant has one.
    pub avg_quality: Option<f64>,
    /// Number of variants whose gene symbol contains `BRCA`.
    pub brca: usize,
    /// Number of variants whose gene symbol contains `APOE`.
    pub apoe: usize,
    /// Number of variants whose gene symbol contains `TP53`.
    pub tp53: usize,
}

impl FeatureVector {
    /// Aggregate the features of `variants`.
    pub fn from_variants(variants: &[AnnotatedVariant]) -> Self {
        let mut result = Self {
            total: variants.len(),
            ..Default::default()
        };
        let mut quality_sum = 0.0;
        let mut quality_count = 0usize;

        for variant in variants {
            let annotation = &variant.annotation;
            match annotation.disease_risk {
                RiskTier::High => result.high += 1,
                RiskTier::Medium => result.medium += 1,
                RiskTier::Low => result.low += 1,
            }
            if annotation.pathogenicity == Pathogenicity::Pathogenic {
                result.pathogenic += 1;
            }
            if let Some(quality) = variant.record.quality {
                quality_sum += quality;
                quality_count += 1;
            }
            result.brca += usize::from(annotation.gene.contains("BRCA"));
            result.apoe += usize::from(annotation.gene.contains("APOE"));
            result.tp53 += usize::from(annotation.gene.contains("TP53"));
        }

        if quality_count > 0 {
            result.avg_quality = Some(quality_sum / quality_count as f64);
        }
        result
    }

    /// The eight features in fixed order, an absent mean quality as `0.0`.
    ///
    /// The order is high, medium, low, pathogenic, mean quality, BRCA, APOE, TP53.
    pub fn as_array(&self) -> [f64; 8] {
        [
            self.high as f64,
            self.medium as f64,
            self.low as f64,
            self.pathogenic as f64,
            self.avg_quality.unwrap_or(0.0),
            self.brca as f64,
            self.apoe as f64,
            self.tp53 as f64,
        ]
    }
}

/// Risk classification derived from the probability.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
    utoipa::ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RiskClass {
    Low,
    Medium,
    High,
}

impl RiskClass {
    /// Classify a probability: `>= 0.7` is high, `>= 0.4` is medium, anything else low.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 0.7 {
            RiskClass::High
        } else if probability >= 0.4 {
            RiskClass::Medium
        } else {
            RiskClass::Low
        }
    }
}

/// The scoring formula to use.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
    utoipa::ToSchema,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ScoringModel {
    /// Weighted sum of tier, pathogenicity and gene counts with a low quality penalty.
    #[default]
    Linear,
    /// Weighted share of the risk tiers, rounded to two decimals.
    TierDistribution,
}

/// Perturbation added to the raw score before clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Noise {
    /// No perturbation.
    #[default]
    None,
    /// Uniform draw from `[-amplitude, amplitude]` with a fixed seed.
    Uniform { amplitude: f64, seed: u64 },
}

impl Noise {
    /// Build from the optional command line values.
    ///
    /// A missing or zero amplitude means no noise; a missing seed means seed `0`.
    ///
    /// # Errors
    ///
    /// If the absolute amplitude is not a finite value up to `MAX_NOISE_AMPLITUDE`.
    pub fn from_args(amplitude: Option<f64>, seed: Option<u64>) -> Result<Self, anyhow::Error> {
        match amplitude {
            Some(amplitude) if amplitude != 0.0 => Ok(Noise::Uniform {
                amplitude: check_amplitude(amplitude)?,
                seed: seed.unwrap_or_default(),
            }),
            _ => Ok(Noise::None),
        }
    }

    /// Draw the perturbation.
    ///
    /// Amplitudes above `MAX_NOISE_AMPLITUDE` are capped, so the sampling range never
    /// overflows.
    pub fn sample(&self) -> f64 {
        match *self {
            Noise::None => 0.0,
            Noise::Uniform { amplitude, seed } => {
                let amplitude = amplitude.abs();
                if amplitude == 0.0 || !amplitude.is_finite() {
                    return 0.0;
                }
                let amplitude = amplitude.min(MAX_NOISE_AMPLITUDE);
                StdRng::seed_from_u64(seed).gen_range(-amplitude..=amplitude)
            }
        }
    }
}

/// Absolute value of `amplitude` if it is finite and at most `MAX_NOISE_AMPLITUDE`.
fn check_amplitude(amplitude: f64) -> Result<f64, anyhow::Error> {
    let amplitude = amplitude.abs();
    if !amplitude.is_finite() || amplitude > MAX_NOISE_AMPLITUDE {
        anyhow::bail!(
            "noise amplitude must be within [-{max}, {max}], got {}",
            amplitude,
            max = MAX_NOISE_AMPLITUDE
        );
    }
    Ok(amplitude)
}

/// Parse a `--noise-amplitude` command line value.
pub fn parse_noise_amplitude(value: &str) -> Result<f64, String> {
    let amplitude: f64 = value
        .parse()
        .map_err(|e| format!("invalid noise amplitude {:?}: {}", value, e))?;
    check_amplitude(amplitude).map_err(|e| e.to_string())?;
    Ok(amplitude)
}

/// Result of scoring one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Prediction {
    /// Risk probability in `[0.05, 0.95]`, or exactly `0.5` for no variants.
    pub probability: f64,
    /// Classification of `probability`.
    pub classification: RiskClass,
}

impl Prediction {
    fn from_probability(probability: f64) -> Self {
        Self {
            probability,
            classification: RiskClass::from_probability(probability),
        }
    }
}

/// Raw score of the linear model, before noise and clamping.
fn linear_score(features: &FeatureVector) -> f64 {
    let score = (features.high as f64 * 4.0
        + features.medium as f64 * 2.0
        + features.pathogenic as f64 * 5.0
        + features.brca as f64 * 3.5
        + features.tp53 as f64 * 4.0)
        / 25.0;
    match features.avg_quality {
        Some(quality) if quality < LOW_QUALITY => score * 0.7,
        _ => score,
    }
}

/// Raw score of the tier distribution model, before noise and clamping.
fn tier_distribution_score(features: &FeatureVector) -> f64 {
    let weighted =
        features.high as f64 * 1.0 + features.medium as f64 * 0.5 + features.low as f64 * 0.1;
    weighted / features.total as f64 * 0.7
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl ScoringModel {
    /// Score a feature vector.
    ///
    /// Without variants the result is the neutral `0.5`/medium; otherwise the noise is added to
    /// the raw score and the sum is clamped to `[MIN_PROBABILITY, MAX_PROBABILITY]`.
    pub fn predict(&self, features: &FeatureVector, noise: &Noise) -> Prediction {
        if features.total == 0 {
            return Prediction::from_probability(NEUTRAL_PROBABILITY);
        }

        let raw = match self {
            ScoringModel::Linear => linear_score(features),
            ScoringModel::TierDistribution => tier_distribution_score(features),
        };
        let probability = (raw + noise.sample()).clamp(MIN_PROBABILITY, MAX_PROBABILITY);
        let probability = match self {
            ScoringModel::Linear => probability,
            ScoringModel::TierDistribution => round2(probability),
        };

        Prediction::from_probability(probability)
    }
}
