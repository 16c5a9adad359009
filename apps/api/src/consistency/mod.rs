//! Cross-instrument consistency.
//!
//! Maps each instrument's dimensions onto a few universal traits and measures
//! how closely the instruments a subject took agree on them. Fewer than two
//! results is not an error: the report comes back empty with `Low` confidence.

pub mod handlers;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assessment::grading::{mean, round1};
use crate::assessment::{InstrumentResult, InstrumentType};

/// Traits below this consistency are reported as contradictions.
pub const CONTRADICTION_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// ≥80 High, ≥60 Medium, else Low.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::High
        } else if score >= 60.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn downgrade(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitScore {
    pub source: InstrumentType,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitCheck {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub scores: Vec<TraitScore>,
    pub mean: f64,
    pub std_dev: f64,
    pub consistency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub scores: Vec<f64>,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationReport {
    pub consistency_score: f64,
    pub confidence_level: ConfidenceLevel,
    pub assessment_count: usize,
    pub per_trait_checks: Vec<TraitCheck>,
    pub contradictions: Vec<Contradiction>,
}

impl CrossValidationReport {
    fn insufficient(assessment_count: usize) -> Self {
        Self {
            consistency_score: 0.0,
            confidence_level: ConfidenceLevel::Low,
            assessment_count,
            per_trait_checks: Vec::new(),
            contradictions: Vec::new(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait table
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitMapping {
    pub name: String,
    /// Dimension code per instrument. MBTI codes are directional.
    pub dimensions: Vec<(InstrumentType, String)>,
}

const BUILTIN_TRAITS: &[(&str, &[(InstrumentType, &str)])] = &[
    (
        "extraversion",
        &[
            (InstrumentType::Mbti, "E-I"),
            (InstrumentType::Epq, "E"),
            (InstrumentType::Disc, "I"),
        ],
    ),
    (
        "emotional stability",
        &[
            (InstrumentType::Mbti, "T-F"),
            (InstrumentType::Epq, "N"),
            (InstrumentType::Disc, "S"),
        ],
    ),
    (
        "conscientiousness",
        &[
            (InstrumentType::Mbti, "J-P"),
            (InstrumentType::Epq, "P"),
            (InstrumentType::Disc, "C"),
        ],
    ),
    (
        "dominance",
        &[(InstrumentType::Mbti, "E-I"), (InstrumentType::Disc, "D")],
    ),
];

/// Holds the immutable trait → instrument → dimension table.
#[derive(Debug, Clone)]
pub struct CrossValidator {
    traits: Vec<TraitMapping>,
}

impl Default for CrossValidator {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CrossValidator {
    pub fn new(traits: Vec<TraitMapping>) -> Self {
        Self { traits }
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_TRAITS
                .iter()
                .map(|(name, dims)| TraitMapping {
                    name: name.to_string(),
                    dimensions: dims
                        .iter()
                        .map(|(instrument, code)| (*instrument, code.to_string()))
                        .collect(),
                })
                .collect(),
        )
    }

    pub fn traits(&self) -> &[TraitMapping] {
        &self.traits
    }

    pub fn validate(&self, results: &[InstrumentResult]) -> CrossValidationReport {
        if results.len() < 2 {
            return CrossValidationReport::insufficient(results.len());
        }

        let per_trait_checks: Vec<TraitCheck> = self
            .traits
            .iter()
            .filter_map(|mapping| check_trait(mapping, results))
            .collect();

        let contradictions: Vec<Contradiction> = per_trait_checks
            .iter()
            .filter(|check| check.consistency < CONTRADICTION_THRESHOLD)
            .map(contradiction)
            .collect();

        let consistencies: Vec<f64> = per_trait_checks.iter().map(|c| c.consistency).collect();
        let consistency_score = round1(mean(&consistencies).unwrap_or(0.0)).clamp(0.0, 100.0);

        let mut confidence_level = ConfidenceLevel::from_score(consistency_score);
        if contradictions.len() >= 2 {
            confidence_level = confidence_level.downgrade();
        }

        debug!(
            assessments = results.len(),
            traits = per_trait_checks.len(),
            contradictions = contradictions.len(),
            consistency_score,
            "Cross-validation complete"
        );

        CrossValidationReport {
            consistency_score,
            confidence_level,
            assessment_count: results.len(),
            per_trait_checks,
            contradictions,
        }
    }
}

fn check_trait(mapping: &TraitMapping, results: &[InstrumentResult]) -> Option<TraitCheck> {
    let scores: Vec<TraitScore> = results
        .iter()
        .filter_map(|result| {
            let (_, code) = mapping
                .dimensions
                .iter()
                .find(|(instrument, _)| *instrument == result.instrument_type)?;
            let value = result.dimension_value(code)?;
            Some(TraitScore {
                source: result.instrument_type,
                value: round1(value),
            })
        })
        .collect();

    if scores.len() < 2 {
        return None;
    }

    let values: Vec<f64> = scores.iter().map(|s| s.value).collect();
    let average = mean(&values).unwrap_or(0.0);
    let std_dev = sample_std_dev(&values);
    let consistency = (100.0 - 2.0 * std_dev).clamp(0.0, 100.0);

    Some(TraitCheck {
        trait_name: mapping.name.clone(),
        scores,
        mean: round1(average),
        std_dev: round1(std_dev),
        consistency: round1(consistency),
    })
}

fn contradiction(check: &TraitCheck) -> Contradiction {
    let compared = check
        .scores
        .iter()
        .map(|s| format!("{} {:.1}", s.source, s.value))
        .collect::<Vec<_>>()
        .join(" vs ");
    Contradiction {
        trait_name: check.trait_name.clone(),
        scores: check.scores.iter().map(|s| s.value).collect(),
        explanation: format!(
            "instruments disagree on {} ({}), std dev {:.1}",
            check.trait_name, compared, check.std_dev
        ),
    }
}

/// N−1 divisor; 0 for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}
