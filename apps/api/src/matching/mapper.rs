#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assessment::grading::mean;
use crate::assessment::InstrumentResult;
use crate::matching::rules::{CompetencyMappingRule, MappingTable};

/// Score given to a competency when the candidate has no completed instruments.
pub const NEUTRAL_FALLBACK_SCORE: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Weighted combination of mapped instrument dimensions.
    Mapped,
    /// Mean instrument score, used when no mapping factor resolved.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyScore {
    pub competency: String,
    pub score: f64,
    pub source: ScoreSource,
}

/// Competency score in [0, 100] for one candidate.
pub fn compute_competency_score(
    table: &MappingTable,
    competency: &str,
    results: &[InstrumentResult],
) -> f64 {
    score_competency(table, competency, results).score
}

pub fn score_competency(
    table: &MappingTable,
    competency: &str,
    results: &[InstrumentResult],
) -> CompetencyScore {
    let mapped = table
        .rule(competency)
        .and_then(|rule| weighted_score(rule, results));

    let (score, source) = match mapped {
        Some(score) => (score, ScoreSource::Mapped),
        None => {
            let score = fallback_score(results);
            debug!(competency, score, "No mapping factor resolved, using mean instrument score");
            (score, ScoreSource::Fallback)
        }
    };

    CompetencyScore {
        competency: competency.to_string(),
        score,
        source,
    }
}

/// `Σ(score × weight) / Σ(weight)` over the factors the candidate's results
/// resolve. `None` when no factor resolves.
fn weighted_score(rule: &CompetencyMappingRule, results: &[InstrumentResult]) -> Option<f64> {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for factor in &rule.factors {
        let Some(result) = results
            .iter()
            .find(|r| r.instrument_type == factor.instrument)
        else {
            continue;
        };
        let Some(value) = result.dimension_value(&factor.dimension) else {
            continue;
        };
        let value = if factor.reversed { 100.0 - value } else { value };
        weighted_sum += value * factor.weight;
        total_weight += factor.weight;
    }

    (total_weight > 0.0).then(|| weighted_sum / total_weight)
}

/// Unweighted mean of every result's headline score, or 60.0 with no results.
pub fn fallback_score(results: &[InstrumentResult]) -> f64 {
    let totals: Vec<f64> = results.iter().map(|r| r.total_score).collect();
    mean(&totals).unwrap_or(NEUTRAL_FALLBACK_SCORE)
}
