//! Job competency profiles and the aggregate job-fit score.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::assessment::InstrumentResult;
use crate::matching::mapper::{score_competency, ScoreSource};
use crate::matching::rules::MappingTable;

/// Competency weights in a profile must sum to 100 within this tolerance.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobProfileError {
    #[error("job profile '{0}' lists no competencies")]
    Empty(String),

    #[error("competency '{competency}' in job profile '{job}' has negative weight {weight}")]
    NegativeWeight {
        job: String,
        competency: String,
        weight: f64,
    },

    #[error("competency weights in job profile '{job}' sum to {sum}, expected 100")]
    WeightSum { job: String, sum: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyWeight {
    pub name: String,
    /// 0 – 100.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCompetencyProfile {
    pub job_name: String,
    pub competencies: Vec<CompetencyWeight>,
}

impl JobCompetencyProfile {
    /// Profile with the weight split evenly across `names`.
    pub fn evenly_weighted(job_name: impl Into<String>, names: &[&str]) -> Self {
        let weight = if names.is_empty() {
            0.0
        } else {
            100.0 / names.len() as f64
        };
        Self {
            job_name: job_name.into(),
            competencies: names
                .iter()
                .map(|name| CompetencyWeight {
                    name: name.to_string(),
                    weight,
                })
                .collect(),
        }
    }

    pub fn weight_sum(&self) -> f64 {
        self.competencies.iter().map(|c| c.weight).sum()
    }

    pub fn validate(&self) -> Result<(), JobProfileError> {
        if self.competencies.is_empty() {
            return Err(JobProfileError::Empty(self.job_name.clone()));
        }
        if let Some(c) = self.competencies.iter().find(|c| c.weight < 0.0) {
            return Err(JobProfileError::NegativeWeight {
                job: self.job_name.clone(),
                competency: c.name.clone(),
                weight: c.weight,
            });
        }
        let sum = self.weight_sum();
        if (sum - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(JobProfileError::WeightSum {
                job: self.job_name.clone(),
                sum,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCompetencyScore {
    pub competency: String,
    pub weight: f64,
    pub score: f64,
    pub source: ScoreSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFitReport {
    pub job_name: String,
    /// `Σ score × weight / 100`, in [0, 100].
    pub match_score: f64,
    pub competencies: Vec<WeightedCompetencyScore>,
}

/// Scores every competency in a validated profile and aggregates the job match.
pub fn evaluate_job_fit(
    profile: &JobCompetencyProfile,
    table: &MappingTable,
    results: &[InstrumentResult],
) -> Result<JobFitReport, JobProfileError> {
    profile.validate()?;

    let competencies: Vec<WeightedCompetencyScore> = profile
        .competencies
        .iter()
        .map(|c| {
            let scored = score_competency(table, &c.name, results);
            WeightedCompetencyScore {
                competency: scored.competency,
                weight: c.weight,
                score: scored.score,
                source: scored.source,
            }
        })
        .collect();

    let match_score = competencies
        .iter()
        .map(|c| c.score * c.weight / 100.0)
        .sum::<f64>();

    debug!(
        job = %profile.job_name,
        match_score,
        fallbacks = competencies
            .iter()
            .filter(|c| c.source == ScoreSource::Fallback)
            .count(),
        "Job fit evaluated"
    );

    Ok(JobFitReport {
        job_name: profile.job_name.clone(),
        match_score,
        competencies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{DimensionScore, InstrumentType, Level};

    fn weight(name: &str, weight: f64) -> CompetencyWeight {
        CompetencyWeight {
            name: name.to_string(),
            weight,
        }
    }

    fn profile(weights: Vec<CompetencyWeight>) -> JobCompetencyProfile {
        JobCompetencyProfile {
            job_name: "Backend Engineer".to_string(),
            competencies: weights,
        }
    }

    fn disc_result(d: f64, c: f64) -> InstrumentResult {
        let dim = |code: &str, score: f64| DimensionScore {
            dimension_code: code.to_string(),
            label: code.to_string(),
            raw_count: 0,
            answered: 0,
            normalized_score: score,
            t_score: None,
            signed_score: None,
            tendency: None,
            level: Level::from_score(score),
        };
        InstrumentResult {
            instrument_type: InstrumentType::Disc,
            dimension_scores: vec![dim("D", d), dim("C", c)],
            headline_type: "D".to_string(),
            description: String::new(),
            total_score: d,
            grade: "C".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_tolerance() {
        assert!(profile(vec![weight("execution", 60.0), weight("documentation", 39.995)])
            .validate()
            .is_ok());
        assert!(profile(vec![weight("execution", 60.0), weight("documentation", 40.005)])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_sum() {
        let err = profile(vec![weight("execution", 60.0), weight("documentation", 30.0)])
            .validate()
            .unwrap_err();
        assert!(matches!(err, JobProfileError::WeightSum { sum, .. } if (sum - 90.0).abs() < 1e-9));
    }

    #[test]
    fn test_validate_rejects_empty_and_negative() {
        assert!(matches!(profile(vec![]).validate(), Err(JobProfileError::Empty(_))));
        assert!(matches!(
            profile(vec![weight("execution", 120.0), weight("documentation", -20.0)]).validate(),
            Err(JobProfileError::NegativeWeight { .. })
        ));
    }

    #[test]
    fn test_evenly_weighted_profile_is_valid() {
        let p = JobCompetencyProfile::evenly_weighted("Analyst", &["a", "b", "c", "d", "e", "f"]);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_match_score_is_weighted_sum() {
        let table = MappingTable::builtin().unwrap();
        // execution: DISC D only (MBTI absent) → 80; documentation: DISC C only → 40
        let report = evaluate_job_fit(
            &profile(vec![weight("execution", 75.0), weight("documentation", 25.0)]),
            &table,
            &[disc_result(80.0, 40.0)],
        )
        .unwrap();

        assert!((report.match_score - 70.0).abs() < 1e-9);
        assert_eq!(report.competencies.len(), 2);
        assert!(report
            .competencies
            .iter()
            .all(|c| c.source == ScoreSource::Mapped));
    }

    #[test]
    fn test_job_fit_marks_fallback_competencies() {
        let table = MappingTable::builtin().unwrap();
        let report = evaluate_job_fit(
            &profile(vec![weight("aesthetics", 50.0), weight("execution", 50.0)]),
            &table,
            &[],
        )
        .unwrap();

        assert_eq!(report.competencies[0].source, ScoreSource::Fallback);
        assert_eq!(report.competencies[0].score, 60.0);
        assert!((report.match_score - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_job_fit_rejects_invalid_profile() {
        let table = MappingTable::builtin().unwrap();
        let result = evaluate_job_fit(&profile(vec![weight("execution", 10.0)]), &table, &[]);
        assert!(result.is_err());
    }
}
