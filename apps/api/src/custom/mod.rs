//! Custom questionnaires: point accumulation over designer-defined questions.
//!
//! No fixed dimension set. A scored result can be folded into an
//! [`InstrumentResult`] of type `CUSTOM` so it feeds the competency mapper's
//! fallback mean alongside the professional instruments.

pub mod handlers;
pub mod models;
pub mod scoring;
pub mod validation;

use thiserror::Error;

use crate::assessment::{InstrumentResult, InstrumentType};
use models::CustomScoreResult;

pub use scoring::score_custom;
pub use validation::validate_scoring_config;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CustomConfigError {
    #[error("total_score must be greater than 0")]
    NonPositiveTotal,
    #[error("scoring method is required when scoring is enabled")]
    MissingMethod,
    #[error("scoring method must be by_question or by_option, got '{0}'")]
    UnknownMethod(String),
    #[error("at least one grade band is required when scoring is enabled")]
    NoGradeBands,
    #[error("grade band '{0}' is missing min_score or max_score")]
    BandWithoutRange(String),
    #[error("grade band '{name}' has min_score {min} above max_score {max}")]
    InvertedBand { name: String, min: f64, max: f64 },
}

impl CustomScoreResult {
    /// `None` for non-scored questionnaires.
    pub fn to_instrument_result(&self) -> Option<InstrumentResult> {
        let percentage = self.percentage?;
        let grade = self
            .grade
            .clone()
            .unwrap_or_else(|| scoring::UNGRADED.to_string());
        Some(InstrumentResult {
            instrument_type: InstrumentType::Custom,
            dimension_scores: Vec::new(),
            headline_type: grade.clone(),
            description: String::new(),
            total_score: percentage,
            grade,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_result_converts_to_custom_instrument() {
        let result = CustomScoreResult {
            total_score: Some(42.0),
            max_score: Some(50.0),
            percentage: Some(84.0),
            grade: Some("B".to_string()),
            breakdown: Vec::new(),
        };
        let instrument = result.to_instrument_result().unwrap();
        assert_eq!(instrument.instrument_type, InstrumentType::Custom);
        assert_eq!(instrument.total_score, 84.0);
        assert_eq!(instrument.headline_type, "B");
        assert!(instrument.dimension_scores.is_empty());
    }

    #[test]
    fn test_unscored_result_has_no_instrument_form() {
        let result = CustomScoreResult {
            total_score: None,
            max_score: None,
            percentage: None,
            grade: None,
            breakdown: Vec::new(),
        };
        assert!(result.to_instrument_result().is_none());
    }
}
