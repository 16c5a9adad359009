//! Axum route handlers for the Assessment API.

use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assessment::{score_named, InstrumentResult, QuestionSpec, RawAnswerSet};
use crate::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct ScoreAssessmentRequest {
    /// `MBTI`, `DISC` or `EPQ`, any case.
    pub instrument: String,
    #[serde(default)]
    pub answers: RawAnswerSet,
    /// Omit to score against the legacy fixed index ranges.
    #[serde(default)]
    pub questions: Option<Vec<QuestionSpec>>,
}

#[derive(Debug, Serialize)]
pub struct ScoreAssessmentResponse {
    pub result: InstrumentResult,
}

/// POST /api/v1/assessments/score
pub async fn handle_score_assessment(
    Json(request): Json<ScoreAssessmentRequest>,
) -> Result<Json<ScoreAssessmentResponse>, AppError> {
    let result = score_named(
        &request.instrument,
        &request.answers,
        request.questions.as_deref(),
    )?;

    info!(
        instrument = %result.instrument_type,
        headline = %result.headline_type,
        answered = request.answers.len(),
        "Assessment scored"
    );

    Ok(Json(ScoreAssessmentResponse { result }))
}
