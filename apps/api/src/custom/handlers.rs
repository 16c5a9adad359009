//! Axum route handlers for custom questionnaires.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assessment::InstrumentResult;
use crate::custom::models::{CustomAnswer, CustomQuestionnaire, CustomScoreResult, ScoringConfig};
use crate::custom::{score_custom, validate_scoring_config};
use crate::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct ScoreCustomRequest {
    pub questionnaire: CustomQuestionnaire,
    #[serde(default)]
    pub answers: Vec<CustomAnswer>,
}

#[derive(Debug, Serialize)]
pub struct ScoreCustomResponse {
    #[serde(flatten)]
    pub score: CustomScoreResult,
    /// Present only for scored questionnaires.
    pub instrument_result: Option<InstrumentResult>,
}

/// POST /api/v1/questionnaires/custom/score
pub async fn handle_score_custom(
    Json(request): Json<ScoreCustomRequest>,
) -> Result<Json<ScoreCustomResponse>, AppError> {
    let score = score_custom(&request.questionnaire, &request.answers)?;
    info!(
        scored = score.is_scored(),
        answers = score.breakdown.len(),
        "Custom questionnaire scored"
    );

    let instrument_result = score.to_instrument_result();
    Ok(Json(ScoreCustomResponse {
        score,
        instrument_result,
    }))
}

/// POST /api/v1/questionnaires/custom/validate
pub async fn handle_validate_scoring_config(
    Json(config): Json<ScoringConfig>,
) -> Result<StatusCode, AppError> {
    validate_scoring_config(&config)?;
    Ok(StatusCode::NO_CONTENT)
}
