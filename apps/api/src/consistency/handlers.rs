use axum::{extract::State, Json};
use serde::Deserialize;

use crate::assessment::InstrumentResult;
use crate::consistency::CrossValidationReport;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CrossValidationRequest {
    #[serde(default)]
    pub results: Vec<InstrumentResult>,
}

/// POST /api/v1/cross-validation
pub async fn handle_cross_validation(
    State(state): State<AppState>,
    Json(request): Json<CrossValidationRequest>,
) -> Result<Json<CrossValidationReport>, AppError> {
    Ok(Json(state.cross_validator.validate(&request.results)))
}
