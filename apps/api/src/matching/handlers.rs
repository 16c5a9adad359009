//! Axum route handlers for competency scoring and job fit.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assessment::InstrumentResult;
use crate::errors::AppError;
use crate::matching::{
    evaluate_job_fit, score_competency, CompetencyScore, JobCompetencyProfile, JobFamily,
    JobFitReport,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CompetencyScoreRequest {
    pub competency: String,
    #[serde(default)]
    pub results: Vec<InstrumentResult>,
}

#[derive(Debug, Deserialize)]
pub struct JobFitRequest {
    /// Explicit profile. When absent, one is proposed from `position`.
    #[serde(default)]
    pub profile: Option<JobCompetencyProfile>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub results: Vec<InstrumentResult>,
}

#[derive(Debug, Serialize)]
pub struct JobFitResponse {
    /// Set when the profile was proposed from the position title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_family: Option<JobFamily>,
    #[serde(flatten)]
    pub report: JobFitReport,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/competencies/score
pub async fn handle_score_competency(
    State(state): State<AppState>,
    Json(request): Json<CompetencyScoreRequest>,
) -> Result<Json<CompetencyScore>, AppError> {
    if request.competency.trim().is_empty() {
        return Err(AppError::Validation("competency cannot be empty".to_string()));
    }
    let score = score_competency(&state.mapping, &request.competency, &request.results);
    Ok(Json(score))
}

/// POST /api/v1/job-fit
pub async fn handle_job_fit(
    State(state): State<AppState>,
    Json(request): Json<JobFitRequest>,
) -> Result<Json<JobFitResponse>, AppError> {
    let (profile, job_family) = match request.profile {
        Some(profile) => (profile, None),
        None => {
            let family = JobFamily::detect(request.position.as_deref());
            let job_name = request.position.unwrap_or_else(|| "general".to_string());
            (family.default_profile(job_name), Some(family))
        }
    };

    let report = evaluate_job_fit(&profile, &state.mapping, &request.results)?;
    info!(
        job = %report.job_name,
        match_score = report.match_score,
        results = request.results.len(),
        "Job fit computed"
    );

    Ok(Json(JobFitResponse { job_family, report }))
}
