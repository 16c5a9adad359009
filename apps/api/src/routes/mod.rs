pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;
use crate::{assessment, cache, consistency, custom, matching};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Scoring
        .route(
            "/api/v1/assessments/score",
            post(assessment::handlers::handle_score_assessment),
        )
        .route(
            "/api/v1/questionnaires/custom/score",
            post(custom::handlers::handle_score_custom),
        )
        .route(
            "/api/v1/questionnaires/custom/validate",
            post(custom::handlers::handle_validate_scoring_config),
        )
        // Matching
        .route(
            "/api/v1/competencies/score",
            post(matching::handlers::handle_score_competency),
        )
        .route("/api/v1/job-fit", post(matching::handlers::handle_job_fit))
        .route(
            "/api/v1/cross-validation",
            post(consistency::handlers::handle_cross_validation),
        )
        // Profile cache
        .route(
            "/api/v1/profiles/:subject_id",
            delete(cache::handlers::handle_invalidate_profile),
        )
        .route(
            "/api/v1/profiles/:subject_id/availability",
            post(cache::handlers::handle_profile_availability),
        )
        .route(
            "/api/v1/profiles/:subject_id/:tier",
            put(cache::handlers::handle_store_profile),
        )
        .route(
            "/api/v1/profiles/:subject_id/:tier/lookup",
            post(cache::handlers::handle_lookup_profile),
        )
        .with_state(state)
}
