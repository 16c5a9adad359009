//! Axum route handlers for the profile cache.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::cache::{AnalysisTier, CacheEntry, CacheMetadata, SubjectState, TierAvailability};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub fingerprint: String,
    pub hit: bool,
    pub entry: Option<CacheEntry>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub fingerprint: String,
    pub tiers: Vec<TierAvailability>,
}

#[derive(Debug, Deserialize)]
pub struct StoreProfileRequest {
    pub state: SubjectState,
    pub payload: Value,
    #[serde(default)]
    pub metadata: CacheMetadata,
}

#[derive(Debug, Serialize)]
pub struct StoreProfileResponse {
    pub fingerprint: String,
}

#[derive(Debug, Deserialize)]
pub struct InvalidateQuery {
    pub tier: Option<AnalysisTier>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub removed: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/profiles/:subject_id/:tier/lookup
///
/// The body carries the subject's current timestamps; the fingerprint is
/// recomputed from them before every read.
pub async fn handle_lookup_profile(
    State(state): State<AppState>,
    Path((subject_id, tier)): Path<(Uuid, AnalysisTier)>,
    Json(subject): Json<SubjectState>,
) -> Result<Json<LookupResponse>, AppError> {
    let fingerprint = subject.fingerprint();
    let entry = state.cache.get(subject_id, tier, &fingerprint).await?;
    Ok(Json(LookupResponse {
        fingerprint,
        hit: entry.is_some(),
        entry,
    }))
}

/// POST /api/v1/profiles/:subject_id/availability
pub async fn handle_profile_availability(
    State(state): State<AppState>,
    Path(subject_id): Path<Uuid>,
    Json(subject): Json<SubjectState>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let fingerprint = subject.fingerprint();
    let tiers = state.cache.available_tiers(subject_id, &fingerprint).await?;
    Ok(Json(AvailabilityResponse { fingerprint, tiers }))
}

/// PUT /api/v1/profiles/:subject_id/:tier
pub async fn handle_store_profile(
    State(state): State<AppState>,
    Path((subject_id, tier)): Path<(Uuid, AnalysisTier)>,
    Json(request): Json<StoreProfileRequest>,
) -> Result<Json<StoreProfileResponse>, AppError> {
    let fingerprint = request.state.fingerprint();
    state
        .cache
        .put(subject_id, tier, &fingerprint, request.payload, request.metadata)
        .await?;
    info!(%subject_id, tier = tier.as_str(), "Profile cached");
    Ok(Json(StoreProfileResponse { fingerprint }))
}

/// DELETE /api/v1/profiles/:subject_id?tier=
pub async fn handle_invalidate_profile(
    State(state): State<AppState>,
    Path(subject_id): Path<Uuid>,
    Query(query): Query<InvalidateQuery>,
) -> Result<Json<InvalidateResponse>, AppError> {
    let removed = state.cache.invalidate(subject_id, query.tier).await?;
    info!(%subject_id, tier = query.tier.map(AnalysisTier::as_str), removed, "Profile cache invalidated");
    Ok(Json(InvalidateResponse { removed }))
}
