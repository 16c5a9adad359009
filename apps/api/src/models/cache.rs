use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::cache::{AnalysisTier, CacheEntry, CacheMetadata};
use crate::errors::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct ProfileCacheRow {
    pub subject_id: Uuid,
    pub analysis_tier: String,
    pub version_fingerprint: String,
    pub payload: Value,
    pub ai_model: Option<String>,
    pub generation_time_ms: Option<i64>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileCacheRow> for CacheEntry {
    type Error = AppError;

    fn try_from(row: ProfileCacheRow) -> Result<Self, Self::Error> {
        let analysis_tier = AnalysisTier::parse(&row.analysis_tier).ok_or_else(|| {
            AppError::Internal(anyhow!(
                "unknown analysis tier '{}' stored for subject {}",
                row.analysis_tier,
                row.subject_id
            ))
        })?;
        Ok(CacheEntry {
            subject_id: row.subject_id,
            analysis_tier,
            version_fingerprint: row.version_fingerprint,
            payload: row.payload,
            metadata: CacheMetadata {
                model: row.ai_model,
                generation_time_ms: row.generation_time_ms,
                is_default: row.is_default,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
