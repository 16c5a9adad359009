use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::cache::{AnalysisTier, CacheEntry, CacheMetadata, ProfileCache};
use crate::errors::AppError;
use crate::models::cache::ProfileCacheRow;

const SELECT_COLUMNS: &str = "subject_id, analysis_tier, version_fingerprint, payload, \
     ai_model, generation_time_ms, is_default, created_at, updated_at";

/// Postgres backend over the `profile_cache` table.
#[derive(Clone)]
pub struct PgProfileCache {
    pool: PgPool,
}

impl PgProfileCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileCache for PgProfileCache {
    async fn entry(
        &self,
        subject_id: Uuid,
        tier: AnalysisTier,
    ) -> Result<Option<CacheEntry>, AppError> {
        let row: Option<ProfileCacheRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM profile_cache WHERE subject_id = $1 AND analysis_tier = $2"
        ))
        .bind(subject_id)
        .bind(tier.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CacheEntry::try_from).transpose()
    }

    async fn put(
        &self,
        subject_id: Uuid,
        tier: AnalysisTier,
        fingerprint: &str,
        payload: Value,
        metadata: CacheMetadata,
    ) -> Result<CacheEntry, AppError> {
        // Upsert: one row per (subject, tier), created_at survives overwrites
        let row: ProfileCacheRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO profile_cache
                (subject_id, analysis_tier, version_fingerprint, payload,
                 ai_model, generation_time_ms, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (subject_id, analysis_tier) DO UPDATE SET
                version_fingerprint = EXCLUDED.version_fingerprint,
                payload = EXCLUDED.payload,
                ai_model = EXCLUDED.ai_model,
                generation_time_ms = EXCLUDED.generation_time_ms,
                is_default = EXCLUDED.is_default,
                updated_at = NOW()
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(subject_id)
        .bind(tier.as_str())
        .bind(fingerprint)
        .bind(&payload)
        .bind(metadata.model.as_deref())
        .bind(metadata.generation_time_ms)
        .bind(metadata.is_default)
        .fetch_one(&self.pool)
        .await?;

        CacheEntry::try_from(row)
    }

    async fn invalidate(
        &self,
        subject_id: Uuid,
        tier: Option<AnalysisTier>,
    ) -> Result<u64, AppError> {
        let result = match tier {
            Some(tier) => {
                sqlx::query("DELETE FROM profile_cache WHERE subject_id = $1 AND analysis_tier = $2")
                    .bind(subject_id)
                    .bind(tier.as_str())
                    .execute(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("DELETE FROM profile_cache WHERE subject_id = $1")
                    .bind(subject_id)
                    .execute(&self.pool)
                    .await?
            }
        };
        Ok(result.rows_affected())
    }
}
