//! Versioned profile cache.
//!
//! One entry per `(subject_id, tier)`. Freshness is decided at read time by
//! comparing the stored fingerprint against one recomputed by the caller; a
//! stale entry is left in place until the next `put` overwrites it. The cache
//! never evicts on its own.

pub mod fingerprint;
pub mod handlers;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

pub use fingerprint::SubjectState;
pub use memory::MemoryProfileCache;
pub use postgres::PgProfileCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisTier {
    Pro,
    Expert,
}

impl AnalysisTier {
    pub const ALL: [AnalysisTier; 2] = [Self::Pro, Self::Expert];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pro => "pro",
            Self::Expert => "expert",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheMetadata {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub generation_time_ms: Option<i64>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub subject_id: Uuid,
    pub analysis_tier: AnalysisTier,
    pub version_fingerprint: String,
    pub payload: Value,
    pub metadata: CacheMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAvailability {
    pub tier: AnalysisTier,
    pub cached: bool,
}

/// Storage capability behind the cache.
///
/// Carried in `AppState` as `Arc<dyn ProfileCache>`. Concurrent `put`s on the
/// same key race with last-writer-wins semantics.
#[async_trait]
pub trait ProfileCache: Send + Sync {
    /// Stored entry regardless of freshness.
    async fn entry(
        &self,
        subject_id: Uuid,
        tier: AnalysisTier,
    ) -> Result<Option<CacheEntry>, AppError>;

    /// Upsert keyed by `(subject_id, tier)`. Replaces payload, fingerprint and
    /// metadata of any existing entry in place.
    async fn put(
        &self,
        subject_id: Uuid,
        tier: AnalysisTier,
        fingerprint: &str,
        payload: Value,
        metadata: CacheMetadata,
    ) -> Result<CacheEntry, AppError>;

    /// Deletes one tier, or every tier when `tier` is `None`. Returns the
    /// number of entries removed.
    async fn invalidate(
        &self,
        subject_id: Uuid,
        tier: Option<AnalysisTier>,
    ) -> Result<u64, AppError>;

    /// Entry only if its fingerprint matches; a mismatch is a miss.
    async fn get(
        &self,
        subject_id: Uuid,
        tier: AnalysisTier,
        fingerprint: &str,
    ) -> Result<Option<CacheEntry>, AppError> {
        match self.entry(subject_id, tier).await? {
            Some(entry) if entry.version_fingerprint == fingerprint => {
                info!(%subject_id, tier = tier.as_str(), "Profile cache hit");
                Ok(Some(entry))
            }
            Some(_) => {
                info!(%subject_id, tier = tier.as_str(), "Profile cache stale");
                Ok(None)
            }
            None => {
                info!(%subject_id, tier = tier.as_str(), "Profile cache miss");
                Ok(None)
            }
        }
    }

    async fn available_tiers(
        &self,
        subject_id: Uuid,
        fingerprint: &str,
    ) -> Result<Vec<TierAvailability>, AppError> {
        let mut tiers = Vec::with_capacity(AnalysisTier::ALL.len());
        for tier in AnalysisTier::ALL {
            let cached = self.get(subject_id, tier, fingerprint).await?.is_some();
            tiers.push(TierAvailability { tier, cached });
        }
        Ok(tiers)
    }
}
