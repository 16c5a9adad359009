use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cache::{AnalysisTier, CacheEntry, CacheMetadata, ProfileCache};
use crate::errors::AppError;

/// In-process cache backend. Selected with `CACHE_BACKEND=memory` and used by tests.
#[derive(Default)]
pub struct MemoryProfileCache {
    entries: RwLock<HashMap<(Uuid, AnalysisTier), CacheEntry>>,
}

impl MemoryProfileCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileCache for MemoryProfileCache {
    async fn entry(
        &self,
        subject_id: Uuid,
        tier: AnalysisTier,
    ) -> Result<Option<CacheEntry>, AppError> {
        Ok(self.entries.read().await.get(&(subject_id, tier)).cloned())
    }

    async fn put(
        &self,
        subject_id: Uuid,
        tier: AnalysisTier,
        fingerprint: &str,
        payload: Value,
        metadata: CacheMetadata,
    ) -> Result<CacheEntry, AppError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let created_at = entries
            .get(&(subject_id, tier))
            .map(|existing| existing.created_at)
            .unwrap_or(now);
        let entry = CacheEntry {
            subject_id,
            analysis_tier: tier,
            version_fingerprint: fingerprint.to_string(),
            payload,
            metadata,
            created_at,
            updated_at: now,
        };
        entries.insert((subject_id, tier), entry.clone());
        Ok(entry)
    }

    async fn invalidate(
        &self,
        subject_id: Uuid,
        tier: Option<AnalysisTier>,
    ) -> Result<u64, AppError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(id, t), _| !(*id == subject_id && tier.map_or(true, |wanted| wanted == *t)));
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_hits_only_on_matching_fingerprint() {
        let cache = MemoryProfileCache::new();
        let subject = Uuid::new_v4();
        cache
            .put(subject, AnalysisTier::Pro, "v1", json!({"summary": "ok"}), CacheMetadata::default())
            .await
            .unwrap();

        let hit = cache.get(subject, AnalysisTier::Pro, "v1").await.unwrap();
        assert_eq!(hit.unwrap().payload, json!({"summary": "ok"}));
        assert!(cache.get(subject, AnalysisTier::Pro, "v2").await.unwrap().is_none());
        assert!(cache.get(subject, AnalysisTier::Expert, "v1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_entry_is_kept_for_inspection() {
        let cache = MemoryProfileCache::new();
        let subject = Uuid::new_v4();
        cache
            .put(subject, AnalysisTier::Expert, "old", json!(1), CacheMetadata::default())
            .await
            .unwrap();

        assert!(cache.get(subject, AnalysisTier::Expert, "new").await.unwrap().is_none());
        let stale = cache.entry(subject, AnalysisTier::Expert).await.unwrap().unwrap();
        assert_eq!(stale.version_fingerprint, "old");
    }

    #[tokio::test]
    async fn test_put_replaces_in_place() {
        let cache = MemoryProfileCache::new();
        let subject = Uuid::new_v4();
        let first = cache
            .put(subject, AnalysisTier::Pro, "v1", json!("first"), CacheMetadata::default())
            .await
            .unwrap();
        let metadata = CacheMetadata {
            model: Some("narrative-large".to_string()),
            generation_time_ms: Some(1_250),
            is_default: false,
        };
        let second = cache
            .put(subject, AnalysisTier::Pro, "v2", json!("second"), metadata.clone())
            .await
            .unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        let stored = cache.entry(subject, AnalysisTier::Pro).await.unwrap().unwrap();
        assert_eq!(stored.payload, json!("second"));
        assert_eq!(stored.version_fingerprint, "v2");
        assert_eq!(stored.metadata, metadata);
        assert_eq!(cache.entries.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_available_tiers() {
        let cache = MemoryProfileCache::new();
        let subject = Uuid::new_v4();
        cache
            .put(subject, AnalysisTier::Pro, "fp", json!({}), CacheMetadata::default())
            .await
            .unwrap();
        cache
            .put(subject, AnalysisTier::Expert, "older", json!({}), CacheMetadata::default())
            .await
            .unwrap();

        let tiers = cache.available_tiers(subject, "fp").await.unwrap();
        assert_eq!(tiers.len(), 2);
        assert!(tiers.iter().any(|t| t.tier == AnalysisTier::Pro && t.cached));
        assert!(tiers.iter().any(|t| t.tier == AnalysisTier::Expert && !t.cached));
    }

    #[tokio::test]
    async fn test_invalidate_one_or_all_tiers() {
        let cache = MemoryProfileCache::new();
        let subject = Uuid::new_v4();
        let other = Uuid::new_v4();
        for tier in AnalysisTier::ALL {
            cache.put(subject, tier, "fp", json!({}), CacheMetadata::default()).await.unwrap();
        }
        cache.put(other, AnalysisTier::Pro, "fp", json!({}), CacheMetadata::default()).await.unwrap();

        assert_eq!(cache.invalidate(subject, Some(AnalysisTier::Pro)).await.unwrap(), 1);
        assert!(cache.entry(subject, AnalysisTier::Pro).await.unwrap().is_none());
        assert_eq!(cache.invalidate(subject, None).await.unwrap(), 1);
        assert_eq!(cache.invalidate(subject, None).await.unwrap(), 0);
        assert!(cache.entry(other, AnalysisTier::Pro).await.unwrap().is_some());
    }
}
