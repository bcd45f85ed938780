//! Recommendation facade: composes the cache and the scoring backend behind
//! the API the HTTP handlers use.
//!
//! Per `(subject, limit)` key:
//! 1. fresh entry → served from cache, no remote call
//! 2. missing or stale → fetched, validated, cached
//!    - fetch fails with an entry present → stale entry served (`stale = true`)
//!    - fetch fails with nothing cached → error propagated unchanged
//!
//! At most one fetch per key is in flight; concurrent callers wait for it and
//! then read the cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::matching::cache::{is_fresh, CacheKey, RecommendationCache};
use crate::matching::validation::{filter_recommendations, filter_scored_applications};
use crate::models::{Recommendation, ScoredApplication};
use crate::scoring_client::{ScoringBackend, ScoringError};

pub const DEFAULT_LIMIT: u32 = 5;
/// The backend never returns more than this many top recommendations.
pub const MAX_LIMIT: u32 = 20;

/// Recommendations as served to a caller, with how they were obtained.
#[derive(Debug, Clone)]
pub struct RecommendationBatch {
    pub items: Vec<Recommendation>,
    /// True only when a refetch failed and an expired entry was served instead.
    pub stale: bool,
    pub age: Duration,
}

pub struct RecommendationService {
    backend: Arc<dyn ScoringBackend>,
    cache: Arc<RecommendationCache>,
    fetch_locks: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl RecommendationService {
    pub fn new(backend: Arc<dyn ScoringBackend>, cache: Arc<RecommendationCache>) -> Self {
        Self {
            backend,
            cache,
            fetch_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &RecommendationCache {
        &self.cache
    }

    pub async fn get_recommendations(
        &self,
        subject_id: &str,
        limit: u32,
    ) -> Result<RecommendationBatch, ScoringError> {
        let key = CacheKey::new(normalize_id(subject_id, "subject id")?, clamp_limit(limit));

        if let Some(batch) = self.fresh_batch(&key).await {
            debug!("Recommendations for {} (limit {}) served from cache", key.subject_id, key.limit);
            return Ok(batch);
        }

        let lock = self.fetch_lock(&key).await;
        let result = {
            let _guard = lock.lock().await;
            self.refresh(&key).await
        };
        self.release_fetch_lock(&key, lock).await;
        result
    }

    /// Fetch-and-store for one key. Must run under that key's fetch lock.
    async fn refresh(&self, key: &CacheKey) -> Result<RecommendationBatch, ScoringError> {
        // Whoever held the lock before us may have just filled the entry.
        if let Some(batch) = self.fresh_batch(key).await {
            debug!("Recommendations for {} filled by a concurrent fetch", key.subject_id);
            return Ok(batch);
        }

        debug!("Fetching recommendations for {} (limit {})", key.subject_id, key.limit);
        match self
            .backend
            .fetch_top_recommendations(&key.subject_id, key.limit)
            .await
        {
            Ok(records) => {
                let items = filter_recommendations(&records, &key.subject_id);
                info!(
                    "Fetched {} recommendations for {} ({} received)",
                    items.len(),
                    key.subject_id,
                    records.len()
                );
                self.cache.put(key.clone(), items.clone()).await;
                Ok(RecommendationBatch {
                    items,
                    stale: false,
                    age: Duration::ZERO,
                })
            }
            Err(err) => match self.cache.get(key).await {
                Some(entry) => {
                    warn!(
                        retryable = err.is_retryable(),
                        "Serving stale recommendations for {} (limit {}) after fetch failure: {err}",
                        entry.key.subject_id,
                        entry.key.limit
                    );
                    Ok(RecommendationBatch {
                        age: entry.age(Instant::now()),
                        items: entry.payload,
                        stale: true,
                    })
                }
                None => Err(err),
            },
        }
    }

    /// Every recommendation for a subject, bypassing the cache.
    pub async fn get_all_recommendations(
        &self,
        subject_id: &str,
    ) -> Result<Vec<Recommendation>, ScoringError> {
        let subject_id = normalize_id(subject_id, "subject id")?;
        let records = self.backend.fetch_all_recommendations(&subject_id).await?;
        Ok(filter_recommendations(&records, &subject_id))
    }

    /// Applications for a job in the backend's ranking order, malformed ones dropped.
    pub async fn get_ranked_applications(
        &self,
        job_id: &str,
    ) -> Result<Vec<ScoredApplication>, ScoringError> {
        let job_id = normalize_id(job_id, "job id")?;
        let records = self.backend.fetch_ranked_applications(&job_id).await?;
        Ok(filter_scored_applications(&records))
    }

    /// Triggers server-side recomputation. Does not touch the cache: the new
    /// scores land at an unknown later time, so callers clear and refetch.
    pub async fn recalculate_scores(&self) -> Result<(), ScoringError> {
        self.backend.request_recalculation().await?;
        info!("Matching score recalculation requested");
        Ok(())
    }

    pub async fn clear_cache(&self) -> usize {
        let cleared = self.cache.clear().await;
        self.fetch_locks
            .lock()
            .await
            .retain(|_, lock| Arc::strong_count(lock) > 1);
        info!("Recommendation cache cleared ({cleared} entries)");
        cleared
    }

    pub async fn invalidate(&self, subject_id: &str, limit: u32) -> Result<bool, ScoringError> {
        let key = CacheKey::new(normalize_id(subject_id, "subject id")?, clamp_limit(limit));
        Ok(self.cache.invalidate(&key).await)
    }

    async fn fresh_batch(&self, key: &CacheKey) -> Option<RecommendationBatch> {
        let entry = self.cache.get(key).await?;
        let now = Instant::now();
        is_fresh(&entry, now, self.cache.ttl()).then(|| RecommendationBatch {
            age: entry.age(now),
            items: entry.payload,
            stale: false,
        })
    }

    async fn fetch_lock(&self, key: &CacheKey) -> Arc<Mutex<()>> {
        self.fetch_locks
            .lock()
            .await
            .entry(key.clone())
            .or_default()
            .clone()
    }

    /// Drops the key's lock from the map once no other caller holds or waits on it.
    async fn release_fetch_lock(&self, key: &CacheKey, lock: Arc<Mutex<()>>) {
        let mut locks = self.fetch_locks.lock().await;
        // One reference in the map, one here.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
    }
}

pub fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_LIMIT)
}

fn normalize_id(id: &str, what: &str) -> Result<String, ScoringError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ScoringError::validation(format!("{what} cannot be empty")));
    }
    Ok(id.to_string())
}
