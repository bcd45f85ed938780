//! Time-boxed recommendation cache, keyed by `(subject, limit)`.
//!
//! Entries are replaced wholesale, never mutated in place, and callers only
//! ever get clones. All mutation goes through `put`, `invalidate` and `clear`.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::models::Recommendation;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub subject_id: String,
    pub limit: u32,
}

impl CacheKey {
    pub fn new(subject_id: impl Into<String>, limit: u32) -> Self {
        Self {
            subject_id: subject_id.into(),
            limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: Vec<Recommendation>,
    pub fetched_at: Instant,
}

impl CacheEntry {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }
}

/// `now - fetched_at < ttl`. An entry is stale at exactly `ttl`.
pub fn is_fresh(entry: &CacheEntry, now: Instant, ttl: Duration) -> bool {
    entry.age(now) < ttl
}

pub struct RecommendationCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl RecommendationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Pure lookup; never fetches and ignores freshness.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    /// Stores `payload` stamped with the current time, replacing any prior entry.
    pub async fn put(&self, key: CacheKey, payload: Vec<Recommendation>) {
        let entry = CacheEntry {
            key: key.clone(),
            payload,
            fetched_at: Instant::now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Drops every entry and returns how many there were.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        count
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for RecommendationCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
