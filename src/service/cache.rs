//! Analytics cache
//!
//! Entries are keyed `analytics:<user_id>`, stored as JSON snapshots and
//! expire after a fixed TTL. Expired entries read as misses and are evicted
//! lazily, or in bulk by [`MemoryAnalyticsCache::purge_expired`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::aggregator::UserAnalytics;

/// Default lifetime of a cache entry
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60 * 60);

const KEY_PREFIX: &str = "analytics:";

pub fn cache_key(user_id: &str) -> String {
    format!("{}{}", KEY_PREFIX, user_id)
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache unavailable: {message}")]
    Unavailable { message: String },

    #[error("Cache entry for '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type CacheResult<T> = Result<T, CacheError>;

#[async_trait]
pub trait AnalyticsCache: Send + Sync {
    /// Cached totals for a user; `None` on a miss or an expired entry
    async fn get(&self, user_id: &str) -> CacheResult<Option<UserAnalytics>>;

    async fn set(&self, analytics: &UserAnalytics) -> CacheResult<()>;

    async fn delete(&self, user_id: &str) -> CacheResult<()>;
}

struct CacheEntry {
    payload: String,
    expires_at: Instant,
}

/// In-process cache with per-entry expiry
pub struct MemoryAnalyticsCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryAnalyticsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of entries held, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every expired entry; returns how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }
}

impl Default for MemoryAnalyticsCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

#[async_trait]
impl AnalyticsCache for MemoryAnalyticsCache {
    async fn get(&self, user_id: &str) -> CacheResult<Option<UserAnalytics>> {
        let key = cache_key(user_id);
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > now => {
                    return serde_json::from_str(&entry.payload)
                        .map(Some)
                        .map_err(|source| CacheError::Corrupt { key, source });
                }
                Some(_) => {}
            }
        }

        // Expired: evict unless it was refreshed in the meantime
        let mut entries = self.entries.write().await;
        if entries.get(&key).is_some_and(|entry| entry.expires_at <= now) {
            entries.remove(&key);
        }
        Ok(None)
    }

    async fn set(&self, analytics: &UserAnalytics) -> CacheResult<()> {
        let key = cache_key(&analytics.user_id);
        let payload = serde_json::to_string(analytics)
            .map_err(|source| CacheError::Corrupt {
                key: key.clone(),
                source,
            })?;

        let entry = CacheEntry {
            payload,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(key, entry);
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> CacheResult<()> {
        self.entries.write().await.remove(&cache_key(user_id));
        Ok(())
    }
}
