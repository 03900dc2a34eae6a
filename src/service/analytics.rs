//! Analytics service
//!
//! Single read policy: with a cache configured, a hit is returned as is; a
//! miss (or a cache failure) falls through to the store and the result is
//! written back to the cache on a detached task. Without a cache every read
//! goes to the store.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::aggregator::UserAnalytics;
use crate::store::{AnalyticsStore, AnomalyUser, StoreError};

use super::cache::{AnalyticsCache, CacheError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to load analytics: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to invalidate cached analytics: {0}")]
    Cache(#[from] CacheError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct AnalyticsService {
    store: Arc<dyn AnalyticsStore>,
    cache: Option<Arc<dyn AnalyticsCache>>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn AnalyticsStore>, cache: Option<Arc<dyn AnalyticsCache>>) -> Self {
        Self { store, cache }
    }

    /// A service that always reads from the store
    pub fn uncached(store: Arc<dyn AnalyticsStore>) -> Self {
        Self::new(store, None)
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub async fn user_analytics(&self, user_id: &str) -> ServiceResult<UserAnalytics> {
        let Some(cache) = &self.cache else {
            return Ok(self.store.user_analytics(user_id).await?);
        };

        match cache.get(user_id).await {
            Ok(Some(hit)) => return Ok(hit),
            Ok(None) => {}
            Err(e) => log::debug!("cache read for '{}' failed: {}", user_id, e),
        }

        let analytics = self.store.user_analytics(user_id).await?;

        // Runs to completion even if the caller's future is dropped
        let cache = Arc::clone(cache);
        let snapshot = analytics.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.set(&snapshot).await {
                log::debug!("cache write for '{}' failed: {}", snapshot.user_id, e);
            }
        });

        Ok(analytics)
    }

    pub async fn user_total_orders(&self, user_id: &str) -> ServiceResult<i64> {
        Ok(self.user_analytics(user_id).await?.total_orders)
    }

    pub async fn user_total_spent(&self, user_id: &str) -> ServiceResult<Decimal> {
        Ok(self.user_analytics(user_id).await?.total_spent)
    }

    pub async fn top_users(&self, limit: usize) -> ServiceResult<Vec<UserAnalytics>> {
        Ok(self.store.top_users(limit).await?)
    }

    pub async fn detect_anomalies(&self) -> ServiceResult<Vec<AnomalyUser>> {
        Ok(self.store.user_anomalies().await?)
    }

    /// Drop a user's cached totals; a no-op without a cache
    pub async fn invalidate_user(&self, user_id: &str) -> ServiceResult<()> {
        if let Some(cache) = &self.cache {
            cache.delete(user_id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::BatchDelta;
    use crate::core::shutdown::CancellationSignal;
    use crate::service::cache::{CacheResult, MemoryAnalyticsCache};
    use crate::store::StoreResult;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Serves fixed totals and counts reads
    struct CountingStore {
        reads: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                reads: AtomicUsize::new(0),
            })
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnalyticsStore for CountingStore {
        async fn apply_batch(&self, _: &BatchDelta, _: &CancellationSignal) -> StoreResult<()> {
            Ok(())
        }

        async fn user_analytics(&self, user_id: &str) -> StoreResult<UserAnalytics> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(UserAnalytics {
                user_id: user_id.to_string(),
                total_orders: 7,
                total_spent: dec!(70.00),
            })
        }

        async fn top_users(&self, _limit: usize) -> StoreResult<Vec<UserAnalytics>> {
            Ok(Vec::new())
        }

        async fn user_anomalies(&self) -> StoreResult<Vec<AnomalyUser>> {
            Ok(Vec::new())
        }
    }

    /// A cache whose every operation fails
    struct BrokenCache;

    #[async_trait]
    impl AnalyticsCache for BrokenCache {
        async fn get(&self, _: &str) -> CacheResult<Option<UserAnalytics>> {
            Err(CacheError::Unavailable {
                message: "connection refused".to_string(),
            })
        }

        async fn set(&self, _: &UserAnalytics) -> CacheResult<()> {
            Err(CacheError::Unavailable {
                message: "connection refused".to_string(),
            })
        }

        async fn delete(&self, _: &str) -> CacheResult<()> {
            Err(CacheError::Unavailable {
                message: "connection refused".to_string(),
            })
        }
    }

    async fn wait_for_cached(cache: &MemoryAnalyticsCache, user_id: &str) -> Option<UserAnalytics> {
        for _ in 0..50 {
            if let Some(hit) = cache.get(user_id).await.unwrap() {
                return Some(hit);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        None
    }

    #[tokio::test]
    async fn test_hit_avoids_store() {
        let store = CountingStore::new();
        let cache = Arc::new(MemoryAnalyticsCache::default());
        cache
            .set(&UserAnalytics {
                user_id: "u1".to_string(),
                total_orders: 1,
                total_spent: dec!(1),
            })
            .await
            .unwrap();

        let service = AnalyticsService::new(store.clone(), Some(cache));
        assert_eq!(service.user_total_orders("u1").await.unwrap(), 1);
        assert_eq!(store.reads(), 0);
    }

    #[tokio::test]
    async fn test_miss_loads_and_populates_cache() {
        let store = CountingStore::new();
        let cache = Arc::new(MemoryAnalyticsCache::default());
        let service = AnalyticsService::new(store.clone(), Some(cache.clone()));

        assert_eq!(service.user_total_spent("u1").await.unwrap(), dec!(70));
        assert_eq!(store.reads(), 1);

        let cached = wait_for_cached(&cache, "u1").await;
        assert_eq!(cached.map(|a| a.total_orders), Some(7));

        service.user_analytics("u1").await.unwrap();
        assert_eq!(store.reads(), 1, "second read served from cache");
    }

    #[tokio::test]
    async fn test_disabled_cache_always_reads_store() {
        let store = CountingStore::new();
        let service = AnalyticsService::uncached(store.clone());
        assert!(!service.cache_enabled());

        service.user_analytics("u1").await.unwrap();
        service.user_analytics("u1").await.unwrap();
        assert_eq!(store.reads(), 2);
        service.invalidate_user("u1").await.unwrap();
    }

    #[tokio::test]
    async fn test_cache_failures_are_swallowed_on_read() {
        let store = CountingStore::new();
        let service = AnalyticsService::new(store.clone(), Some(Arc::new(BrokenCache)));

        let analytics = service.user_analytics("u1").await.unwrap();
        assert_eq!(analytics.total_orders, 7);
        assert_eq!(store.reads(), 1);

        // Explicit invalidation does report the failure
        assert!(matches!(
            service.invalidate_user("u1").await,
            Err(ServiceError::Cache(_))
        ));
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let store = CountingStore::new();
        let cache = Arc::new(MemoryAnalyticsCache::default());
        let service = AnalyticsService::new(store.clone(), Some(cache.clone()));

        service.user_analytics("u1").await.unwrap();
        wait_for_cached(&cache, "u1").await;
        service.invalidate_user("u1").await.unwrap();

        service.user_analytics("u1").await.unwrap();
        assert_eq!(store.reads(), 2);
    }
}
