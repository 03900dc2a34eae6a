//! Read side: analytics queries with an optional cache in front of the store

mod analytics;
pub mod cache;

pub use analytics::{AnalyticsService, ServiceError, ServiceResult};
pub use cache::{
    cache_key, AnalyticsCache, CacheError, CacheResult, MemoryAnalyticsCache, DEFAULT_CACHE_TTL,
};
