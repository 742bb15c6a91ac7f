//! In-memory cache implementation using the moka crate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use questhub_core::config::cache::MemoryCacheConfig;
use questhub_core::result::AppResult;
use questhub_core::traits::cache::CacheProvider;

/// Counters beyond this many trigger a sweep of expired ones.
const COUNTER_PRUNE_THRESHOLD: usize = 10_000;

/// A cached value together with its own TTL.
#[derive(Debug, Clone)]
struct CachedValue {
    value: String,
    ttl: Duration,
}

/// Per-entry expiry, capped at the configured maximum.
#[derive(Debug, Clone, Copy)]
struct PerEntryTtl {
    max: Duration,
}

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl.min(self.max))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl.min(self.max))
    }
}

/// An integer counter with an optional deadline.
#[derive(Debug, Clone, Copy)]
struct Counter {
    value: i64,
    expires_at: Option<Instant>,
}

impl Counter {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, CachedValue>,
    /// Default TTL for entries.
    default_ttl: Duration,
    /// Counters stored separately for atomic increments.
    counters: Arc<DashMap<String, Counter>>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig, default_ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl {
                max: Duration::from_secs(config.time_to_live_seconds),
            })
            .build();

        Self {
            cache,
            default_ttl: Duration::from_secs(default_ttl_seconds),
            counters: Arc::new(DashMap::new()),
        }
    }

    fn live_counter(&self, key: &str) -> Option<i64> {
        let now = Instant::now();
        self.counters
            .get(key)
            .filter(|c| !c.is_expired(now))
            .map(|c| c.value)
    }

    fn prune_counters(&self) {
        if self.counters.len() > COUNTER_PRUNE_THRESHOLD {
            let now = Instant::now();
            let before = self.counters.len();
            self.counters.retain(|_, c| !c.is_expired(now));
            debug!(removed = before - self.counters.len(), "Pruned expired counters");
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        if let Some(entry) = self.cache.get(key).await {
            return Ok(Some(entry.value));
        }
        Ok(self.live_counter(key).map(|v| v.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(
                key.to_string(),
                CachedValue {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn set_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.set(key, value, self.default_ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        self.counters.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key) || self.live_counter(key).is_some())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let value = value.to_string();
        let entry = self
            .cache
            .entry(key.to_string())
            .or_insert_with(async move { CachedValue { value, ttl } })
            .await;
        Ok(entry.is_fresh())
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        self.prune_counters();
        let now = Instant::now();
        let mut entry = self.counters.entry(key.to_string()).or_insert(Counter {
            value: 0,
            expires_at: Some(now + self.default_ttl),
        });
        if entry.is_expired(now) {
            *entry = Counter {
                value: 0,
                expires_at: Some(now + self.default_ttl),
            };
        }
        entry.value += 1;
        Ok(entry.value)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let now = Instant::now();
        if let Some(mut counter) = self.counters.get_mut(key) {
            if !counter.is_expired(now) {
                counter.expires_at = Some(now + ttl);
                return Ok(true);
            }
        }
        if let Some(entry) = self.cache.get(key).await {
            self.cache
                .insert(
                    key.to_string(),
                    CachedValue {
                        value: entry.value,
                        ttl,
                    },
                )
                .await;
            return Ok(true);
        }
        Ok(false)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_provider() -> MemoryCacheProvider {
        let config = MemoryCacheConfig {
            max_capacity: 1000,
            time_to_live_seconds: 60,
        };
        MemoryCacheProvider::new(&config, 60)
    }

    #[tokio::test]
    async fn test_set_get() {
        let provider = make_provider();
        provider
            .set("key1", "value1", Duration::from_secs(60))
            .await
            .unwrap();
        let val = provider.get("key1").await.unwrap();
        assert_eq!(val, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_delete() {
        let provider = make_provider();
        provider
            .set("key2", "value2", Duration::from_secs(60))
            .await
            .unwrap();
        provider.delete("key2").await.unwrap();
        assert_eq!(provider.get("key2").await.unwrap(), None);
        assert!(!provider.exists("key2").await.unwrap());
    }

    #[tokio::test]
    async fn test_incr_is_visible_through_get() {
        let provider = make_provider();
        assert_eq!(provider.incr("counter").await.unwrap(), 1);
        assert_eq!(provider.incr("counter").await.unwrap(), 2);
        assert_eq!(provider.get("counter").await.unwrap(), Some("2".to_string()));
        assert!(provider.exists("counter").await.unwrap());
    }

    #[tokio::test]
    async fn test_counter_restarts_after_expiry() {
        let provider = make_provider();
        provider.incr("window").await.unwrap();
        provider.incr("window").await.unwrap();
        assert!(provider.expire("window", Duration::ZERO).await.unwrap());
        assert_eq!(provider.get("window").await.unwrap(), None);
        assert_eq!(provider.incr("window").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_nx() {
        let provider = make_provider();
        let first = provider
            .set_nx("nx_key", "val", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(first);
        let second = provider
            .set_nx("nx_key", "val2", Duration::from_secs(60))
            .await
            .unwrap();
        assert!(!second);
        assert_eq!(provider.get("nx_key").await.unwrap(), Some("val".to_string()));
    }

    #[tokio::test]
    async fn test_expire_missing_key() {
        let provider = make_provider();
        assert!(!provider.expire("missing", Duration::from_secs(5)).await.unwrap());
    }

    #[tokio::test]
    async fn test_health_check() {
        let provider = make_provider();
        assert!(provider.health_check().await.unwrap());
    }
}
