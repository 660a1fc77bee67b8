//! Museum response cache
//!
//! Provides:
//! - A [`ResponseCache`] trait used by the museum HTTP client
//! - The `api_cache` table backend (default)
//! - A Redis backend for deployments that already run one
//! - An in-process map and a no-op cache

use crate::config::{CacheBackend, CacheConfig};
use crate::db::Repository;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// TTL-keyed store for raw museum API responses
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Fresh value for `key`, `None` when missing or expired
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` for `ttl`
    async fn put(&self, key: &str, value: &Value, ttl: Duration) -> Result<()>;

    /// Label used in metrics
    fn name(&self) -> &'static str;

    /// Connectivity check for readiness probes
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Build the cache selected in configuration
pub async fn create_cache(config: &CacheConfig, repo: &Repository) -> Result<Arc<dyn ResponseCache>> {
    let cache: Arc<dyn ResponseCache> = match config.backend {
        CacheBackend::Database => Arc::new(DbCache::new(repo.clone())),
        CacheBackend::Redis => Arc::new(RedisCache::new(&config.redis_url).await?),
        CacheBackend::Memory => Arc::new(MemoryCache::default()),
        CacheBackend::None => Arc::new(NoCache),
    };

    info!(backend = cache.name(), ttl_hours = config.ttl_hours, "Response cache ready");
    Ok(cache)
}

/// `api_cache` table; expired rows are removed when read
pub struct DbCache {
    repo: Repository,
}

impl DbCache {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ResponseCache for DbCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.repo.get_cached_response(key).await
    }

    async fn put(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
        self.repo.put_cached_response(key, value.clone(), ttl).await
    }

    fn name(&self) -> &'static str {
        "database"
    }

    async fn ping(&self) -> Result<()> {
        self.repo.ping().await
    }
}

/// Redis cache client
pub struct RedisCache {
    connection: RwLock<MultiplexedConnection>,
}

impl RedisCache {
    /// Connect to Redis
    pub async fn new(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(|e| AppError::CacheError {
            message: format!("Failed to create Redis client: {}", e),
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::CacheError {
                message: format!("Failed to connect to Redis: {}", e),
            })?;

        Ok(Self {
            connection: RwLock::new(connection),
        })
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut conn = self.connection.write().await;

        let value: Option<String> = conn.get(key).await.map_err(|e| AppError::CacheError {
            message: format!("Failed to get key '{}': {}", key, e),
        })?;

        match value {
            Some(json) => {
                let parsed = serde_json::from_str(&json).map_err(|e| AppError::CacheError {
                    message: format!("Failed to parse cached value: {}", e),
                })?;
                debug!(key = %key, "Cache hit");
                Ok(Some(parsed))
            }
            None => {
                debug!(key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
        let json = serde_json::to_string(value)?;
        let ttl_secs = ttl.as_secs().max(1);

        let mut conn = self.connection.write().await;
        conn.set_ex::<_, _, ()>(key, &json, ttl_secs)
            .await
            .map_err(|e| AppError::CacheError {
                message: format!("Failed to set key '{}': {}", key, e),
            })?;

        debug!(key = %key, ttl_secs, "Cache set");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection.write().await;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map_err(|e| AppError::CacheError {
                message: format!("Redis ping failed: {}", e),
            })?;
        Ok(())
    }
}

/// In-process cache
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (Value, Instant)>>,
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(_, expires)| *expires > Instant::now())
            .map(|(value, _)| value.clone()))
    }

    async fn put(&self, key: &str, value: &Value, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, (_, expires)| *expires > now);
        entries.insert(key.to_string(), (value.clone(), now + ttl));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Cache that never stores anything
pub struct NoCache;

#[async_trait]
impl ResponseCache for NoCache {
    async fn get(&self, _key: &str) -> Result<Option<Value>> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: &Value, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Cache key builder helpers
pub mod keys {
    use sha2::{Digest, Sha256};

    /// Key for a museum API response: `{prefix}:{museum}:{sha256(url + sorted params)}`
    pub fn museum_response(prefix: &str, museum: &str, url: &str, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort();

        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        for (name, value) in sorted {
            hasher.update(b"\x00");
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
        }

        format!("{}:{}:{}", prefix, museum, hex::encode(hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_ignores_param_order() {
        let a = keys::museum_response(
            "artstuff",
            "aic",
            "https://api.artic.edu/api/v1/artworks/search",
            &[("q", "monet".into()), ("page", "2".into())],
        );
        let b = keys::museum_response(
            "artstuff",
            "aic",
            "https://api.artic.edu/api/v1/artworks/search",
            &[("page", "2".into()), ("q", "monet".into())],
        );
        let c = keys::museum_response(
            "artstuff",
            "aic",
            "https://api.artic.edu/api/v1/artworks/search",
            &[("page", "3".into()), ("q", "monet".into())],
        );

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("artstuff:aic:"));
    }

    #[tokio::test]
    async fn test_memory_cache_expiry() {
        let cache = MemoryCache::default();
        cache
            .put("fresh", &json!({"a": 1}), Duration::from_secs(60))
            .await
            .unwrap();
        cache.put("stale", &json!(2), Duration::ZERO).await.unwrap();

        assert_eq!(cache.get("fresh").await.unwrap(), Some(json!({"a": 1})));
        assert_eq!(cache.get("stale").await.unwrap(), None);
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_cache_never_hits() {
        let cache = NoCache;
        cache.put("k", &json!(1), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
