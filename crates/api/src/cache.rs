//! Best-effort read-through caching.
//!
//! [`cache_aside`] is the only way handlers touch the cache: look up, fall
//! back to the loader on a miss or any cache failure, then store the loaded
//! value if possible. The cache never takes part in database transactions and
//! a broken cache only costs extra loads.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use coursework_core::types::DbId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Cache entry could not be decoded: {0}")]
    Decode(String),
}

/// Key/value store with per-entry expiry. Values are serialized JSON.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// In-process cache. Expired entries are dropped when read and swept on
/// every write, so keys that are never read again do not pile up.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, expires_at)) if *expires_at > Instant::now() => {
                    return Ok(Some(value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value, now + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

pub fn example_key(example_id: DbId) -> String {
    format!("example:{example_id}")
}

pub fn example_version_key(example_id: DbId, tag: &str) -> String {
    format!("example:{example_id}:version:{tag}")
}

/// Return the cached value for `key`, or run `load` and cache its result.
///
/// Errors from `load` are returned unchanged and never cached.
pub async fn cache_aside<T, E, F, Fut>(
    cache: &dyn Cache,
    key: &str,
    ttl: Duration,
    load: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match cache.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                tracing::debug!(key, "Cache hit");
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!(key, error = %CacheError::Decode(e.to_string()), "Discarding cache entry");
            }
        },
        Ok(None) => tracing::debug!(key, "Cache miss"),
        Err(e) => tracing::warn!(key, error = %e, "Cache lookup failed"),
    }

    let value = load().await?;

    match serde_json::to_string(&value) {
        Ok(raw) => {
            if let Err(e) = cache.set(key, raw, ttl).await {
                tracing::warn!(key, error = %e, "Cache store failed");
            }
        }
        Err(e) => tracing::warn!(key, error = %e, "Value not cacheable"),
    }
    Ok(value)
}

/// Drop `keys` from the cache, logging failures.
pub async fn invalidate(cache: &dyn Cache, keys: &[String]) {
    for key in keys {
        if let Err(e) = cache.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Cache invalidation failed");
        }
    }
}
