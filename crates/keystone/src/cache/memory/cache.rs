//! In-memory cache implementation with LRU eviction.
//!
//! Provides a thread-safe in-memory cache with TTL support using
//! tokio synchronization primitives and LRU eviction policy.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;

use keystone_core::cache::{Cache, Result};

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    /// A TTL too large to represent as an `Instant` never expires.
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.and_then(|d| Instant::now().checked_add(d));
        Self { value, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Expired entries are dropped lazily, when a read finds them. Once
/// `max_entries` is reached the least recently used entry is evicted.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<Mutex<LruCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// Creates a new in-memory cache holding at most `max_entries` values.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.lock().await;

        match store.get(key) {
            Some(entry) if entry.is_expired() => {
                store.pop(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.lock().await;
        store.put(key.to_string(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut store = self.store.lock().await;
        store.pop(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(100);

        cache.set("key1", b"value1", None).await.unwrap();
        let result = cache.get("key1").await.unwrap();

        assert_eq!(result, Some(b"value1".to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let cache = MemoryCache::new(100);

        let result = cache.get("nonexistent").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let cache = MemoryCache::new(100);

        cache.set("key1", b"value1", None).await.unwrap();
        cache.set("key1", b"value2", None).await.unwrap();

        assert_eq!(cache.get("key1").await.unwrap(), Some(b"value2".to_vec()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new(100);

        cache.set("key1", b"value1", None).await.unwrap();
        cache.delete("key1").await.unwrap();

        assert!(cache.get("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let cache = MemoryCache::new(100);

        assert!(cache.delete("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = MemoryCache::new(100);

        cache
            .set("key1", b"value1", Some(Duration::from_millis(10)))
            .await
            .unwrap();
        assert!(cache.get("key1").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(cache.get("key1").await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryCache::new(2);

        cache.set("key1", b"value1", None).await.unwrap();
        cache.set("key2", b"value2", None).await.unwrap();
        // Touch key1 so key2 becomes least recently used.
        cache.get("key1").await.unwrap();
        cache.set("key3", b"value3", None).await.unwrap();

        assert!(cache.get("key1").await.unwrap().is_some());
        assert!(cache.get("key2").await.unwrap().is_none());
        assert!(cache.get("key3").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_capacity_holds_one_entry() {
        let cache = MemoryCache::new(0);

        cache.set("key1", b"value1", None).await.unwrap();

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_never_expires() {
        let cache = MemoryCache::new(100);

        cache
            .set("key1", b"value1", Some(Duration::from_secs(u64::MAX)))
            .await
            .unwrap();

        assert_eq!(cache.get("key1").await.unwrap(), Some(b"value1".to_vec()));
    }
}
