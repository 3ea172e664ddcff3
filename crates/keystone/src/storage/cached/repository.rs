use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use keystone_core::cache::{
    deserialize, list_args_key, serialize, specifications_key, Cache, CacheAction,
};
use keystone_core::specification::{ListArgs, Specification};
use keystone_core::storage::{EntityStream, Repository, Result};

#[cfg(feature = "sqlite")]
use crate::storage::sqlite::in_transaction;

#[cfg(not(feature = "sqlite"))]
fn in_transaction() -> bool {
    false
}

/// Read-through cache decorator over a [`Repository`].
///
/// # Type Parameters
///
/// * `R` - The wrapped repository, the source of truth
/// * `C` - The cache implementation
/// * `E` - Entity type, cached as JSON
/// * `F` - Filter family, serialized into cache keys
pub struct CachedRepository<R, C, E, F> {
    repository: Arc<R>,
    cache: Arc<C>,
    resource: String,
    ttl: Duration,
    _marker: PhantomData<fn() -> (E, F)>,
}

impl<R, C, E, F> CachedRepository<R, C, E, F>
where
    R: Repository<E, F>,
    C: Cache,
{
    /// Creates a new cached repository.
    ///
    /// # Arguments
    ///
    /// * `repository` - The underlying repository to cache
    /// * `cache` - The cache implementation
    /// * `resource` - Name that prefixes every cache key of this repository
    /// * `ttl` - Time-to-live for every cached value
    pub fn new(
        repository: Arc<R>,
        cache: Arc<C>,
        resource: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            resource: resource.into(),
            ttl,
            _marker: PhantomData,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Serves `action` from the cache under `key`, falling back to `fetch`.
    ///
    /// `fetch` runs when the key cannot be derived, the cache cannot be
    /// read, the entry is absent, or the entry does not decode. A successful
    /// fetch after a miss or a decode failure is written back.
    ///
    /// Inside an ambient transaction the cache is skipped both ways: reads
    /// must see the transaction's own writes, and uncommitted rows must not
    /// outlive a rollback in the cache.
    async fn read_through<T, Fut>(
        &self,
        action: CacheAction,
        key: keystone_core::cache::Result<String>,
        fetch: Fut,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        let resource = self.resource.as_str();

        if in_transaction() {
            tracing::debug!(
                resource,
                action = %action,
                "Inside a transaction, reading from repository"
            );
            return fetch.await;
        }

        let cache_key = match key {
            Ok(key) => key,
            Err(err) => {
                tracing::debug!(
                    resource,
                    action = %action,
                    error = %err,
                    "Cache key derivation failed"
                );
                return fetch.await;
            }
        };

        match self.cache.get(&cache_key).await {
            Ok(Some(bytes)) => match deserialize::<T>(&bytes) {
                Ok(value) => {
                    tracing::debug!(
                        resource,
                        action = %action,
                        cache_key = %cache_key,
                        cache_hit = true,
                        "Cache hit"
                    );
                    return Ok(value);
                }
                Err(err) => {
                    tracing::debug!(
                        resource,
                        action = %action,
                        cache_key = %cache_key,
                        cache_hit = false,
                        error = %err,
                        "Cached value did not decode"
                    );
                }
            },
            Ok(None) => {
                tracing::debug!(
                    resource,
                    action = %action,
                    cache_key = %cache_key,
                    cache_hit = false,
                    "Cache miss"
                );
            }
            Err(err) => {
                tracing::debug!(
                    resource,
                    action = %action,
                    cache_key = %cache_key,
                    error = %err,
                    "Cache unavailable, reading from repository"
                );
                return fetch.await;
            }
        }

        let value = fetch.await?;

        match serialize(&value) {
            Ok(bytes) => {
                if let Err(err) = self.cache.set(&cache_key, &bytes, Some(self.ttl)).await {
                    tracing::debug!(
                        resource,
                        action = %action,
                        cache_key = %cache_key,
                        error = %err,
                        "Failed to populate cache"
                    );
                }
            }
            Err(err) => {
                tracing::debug!(
                    resource,
                    action = %action,
                    cache_key = %cache_key,
                    error = %err,
                    "Failed to encode value for cache"
                );
            }
        }

        Ok(value)
    }
}

#[async_trait]
impl<R, C, E, F> Repository<E, F> for CachedRepository<R, C, E, F>
where
    R: Repository<E, F> + 'static,
    C: Cache + 'static,
    E: Serialize + DeserializeOwned + Send + Sync + 'static,
    F: Serialize + Send + Sync + 'static,
{
    async fn save(&self, entity: &E) -> Result<()> {
        self.repository.save(entity).await
    }

    async fn get(&self, specs: &[Specification<F>]) -> Result<Option<E>> {
        let key = specifications_key(&self.resource, CacheAction::Get, specs);
        self.read_through(CacheAction::Get, key, self.repository.get(specs))
            .await
    }

    async fn exist(&self, specs: &[Specification<F>]) -> Result<bool> {
        let key = specifications_key(&self.resource, CacheAction::Exist, specs);
        self.read_through(CacheAction::Exist, key, self.repository.exist(specs))
            .await
    }

    async fn delete(&self, specs: &[Specification<F>]) -> Result<()> {
        self.repository.delete(specs).await?;

        match specifications_key(&self.resource, CacheAction::Get, specs) {
            Ok(cache_key) => {
                if let Err(err) = self.cache.delete(&cache_key).await {
                    tracing::debug!(
                        resource = %self.resource,
                        cache_key = %cache_key,
                        error = %err,
                        "Failed to evict cached value"
                    );
                }
            }
            Err(err) => {
                tracing::debug!(
                    resource = %self.resource,
                    error = %err,
                    "Cache key derivation failed"
                );
            }
        }

        Ok(())
    }

    async fn list(&self, args: &ListArgs<F>) -> Result<Vec<E>> {
        let key = list_args_key(&self.resource, args);
        self.read_through(CacheAction::List, key, self.repository.list(args))
            .await
    }

    async fn each(&self, args: &ListArgs<F>) -> Result<EntityStream<E>> {
        self.repository.each(args).await
    }

    async fn size(&self, specs: &[Specification<F>]) -> Result<u32> {
        let key = specifications_key(&self.resource, CacheAction::Size, specs);
        self.read_through(CacheAction::Size, key, self.repository.size(specs))
            .await
    }
}
