//! Cached repository decorator.
//!
//! [`CachedRepository`] wraps any repository with read-through caching:
//!
//! - **Reads** (`get`, `exist`, `list`, `size`): check the cache, on miss
//!   fetch from the wrapped repository and populate the cache
//! - **Writes**: `save` passes through; `delete` passes through, then
//!   evicts the `GET` entry for the same specifications
//! - **Iteration**: `each` always reads from the wrapped repository
//! - **Transactions**: reads inside an ambient transaction bypass the cache
//!
//! Cache faults never surface to callers. A missing, unreachable or corrupt
//! cache degrades to a direct read of the wrapped repository.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let database = SqliteDatabase::open("keystone.db").await?;
//! let users = SqliteRepository::new(&database, users_schema(), UserMapping).await?;
//! let cache = Arc::new(MemoryCache::new(10_000));
//!
//! let cached = CachedRepository::new(Arc::new(users), cache, "users", Duration::from_secs(300));
//! ```

mod repository;

pub use repository::CachedRepository;

#[cfg(all(test, feature = "sqlite", feature = "memory"))]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use keystone_core::cache::{deserialize, specifications_key, Cache, CacheAction};
    use keystone_core::specification::{ListArgs, SortArg, Specification};
    use keystone_core::storage::{Repository, RepositoryError, TransactionManager};

    use super::*;
    use crate::cache::MemoryCache;
    use crate::models::{users_schema, User, UserFilter, UserMapping};
    use crate::storage::sqlite::{
        create_table_sql, SqliteDatabase, SqliteRepository, SqliteTransactionManager,
    };

    type Users = SqliteRepository<UserMapping>;

    struct Fixture {
        database: SqliteDatabase,
        store: Arc<Users>,
        cache: Arc<MemoryCache>,
        cached: CachedRepository<Users, MemoryCache, User, UserFilter>,
    }

    async fn fixture(ttl: Duration) -> Fixture {
        let db = SqliteDatabase::open_in_memory().await.unwrap();
        db.execute_batch(create_table_sql(&users_schema()))
            .await
            .unwrap();
        let store = Arc::new(
            SqliteRepository::new(&db, users_schema(), UserMapping)
                .await
                .unwrap(),
        );
        let cache = Arc::new(MemoryCache::new(100));
        let cached = CachedRepository::new(store.clone(), cache.clone(), "users", ttl);
        Fixture {
            database: db,
            store,
            cache,
            cached,
        }
    }

    fn by_id(user: &User) -> Vec<Specification<UserFilter>> {
        vec![Specification::filter(UserFilter::Id(user.id))]
    }

    #[tokio::test]
    async fn test_second_get_is_served_from_cache() {
        let f = fixture(Duration::from_secs(60)).await;
        let ada = User::new("Ada", "ada@example.com");
        f.store.save(&ada).await.unwrap();

        assert_eq!(f.cached.get(&by_id(&ada)).await.unwrap(), Some(ada.clone()));

        // Removed behind the cache's back: the cached copy still answers.
        f.store.delete(&by_id(&ada)).await.unwrap();

        assert_eq!(f.cached.get(&by_id(&ada)).await.unwrap(), Some(ada));
        assert_eq!(f.cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_through_cache_evicts_get_entry() {
        let f = fixture(Duration::from_secs(60)).await;
        let ada = User::new("Ada", "ada@example.com");
        f.store.save(&ada).await.unwrap();
        f.cached.get(&by_id(&ada)).await.unwrap();

        f.cached.delete(&by_id(&ada)).await.unwrap();

        assert_eq!(f.cached.get(&by_id(&ada)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_replaced_by_fresh_value() {
        let f = fixture(Duration::from_secs(60)).await;
        let ada = User::new("Ada", "ada@example.com");
        f.store.save(&ada).await.unwrap();
        let key = specifications_key("users", CacheAction::Get, &by_id(&ada)).unwrap();
        f.cache.set(&key, b"{not json", None).await.unwrap();

        assert_eq!(f.cached.get(&by_id(&ada)).await.unwrap(), Some(ada.clone()));

        let bytes = f.cache.get(&key).await.unwrap().unwrap();
        assert_eq!(deserialize::<Option<User>>(&bytes).unwrap(), Some(ada));
    }

    #[tokio::test]
    async fn test_saved_changes_show_after_ttl() {
        let f = fixture(Duration::from_millis(50)).await;
        let mut ada = User::new("Ada", "ada@example.com");
        f.store.save(&ada).await.unwrap();
        f.cached.get(&by_id(&ada)).await.unwrap();

        ada.name = "Ada Lovelace".to_string();
        f.cached.save(&ada).await.unwrap();

        let stale = f.cached.get(&by_id(&ada)).await.unwrap().unwrap();
        assert_eq!(stale.name, "Ada");

        tokio::time::sleep(Duration::from_millis(100)).await;

        let fresh = f.cached.get(&by_id(&ada)).await.unwrap().unwrap();
        assert_eq!(fresh.name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_list_pages_are_cached_separately() {
        let f = fixture(Duration::from_secs(60)).await;
        for (name, email) in [("Ada", "ada@example.com"), ("Grace", "grace@example.com")] {
            f.store.save(&User::new(name, email)).await.unwrap();
        }
        let first = ListArgs::new().sort_by(SortArg::asc("name")).limit(1);
        let second = first.clone().offset(1);

        let page1 = f.cached.list(&first).await.unwrap();
        let page2 = f.cached.list(&second).await.unwrap();

        assert_eq!(page1[0].name, "Ada");
        assert_eq!(page2[0].name, "Grace");
        assert_eq!(f.cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_reads_agree_with_store() {
        let f = fixture(Duration::from_secs(60)).await;
        let ada = User::new("Ada", "ada@example.com").with_age(36);
        f.store.save(&ada).await.unwrap();
        let adults = vec![Specification::filter(UserFilter::MinAge(18))];

        assert_eq!(
            f.cached.exist(&adults).await.unwrap(),
            f.store.exist(&adults).await.unwrap()
        );
        assert_eq!(
            f.cached.size(&adults).await.unwrap(),
            f.store.size(&adults).await.unwrap()
        );
        assert_eq!(
            f.cached.list(&ListArgs::from_specs(adults.clone())).await.unwrap(),
            vec![ada]
        );
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_still_reads_through() {
        let f = fixture(Duration::from_secs(u64::MAX)).await;
        let ada = User::new("Ada", "ada@example.com");
        f.store.save(&ada).await.unwrap();

        assert_eq!(f.cached.get(&by_id(&ada)).await.unwrap(), Some(ada.clone()));
        assert_eq!(f.cached.get(&by_id(&ada)).await.unwrap(), Some(ada));
        assert_eq!(f.cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_rolled_back_reads_leave_cache_untouched() {
        let f = fixture(Duration::from_secs(60)).await;
        let manager = SqliteTransactionManager::new(f.database.clone());
        let ada = User::new("Ada", "ada@example.com");

        let seen = Arc::new(tokio::sync::Mutex::new(None));
        let result = manager
            .execute(|| async {
                f.cached.save(&ada).await?;
                *seen.lock().await = f.cached.get(&by_id(&ada)).await?;
                Err::<(), _>(RepositoryError::InvalidData("abort".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(*seen.lock().await, Some(ada.clone()));
        assert!(f.cache.is_empty().await);
        assert_eq!(f.cached.get(&by_id(&ada)).await.unwrap(), None);
    }
}
