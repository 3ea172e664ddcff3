use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use futures_util::TryStreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keystone::config::Config;
use keystone::models::{users_schema, User, UserFilter, UserMapping};
use keystone::storage::CachedRepository;
use keystone_core::cache::Cache;
use keystone_core::pagination::{PaginationParams, PaginationResult};
use keystone_core::specification::{ListArgs, Specification};
use keystone_core::storage::{ErrorBody, Repository};

/// Keystone - repositories with transactional routing and read-through caching
#[derive(Parser, Debug)]
#[command(name = "keystone")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Storage backend to run against
    #[arg(long, value_enum, default_value = "sqlite")]
    backend: Backend,

    /// Path to the SQLite database file
    #[arg(long, env = "SQLITE_PATH")]
    sqlite_path: Option<String>,

    /// Cache TTL in seconds
    #[arg(long, env = "CACHE_TTL_SECONDS")]
    cache_ttl: Option<u64>,

    /// Sort order, e.g. "-age,name"
    #[arg(long, default_value = "")]
    sort: String,

    /// Page to list (1-indexed)
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Users per page
    #[arg(long, default_value_t = 10)]
    page_size: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    Sqlite,
    Inmemory,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keystone=debug,keystone_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(path) = cli.sqlite_path.clone() {
        config.sqlite_path = path;
    }
    if let Some(ttl) = cli.cache_ttl {
        config.cache_ttl_seconds = ttl;
    }

    let cache = open_cache(&config).await?;

    match cli.backend {
        Backend::Sqlite => run_sqlite(&cli, &config, cache).await,
        Backend::Inmemory => run_inmemory(&cli, &config, cache).await,
    }
}

#[cfg(feature = "redis")]
async fn open_cache(config: &Config) -> Result<Arc<keystone::cache::RedisCache>> {
    tracing::info!(url = %config.redis_url, "Using Redis cache");
    Ok(Arc::new(
        keystone::cache::RedisCache::new(&config.redis_url).await?,
    ))
}

#[cfg(not(feature = "redis"))]
async fn open_cache(config: &Config) -> Result<Arc<keystone::cache::MemoryCache>> {
    tracing::info!(max_entries = config.cache_max_entries, "Using in-memory cache");
    Ok(Arc::new(keystone::cache::MemoryCache::new(
        config.cache_max_entries,
    )))
}

#[cfg(feature = "sqlite")]
async fn run_sqlite<C: Cache + 'static>(
    cli: &Cli,
    config: &Config,
    cache: Arc<C>,
) -> Result<()> {
    use keystone::storage::sqlite::create_table_sql;
    use keystone::storage::{SqliteDatabase, SqliteRepository, SqliteTransactionManager};
    use keystone_core::storage::{RepositoryError, TransactionManager};

    let database = SqliteDatabase::open(&config.sqlite_path).await?;
    database.execute_batch(create_table_sql(&users_schema())).await?;

    let users = Arc::new(SqliteRepository::new(&database, users_schema(), UserMapping).await?);
    let cached: CachedRepository<_, _, User, UserFilter> =
        CachedRepository::new(users.clone(), cache, "users", config.cache_ttl());

    let seed = seed_users();
    let transactions = SqliteTransactionManager::new(database.clone());
    let writer = users.clone();
    let batch = seed.clone();
    transactions
        .execute(|| async move {
            for user in &batch {
                writer.save(user).await?;
            }
            Ok::<_, RepositoryError>(())
        })
        .await?;
    tracing::info!(count = seed.len(), "Seeded users in one transaction");

    let outcome = smoke(cli, &cached, &seed).await;
    database.close().await?;
    outcome
}

#[cfg(not(feature = "sqlite"))]
async fn run_sqlite<C: Cache + 'static>(
    _cli: &Cli,
    _config: &Config,
    _cache: Arc<C>,
) -> Result<()> {
    anyhow::bail!("keystone was built without the `sqlite` feature")
}

#[cfg(feature = "inmemory")]
async fn run_inmemory<C: Cache + 'static>(
    cli: &Cli,
    config: &Config,
    cache: Arc<C>,
) -> Result<()> {
    use keystone::storage::{InMemoryDatabase, InMemoryRepository};

    let database = InMemoryDatabase::new();
    database.create_table(&users_schema()).await;

    let users = Arc::new(InMemoryRepository::new(&database, users_schema(), UserMapping).await?);
    let cached: CachedRepository<_, _, User, UserFilter> =
        CachedRepository::new(users.clone(), cache, "users", config.cache_ttl());

    let seed = seed_users();
    for user in &seed {
        users.save(user).await?;
    }

    smoke(cli, &cached, &seed).await
}

#[cfg(not(feature = "inmemory"))]
async fn run_inmemory<C: Cache + 'static>(
    _cli: &Cli,
    _config: &Config,
    _cache: Arc<C>,
) -> Result<()> {
    anyhow::bail!("keystone was built without the `inmemory` feature")
}

fn seed_users() -> Vec<User> {
    vec![
        User::new("Ada Lovelace", "ada@example.com").with_age(36),
        User::new("Grace Hopper", "grace@example.com").with_age(85),
        User::new("Alan Turing", "alan@example.com").with_age(41),
        User::new("Edsger Dijkstra", "edsger@example.com"),
    ]
}

/// Reads through the cache twice, then pages through the table.
async fn smoke(
    cli: &Cli,
    users: &dyn Repository<User, UserFilter>,
    seed: &[User],
) -> Result<()> {
    let specs = vec![Specification::filter(UserFilter::Email(seed[0].email.clone()))];
    for _ in 0..2 {
        let found = users.get(&specs).await?;
        tracing::info!(found = found.is_some(), "Looked up user by email");
    }

    let sort = match UserMapping::sort_params().parse(&cli.sort) {
        Ok(sort) => sort,
        Err(err) => {
            println!("{}", serde_json::to_string(&ErrorBody::from(&err))?);
            return Ok(());
        }
    };

    let params = PaginationParams::new(cli.page, cli.page_size);
    let mut args = ListArgs::new().paginate(&params);
    for arg in sort {
        args = args.sort_by(arg);
    }

    let page = users.list(&args).await?;
    let size = users.size(&[]).await?;
    let meta = PaginationResult::new(params, size);

    let streamed: Vec<User> = users.each(&args).await?.try_collect().await?;
    tracing::debug!(listed = page.len(), streamed = streamed.len(), "Listed users");

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "pagination": meta,
            "users": page,
        }))?
    );
    Ok(())
}
