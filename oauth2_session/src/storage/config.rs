//! Store selection and connection

use std::{env, path::Path, str::FromStr, sync::Arc, sync::LazyLock};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use super::cache_store::{CacheStore, InMemoryCacheStore, RedisCacheStore};
use super::data_store::{DataStore, PostgresDataStore, SqliteDataStore};
use super::errors::StorageError;

/// Table prefix from environment variable
pub(crate) static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_TABLE_PREFIX").unwrap_or_default());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStoreKind {
    Memory,
    Redis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataStoreKind {
    Sqlite,
    Postgres,
}

impl FromStr for CacheStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            t => Err(format!(
                "Unsupported cache store type: {t}. Supported types are 'memory' and 'redis'"
            )),
        }
    }
}

impl FromStr for DataStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" => Ok(Self::Postgres),
            t => Err(format!(
                "Unsupported store type: {t}. Supported types are 'sqlite' and 'postgres'"
            )),
        }
    }
}

/// Where sessions and accounts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub cache_kind: CacheStoreKind,
    pub cache_url: String,
    pub data_kind: DataStoreKind,
    pub data_url: String,
}

impl StoreConfig {
    /// Memory sessions and a private in-memory SQLite database.
    pub fn in_memory() -> Self {
        Self {
            cache_kind: CacheStoreKind::Memory,
            cache_url: String::new(),
            data_kind: DataStoreKind::Sqlite,
            data_url: "sqlite::memory:".to_string(),
        }
    }
}

pub(crate) async fn connect_cache_store(
    config: &StoreConfig,
) -> Result<Box<dyn CacheStore>, StorageError> {
    tracing::info!("Initializing cache store with type: {:?}", config.cache_kind);

    let store: Box<dyn CacheStore> = match config.cache_kind {
        CacheStoreKind::Memory => Box::new(InMemoryCacheStore::new()),
        CacheStoreKind::Redis => {
            let store = RedisCacheStore::open(&config.cache_url)?;
            store.init().await.inspect_err(|e| {
                tracing::error!("Failed to connect to Redis: {}", e);
            })?;
            Box::new(store)
        }
    };

    Ok(store)
}

pub(crate) fn connect_data_store(config: &StoreConfig) -> Result<Arc<dyn DataStore>, StorageError> {
    tracing::info!("Initializing data store with type: {:?}", config.data_kind);

    let store: Arc<dyn DataStore> = match config.data_kind {
        DataStoreKind::Sqlite => {
            let opts = SqliteConnectOptions::from_str(&config.data_url)
                .map_err(|e| StorageError::Storage(format!("Invalid SQLite URL: {e}")))?
                .create_if_missing(true);

            let pool = if is_sqlite_memory_url(&config.data_url) {
                // An in-memory database vanishes with its last connection
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_lazy_with(opts)
            } else {
                ensure_parent_dir(opts.get_filename())?;
                sqlx::SqlitePool::connect_lazy_with(opts)
            };

            Arc::new(SqliteDataStore { pool })
        }
        DataStoreKind::Postgres => Arc::new(PostgresDataStore {
            pool: sqlx::PgPool::connect_lazy(&config.data_url)?,
        }),
    };

    Ok(store)
}

fn is_sqlite_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn ensure_parent_dir(path: &Path) -> Result<(), StorageError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| StorageError::Storage(format!("Failed to create {parent:?}: {e}"))),
        _ => Ok(()),
    }
}
