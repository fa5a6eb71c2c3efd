mod cache_store;
mod config;
mod data_store;
mod errors;
mod schema_validation;
mod types;

pub(crate) use cache_store::CacheStore;
#[cfg(test)]
pub(crate) use cache_store::InMemoryCacheStore;
pub(crate) use config::{DB_TABLE_PREFIX, connect_cache_store, connect_data_store};
pub use config::{CacheStoreKind, DataStoreKind, StoreConfig};
pub use data_store::DataStore;
pub(crate) use errors::StorageError;
pub(crate) use schema_validation::{validate_postgres_table_schema, validate_sqlite_table_schema};
pub(crate) use types::CacheData;
