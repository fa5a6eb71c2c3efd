mod types;

pub use types::DataStore;
pub(crate) use types::{PostgresDataStore, SqliteDataStore};
