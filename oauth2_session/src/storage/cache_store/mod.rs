mod memory;
mod redis;
mod types;

pub(crate) use types::{CacheStore, InMemoryCacheStore, RedisCacheStore};
