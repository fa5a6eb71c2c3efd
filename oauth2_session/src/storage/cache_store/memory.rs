use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, InMemoryCacheStore, MemoryEntry};

const CACHE_PREFIX: &str = "cache";

impl InMemoryCacheStore {
    pub(crate) fn new() -> Self {
        tracing::info!("Creating new in-memory generic cache store");
        Self {
            entry: HashMap::new(),
        }
    }

    fn make_key(prefix: &str, key: &str) -> String {
        format!("{CACHE_PREFIX}:{prefix}:{key}")
    }

    fn is_live(&self, key: &str, now: Instant) -> bool {
        self.entry
            .get(key)
            .is_some_and(|entry| entry.expires_at > now)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn put_if_not_exists(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<bool, StorageError> {
        let key = Self::make_key(prefix, key);
        let now = Instant::now();
        if self.is_live(&key, now) {
            return Ok(false);
        }
        let expires_at = now
            .checked_add(Duration::from_secs(ttl as u64))
            .ok_or_else(|| StorageError::Storage(format!("TTL out of range: {ttl}")))?;
        self.entry.insert(key, MemoryEntry { data: value, expires_at });
        Ok(true)
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let key = Self::make_key(prefix, key);
        let now = Instant::now();
        Ok(self
            .entry
            .get(&key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.data.clone()))
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        let key = Self::make_key(prefix, key);
        self.entry.remove(&key);
        Ok(())
    }

    async fn purge_expired(&mut self) -> Result<usize, StorageError> {
        let now = Instant::now();
        let before = self.entry.len();
        self.entry.retain(|_, entry| entry.expires_at > now);
        Ok(before - self.entry.len())
    }
}
