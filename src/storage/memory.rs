//! In-memory link store backed by `DashMap`
//!
//! Used by tests and by instances started with `database_url = "memory://"`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

use super::{Link, LinkInfo, LinkStore, StoreError, StoreResult};

#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, Link>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains(&self, short: &str) -> bool {
        self.inner.contains_key(short)
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn create_link(&self, link: &Link) -> StoreResult<()> {
        // entry() 持有分片写锁，检查和插入是原子的
        match self.inner.entry(link.short.clone()) {
            Entry::Occupied(_) => Err(StoreError::UniqueViolation(link.short.clone())),
            Entry::Vacant(slot) => {
                slot.insert(link.clone());
                Ok(())
            }
        }
    }

    async fn get_url_by_short(&self, short: &str) -> StoreResult<Option<String>> {
        Ok(self.inner.get(short).map(|link| link.url.clone()))
    }

    async fn get_hash_by_short(&self, short: &str) -> StoreResult<Option<String>> {
        Ok(self.inner.get(short).map(|link| link.password_hash.clone()))
    }

    async fn get_link_info(&self, short: &str) -> StoreResult<Option<LinkInfo>> {
        Ok(self.inner.get(short).map(|link| link.info()))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let expired: Vec<String> = self
            .inner
            .iter()
            .filter(|entry| entry.value().is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect();

        let mut deleted = 0;
        for short in expired {
            if self
                .inner
                .remove_if(&short, |_, link| link.is_expired_at(now))
                .is_some()
            {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn delete_by_short(&self, short: &str) -> StoreResult<bool> {
        Ok(self.inner.remove(short).is_some())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.inner.len() as u64)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
