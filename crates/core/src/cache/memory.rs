//! In-process cache backends.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::ResultCache;
use crate::Error;
use crate::model::AggregatedResponse;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: AggregatedResponse,
    expires_at: Instant,
}

/// Process-wide in-memory cache.
///
/// Expiry uses tokio's monotonic clock. Expired entries stay in the map
/// until the key is written again.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<AggregatedResponse>, Error> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.value.clone()))
    }

    async fn put(&self, key: &str, value: &AggregatedResponse, ttl: Duration) -> Result<(), Error> {
        let entry = CacheEntry { value: value.clone(), expires_at: Instant::now() + ttl };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }
}

/// Cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

#[async_trait]
impl ResultCache for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<AggregatedResponse>, Error> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: &AggregatedResponse, _ttl: Duration) -> Result<(), Error> {
        Ok(())
    }
}
