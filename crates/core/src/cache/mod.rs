//! Short-lived result cache in front of the contributions pipeline.
//!
//! The pipeline talks to the [`ResultCache`] capability only, so the backend
//! can be swapped:
//!
//! - [`MemoryCache`]: process-wide map with monotonic-clock expiry
//! - [`NoopCache`]: stores nothing
//! - [`CacheDb`]: SQLite store via tokio-rusqlite, survives restarts
//!
//! Entries expire after [`CACHE_TTL`]. Expired entries read as absent and
//! are never swept proactively.

pub mod connection;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod results;

use std::time::Duration;

use async_trait::async_trait;

pub use crate::Error;

pub use connection::CacheDb;
pub use hash::compute_cache_key;
pub use memory::{MemoryCache, NoopCache};

use crate::model::AggregatedResponse;

/// Lifetime of a cached response.
pub const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Key-value store for aggregated responses.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Look up a live entry. Expired entries are reported as a miss.
    async fn get(&self, key: &str) -> Result<Option<AggregatedResponse>, Error>;

    /// Store a value, replacing any previous entry for the key.
    async fn put(&self, key: &str, value: &AggregatedResponse, ttl: Duration) -> Result<(), Error>;
}
