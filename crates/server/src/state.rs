//! Application state for the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use contribs_client::{CalendarClient, FetchConfig};
use contribs_core::{AppConfig, CacheBackend, CacheDb, Error, MemoryCache, NoopCache, ResultCache};

use crate::service::ContributionsService;

/// How often expired rows are deleted from the SQLite cache.
const PURGE_INTERVAL: Duration = Duration::from_secs(600);

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ContributionsService>,
}

impl AppState {
    pub fn new(service: ContributionsService) -> Self {
        Self { service: Arc::new(service) }
    }

    /// Build the calendar client and the configured cache backend.
    ///
    /// Must be called inside a tokio runtime when the SQLite backend is
    /// selected, since it spawns the purge task.
    pub async fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let client = CalendarClient::new(FetchConfig::try_from(config)?)?;

        let cache: Arc<dyn ResultCache> = match config.cache_backend {
            CacheBackend::Memory => Arc::new(MemoryCache::new()),
            CacheBackend::Disabled => Arc::new(NoopCache),
            CacheBackend::Sqlite => {
                let db = CacheDb::open(&config.db_path).await?;
                spawn_purge(db.clone());
                Arc::new(db)
            }
        };

        tracing::info!(
            source = %config.source_base_url,
            cache = ?config.cache_backend,
            "contributions service ready"
        );

        Ok(Self::new(ContributionsService::new(Arc::new(client), cache)))
    }
}

fn spawn_purge(db: CacheDb) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match db.purge_expired().await {
                Ok(0) => {}
                Ok(count) => tracing::debug!(count, "purged expired cache entries"),
                Err(e) => tracing::warn!(error = %e, "cache purge failed"),
            }
        }
    });
}
