//! Configuration validation rules.
//!
//! Checks `AppConfig` values after they have been loaded from environment,
//! files, or defaults.

use crate::config::{AppConfig, CacheBackend};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 300_000;
const MAX_PAGE_BYTES: usize = 50 * 1024 * 1024;

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.to_string(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `port` is 0
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `user_agent` is empty
    /// - `source_base_url` is not an absolute http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(invalid("port", "must be non-zero"));
        }

        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(invalid(
                "timeout_ms",
                format!("must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}, got {}", self.timeout_ms),
            ));
        }

        if !(1..=MAX_PAGE_BYTES).contains(&self.max_bytes) {
            return Err(invalid("max_bytes", format!("must be between 1 and {MAX_PAGE_BYTES}, got {}", self.max_bytes)));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be blank"));
        }

        let base = url::Url::parse(&self.source_base_url).map_err(|e| invalid("source_base_url", e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") || !base.has_host() {
            return Err(invalid("source_base_url", format!("{base} is not an http(s) URL with a host")));
        }

        if self.cache_backend != CacheBackend::Sqlite && self.db_path != AppConfig::default().db_path {
            tracing::warn!(
                backend = ?self.cache_backend,
                "db_path is set but the sqlite cache backend is not selected; ignoring it"
            );
        }

        Ok(())
    }
}
