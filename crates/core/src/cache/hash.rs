//! Cache key generation.

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::query::ResolvedQuery;

/// Compute the cache key for a username and resolved query.
///
/// The username is lowercased because the source matches it
/// case-insensitively. Years are already normalized by resolution, so
/// equivalent selectors hash identically.
pub fn compute_cache_key(username: &str, query: &ResolvedQuery) -> String {
    let canonical = json!({
        "username": username.trim().to_lowercase(),
        "years": query.years,
        "fetch_all": query.fetch_all,
        "last_year": query.last_year,
        "format": query.format,
    });

    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
