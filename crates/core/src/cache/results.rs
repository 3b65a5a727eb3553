//! Aggregated response storage in SQLite.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio_rusqlite::{params, rusqlite};

use super::ResultCache;
use super::connection::CacheDb;
use crate::Error;
use crate::model::AggregatedResponse;

fn timestamp(at: chrono::DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl CacheDb {
    /// Get the stored JSON for a key if it has not expired.
    pub async fn get_response_json(&self, key_hash: &str) -> Result<Option<String>, Error> {
        let key_hash = key_hash.to_string();
        let now = timestamp(Utc::now());
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT response_json FROM contributions_cache WHERE key_hash = ?1 AND expires_at > ?2",
                    params![key_hash, now],
                    |row| row.get(0),
                );

                match result {
                    Ok(json) => Ok(Some(json)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace the stored JSON for a key.
    pub async fn put_response_json(&self, key_hash: &str, response_json: &str, ttl: Duration) -> Result<(), Error> {
        let key_hash = key_hash.to_string();
        let response_json = response_json.to_string();

        let fetched = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| fetched.checked_add_signed(ttl))
            .map(timestamp)
            .ok_or_else(|| Error::Config(format!("cache ttl {ttl:?} is out of range")))?;
        let fetched_at = timestamp(fetched);

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO contributions_cache (key_hash, response_json, fetched_at, expires_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(key_hash) DO UPDATE SET
                        response_json = excluded.response_json,
                        fetched_at = excluded.fetched_at,
                        expires_at = excluded.expires_at",
                    params![key_hash, response_json, fetched_at, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete expired entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired(&self) -> Result<u64, Error> {
        let now = timestamp(Utc::now());
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM contributions_cache WHERE expires_at <= ?1", params![now])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl ResultCache for CacheDb {
    async fn get(&self, key: &str) -> Result<Option<AggregatedResponse>, Error> {
        match self.get_response_json(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &AggregatedResponse, ttl: Duration) -> Result<(), Error> {
        let json = serde_json::to_string(value)?;
        self.put_response_json(key, &json, ttl).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CACHE_TTL;
    use crate::model::{ContributionLevel, DayRecord, YearResult};

    fn response() -> AggregatedResponse {
        let days = vec![DayRecord {
            date: chrono::NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            count: 3,
            level: ContributionLevel::FirstQuartile,
        }];
        let mut response = AggregatedResponse::default();
        response.years.insert(2023, YearResult::new(2023, days));
        response.total = 3;
        response
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(ResultCache::get(&db, "key").await.unwrap().is_none());

        ResultCache::put(&db, "key", &response(), CACHE_TTL).await.unwrap();

        let cached = ResultCache::get(&db, "key").await.unwrap();
        assert_eq!(cached, Some(response()));
    }

    #[tokio::test]
    async fn test_upsert() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_response_json("key", r#"{"old":1}"#, CACHE_TTL).await.unwrap();
        db.put_response_json("key", r#"{"new":2}"#, CACHE_TTL).await.unwrap();

        let json = db.get_response_json("key").await.unwrap().unwrap();
        assert_eq!(json, r#"{"new":2}"#);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let db = CacheDb::open_in_memory().await.unwrap();
        ResultCache::put(&db, "stale", &response(), Duration::ZERO).await.unwrap();
        assert!(ResultCache::get(&db, "stale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_response_json("stale", "{}", Duration::ZERO).await.unwrap();
        db.put_response_json("fresh", "{}", CACHE_TTL).await.unwrap();

        let deleted = db.purge_expired().await.unwrap();
        assert_eq!(deleted, 1);
        assert!(db.get_response_json("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unrepresentable_ttl_is_config_error() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.put_response_json("key", "{}", Duration::MAX).await;

        assert!(matches!(result, Err(Error::Config(_))));
        assert!(!result.unwrap_err().is_client_fault());
    }

    #[tokio::test]
    async fn test_corrupt_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_response_json("bad", "not json", CACHE_TTL).await.unwrap();

        let result = ResultCache::get(&db, "bad").await;
        assert!(matches!(result, Err(Error::CorruptEntry(_))));
    }
}
