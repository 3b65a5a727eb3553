//! The contributions pipeline.
//!
//! resolve → cache lookup → retrieve (fan-out per year) → aggregate →
//! cache store → shape. Resolution runs before the cache because the key
//! depends on the resolved query; a hit skips everything after it.

use std::sync::Arc;

use contribs_client::{CalendarSource, retrieve};
use contribs_core::{CACHE_TTL, Error, ResultCache, ShapedResponse, aggregate, compute_cache_key, resolve, shape};

/// Pipeline wiring shared by every request.
#[derive(Clone)]
pub struct ContributionsService {
    source: Arc<dyn CalendarSource>,
    cache: Arc<dyn ResultCache>,
}

impl ContributionsService {
    pub fn new(source: Arc<dyn CalendarSource>, cache: Arc<dyn ResultCache>) -> Self {
        Self { source, cache }
    }

    /// Contribution history for `username`, shaped as requested.
    ///
    /// Invalid selectors and formats fail before any retrieval. Cache
    /// failures are logged and treated as a miss.
    pub async fn contributions<S: AsRef<str>>(
        &self, username: &str, selector: &[S], format: Option<&str>,
    ) -> Result<ShapedResponse, Error> {
        let query = resolve(selector, format)?;
        let key = compute_cache_key(username, &query);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => {
                tracing::debug!(username, key = %key, "cache hit");
                return Ok(shape(&cached, query.format));
            }
            Ok(None) => tracing::debug!(username, key = %key, "cache miss"),
            Err(e) => tracing::warn!(username, error = %e, "cache read failed; fetching"),
        }

        let retrieval = retrieve(self.source.as_ref(), username, &query).await?;
        let response = aggregate(retrieval.results, &query, retrieval.latest);

        if let Err(e) = self.cache.put(&key, &response, CACHE_TTL).await {
            tracing::warn!(username, error = %e, "cache write failed");
        }

        Ok(shape(&response, query.format))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Datelike;
    use contribs_core::{AggregatedResponse, MemoryCache, NoopCache};

    use super::*;
    use crate::testing::FakeSource;

    fn service(source: Arc<FakeSource>) -> ContributionsService {
        ContributionsService::new(source, Arc::new(MemoryCache::new()))
    }

    fn years_of(response: &ShapedResponse) -> Vec<i32> {
        let ShapedResponse::Flat(flat) = response else {
            panic!("expected flat shape");
        };
        let mut years: Vec<i32> = flat.days.iter().map(|d| d.date.year()).collect();
        years.dedup();
        years
    }

    #[tokio::test]
    async fn test_explicit_years_flat() {
        let source = Arc::new(FakeSource::with_years(&[2020, 2021, 2022, 2023]));
        let response = service(source.clone()).contributions("octocat", &["2021", "2022"], None).await.unwrap();

        assert_eq!(years_of(&response), vec![2021, 2022]);
        assert_eq!(source.discovery_calls(), 0);
        assert_eq!(source.year_calls(), 2);
    }

    #[tokio::test]
    async fn test_absent_selector_includes_every_year() {
        let source = Arc::new(FakeSource::with_years(&[2018, 2019, 2020]));
        let response = service(source.clone()).contributions::<&str>("octocat", &[], None).await.unwrap();

        assert_eq!(years_of(&response), vec![2018, 2019, 2020]);
    }

    #[tokio::test]
    async fn test_last_returns_single_most_recent_year() {
        let source = Arc::new(FakeSource::with_years(&[2021, 2023, 2022]));
        let response = service(source).contributions("octocat", &["last"], Some("nested")).await.unwrap();

        let ShapedResponse::Nested(nested) = response else {
            panic!("expected nested shape");
        };
        assert_eq!(nested.years.keys().copied().collect::<Vec<_>>(), vec![2023]);
        assert_eq!(nested.total, nested.years[&2023].total);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_pipeline() {
        let source = Arc::new(FakeSource::with_years(&[2021, 2022]));
        let service = service(source.clone());

        let first = service.contributions("octocat", &["2022", "2021"], None).await.unwrap();
        let calls = source.year_calls();

        let second = service.contributions("OctoCat", &["2021", "2022", "2021"], None).await.unwrap();

        assert_eq!(source.year_calls(), calls);
        assert_eq!(serde_json::to_vec(&first).unwrap(), serde_json::to_vec(&second).unwrap());
    }

    #[tokio::test]
    async fn test_format_is_part_of_cache_key() {
        let source = Arc::new(FakeSource::with_years(&[2021]));
        let service = service(source.clone());

        let flat = service.contributions("octocat", &["2021"], None).await.unwrap();
        let nested = service.contributions("octocat", &["2021"], Some("nested")).await.unwrap();

        assert!(matches!(flat, ShapedResponse::Flat(_)));
        assert!(matches!(nested, ShapedResponse::Nested(_)));
        assert_eq!(source.year_calls(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_format_rejected_without_retrieval() {
        let source = Arc::new(FakeSource::with_years(&[2021]));
        let result = service(source.clone()).contributions("octocat", &["2021"], Some("weekly")).await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(source.discovery_calls() + source.year_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let source = Arc::new(FakeSource::with_years(&[]));
        let result = service(source).contributions::<&str>("ghost", &[], None).await;

        assert!(matches!(result, Err(Error::UserNotFound(name)) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let source = Arc::new(FakeSource::with_years(&[2021]).failing_year(2021));
        let service = service(source.clone());

        assert!(service.contributions("octocat", &["2021"], None).await.is_err());
        assert!(service.contributions("octocat", &["2021"], None).await.is_err());
        assert_eq!(source.year_calls(), 2);
    }

    #[tokio::test]
    async fn test_noop_cache_always_runs_pipeline() {
        let source = Arc::new(FakeSource::with_years(&[2021]));
        let service = ContributionsService::new(source.clone(), Arc::new(NoopCache));

        service.contributions("octocat", &["2021"], None).await.unwrap();
        service.contributions("octocat", &["2021"], None).await.unwrap();
        assert_eq!(source.year_calls(), 2);
    }

    struct BrokenCache;

    #[async_trait]
    impl ResultCache for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<AggregatedResponse>, Error> {
            Err(Error::MigrationFailed("cache unavailable".into()))
        }

        async fn put(&self, _key: &str, _value: &AggregatedResponse, _ttl: Duration) -> Result<(), Error> {
            Err(Error::MigrationFailed("cache unavailable".into()))
        }
    }

    #[tokio::test]
    async fn test_cache_failure_does_not_fail_request() {
        let source = Arc::new(FakeSource::with_years(&[2021]));
        let service = ContributionsService::new(source, Arc::new(BrokenCache));

        assert!(service.contributions("octocat", &["2021"], None).await.is_ok());
    }
}
