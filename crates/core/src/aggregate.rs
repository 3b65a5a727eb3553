//! Multi-year aggregation.
//!
//! Retrieval may over-fetch (discovery pulls every year the source lists);
//! inclusion is decided here from the resolved query alone.

use std::collections::BTreeSet;

use crate::model::{AggregatedResponse, YearResult};
use crate::query::ResolvedQuery;

/// Merge per-year results into one response.
///
/// Inclusion rule:
/// - `fetch_all` includes every retrieved year;
/// - otherwise the explicit years are included, plus `latest` when
///   `last_year` is set. Without a known `latest`, the newest retrieved
///   year stands in for it.
///
/// Duplicate years keep the first result seen.
pub fn aggregate(results: Vec<YearResult>, query: &ResolvedQuery, latest: Option<i32>) -> AggregatedResponse {
    let included: Option<BTreeSet<i32>> = if query.fetch_all {
        None
    } else {
        let mut years: BTreeSet<i32> = query.years.iter().copied().collect();
        if query.last_year
            && let Some(year) = latest.or_else(|| results.iter().map(|r| r.year).max())
        {
            years.insert(year);
        }
        Some(years)
    };

    let mut response = AggregatedResponse::default();

    for result in results {
        if included.as_ref().is_some_and(|years| !years.contains(&result.year)) {
            continue;
        }
        response.years.entry(result.year).or_insert(result);
    }

    response.total = response.years.values().map(|r| r.total).sum();

    tracing::debug!(years = response.years.len(), total = response.total, "aggregated contributions");

    response
}
