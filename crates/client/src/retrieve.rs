//! Per-request retrieval: year discovery, then one fetch+parse per year.
//!
//! Year pages are fetched concurrently and joined with
//! [`try_join_all`], which resolves on the first failure. A request never
//! produces a partial set of years.

use std::time::Instant;

use contribs_core::{Error, ResolvedQuery, YearResult};
use futures_util::future::try_join_all;

use crate::fetch::CalendarSource;
use crate::parse::{parse_available_years, parse_year};

/// Parsed calendars for one request.
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// One result per retrieved year, ascending.
    pub results: Vec<YearResult>,
    /// Newest year the source lists, when discovery ran.
    pub latest: Option<i32>,
}

/// Years to retrieve for a query, plus the newest discovered year.
///
/// Discovery runs only when the query asks for all years or the last one.
/// A profile that lists no years is reported as a missing user.
pub async fn plan_years(
    source: &dyn CalendarSource, username: &str, query: &ResolvedQuery,
) -> Result<(Vec<i32>, Option<i32>), Error> {
    let mut years = Vec::new();
    let mut latest = None;

    if query.needs_discovery() {
        let html = source.discovery_page(username).await?;
        let available = parse_available_years(&html)?;

        let Some(&newest) = available.first() else {
            return Err(Error::UserNotFound(username.to_string()));
        };
        latest = Some(newest);

        if query.fetch_all {
            years.extend(available);
        } else {
            years.push(newest);
        }
    }

    years.extend(query.years.iter().copied());
    years.sort_unstable();
    years.dedup();

    Ok((years, latest))
}

/// Fetch and parse every year the query needs.
pub async fn retrieve(source: &dyn CalendarSource, username: &str, query: &ResolvedQuery) -> Result<Retrieval, Error> {
    let start = Instant::now();
    let (years, latest) = plan_years(source, username, query).await?;

    tracing::debug!(username, ?years, ?latest, "retrieving calendars");

    let results = try_join_all(years.iter().map(|&year| async move {
        let html = source.year_page(username, year).await?;
        parse_year(&html, year)
    }))
    .await?;

    tracing::debug!(
        "retrieved {} calendar(s) for {} in {}ms",
        results.len(),
        username,
        start.elapsed().as_millis()
    );

    Ok(Retrieval { results, latest })
}
