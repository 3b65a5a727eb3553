//! In-process calendar source for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Datelike;
use contribs_client::CalendarSource;
use contribs_client::fixtures::{discovery_page, full_year_page};
use contribs_core::Error;

/// Serves generated calendars for a fixed set of years and counts calls.
///
/// A source with no years behaves like an unknown profile: the discovery
/// page lists nothing and year pages answer 404.
#[derive(Debug, Default)]
pub struct FakeSource {
    years: Vec<i32>,
    failing: HashSet<i32>,
    discovery_calls: AtomicUsize,
    year_calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_years(years: &[i32]) -> Self {
        Self { years: years.to_vec(), ..Default::default() }
    }

    /// Make the given year's page fail like a transport error.
    pub fn failing_year(mut self, year: i32) -> Self {
        self.failing.insert(year);
        self
    }

    pub fn discovery_calls(&self) -> usize {
        self.discovery_calls.load(Ordering::SeqCst)
    }

    pub fn year_calls(&self) -> usize {
        self.year_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CalendarSource for FakeSource {
    async fn discovery_page(&self, _username: &str) -> Result<String, Error> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        Ok(discovery_page(&self.years))
    }

    async fn year_page(&self, username: &str, year: i32) -> Result<String, Error> {
        self.year_calls.fetch_add(1, Ordering::SeqCst);

        if self.years.is_empty() {
            return Err(Error::UserNotFound(username.to_string()));
        }
        if self.failing.contains(&year) {
            return Err(Error::FetchFailed(format!("status 502 for year {year}")));
        }

        Ok(full_year_page(year, |date| (date.ordinal() + date.day()) % 7))
    }
}
