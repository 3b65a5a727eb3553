//! Year selector resolution.
//!
//! Turns the raw `y` tokens and `format` flag of a request into a
//! [`ResolvedQuery`]. Resolution is pure: equivalent selectors (same tokens
//! in any order, with any repetition) resolve to identical queries, which is
//! what makes the query usable as part of a cache key.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Years a calendar can be requested for.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1970..=9999;

/// One raw `y` selector token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearToken {
    Year(i32),
    All,
    Last,
}

impl FromStr for YearToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();

        if token.eq_ignore_ascii_case("all") {
            return Ok(YearToken::All);
        }
        if token.eq_ignore_ascii_case("last") {
            return Ok(YearToken::Last);
        }

        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidInput(format!(
                "invalid year selector {token:?}: expected a year, \"all\" or \"last\""
            )));
        }

        match token.parse::<i32>() {
            Ok(year) if YEAR_RANGE.contains(&year) => Ok(YearToken::Year(year)),
            _ => Err(Error::InvalidInput(format!(
                "invalid year {token:?}: expected a year between {} and {}",
                YEAR_RANGE.start(),
                YEAR_RANGE.end()
            ))),
        }
    }
}

/// Requested response shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Flat,
    Nested,
}

impl ResponseFormat {
    /// Parse the optional `format` parameter. Only `nested` is accepted.
    pub fn parse(value: Option<&str>) -> Result<Self, Error> {
        match value {
            None => Ok(ResponseFormat::Flat),
            Some("nested") => Ok(ResponseFormat::Nested),
            Some(other) => Err(Error::InvalidInput(format!(
                "unsupported format {other:?}: the only supported value is \"nested\""
            ))),
        }
    }
}

/// Normalized selector plus mode flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedQuery {
    /// Explicit years, ascending and distinct.
    pub years: Vec<i32>,
    /// Set when the selector was empty or contained `all`.
    pub fetch_all: bool,
    /// Set when the selector contained `last`.
    pub last_year: bool,
    pub format: ResponseFormat,
}

impl ResolvedQuery {
    /// Whether the source must be asked which years have data.
    pub fn needs_discovery(&self) -> bool {
        self.fetch_all || self.last_year
    }
}

/// Resolve raw selector tokens and the format flag.
///
/// Any token that is not a year, `all` or `last`, and any format other
/// than `nested`, is rejected with [`Error::InvalidInput`].
pub fn resolve<S: AsRef<str>>(tokens: &[S], format: Option<&str>) -> Result<ResolvedQuery, Error> {
    let format = ResponseFormat::parse(format)?;

    let mut query = ResolvedQuery { fetch_all: tokens.is_empty(), format, ..Default::default() };

    for raw in tokens {
        match raw.as_ref().parse::<YearToken>()? {
            YearToken::Year(year) => query.years.push(year),
            YearToken::All => query.fetch_all = true,
            YearToken::Last => query.last_year = true,
        }
    }

    query.years.sort_unstable();
    query.years.dedup();

    Ok(query)
}
