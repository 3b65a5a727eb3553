//! Client code for the contributions API.
//!
//! This crate retrieves contribution calendar pages from the source service,
//! parses them into typed day records, and runs the per-year fan-out for a
//! request.

pub mod fetch;
pub mod parse;
pub mod retrieve;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use fetch::{CalendarClient, CalendarSource, FetchConfig};
pub use parse::{parse_available_years, parse_year};
pub use retrieve::{Retrieval, plan_years, retrieve};
