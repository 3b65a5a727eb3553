//! Contribution calendar markup parsing.
//!
//! All knowledge of the source's HTML structure lives in this module:
//!
//! - day cells: `.ContributionCalendar-day[data-date]` with `data-level`,
//!   counted from `data-count` or the matching `tool-tip[for=<cell id>]`
//! - stated total: the `#js-contribution-activity-description` heading
//! - available years: `a.js-year-link` on the profile contributions tab
//!
//! Any deviation from that shape is an [`Error::ParseFailed`](contribs_core::Error::ParseFailed)
//! rather than a best guess.

pub mod calendar;
pub mod years;

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

pub use calendar::parse_year;
pub use years::parse_available_years;

/// Leading count of phrases like `"1,234 contributions in 2023"`.
static COUNT_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(No|no|\d[\d,]*)\s+contributions?\b").expect("invalid regex"));

/// Parse an integer that may carry thousands separators.
fn parse_number(raw: &str) -> Option<u64> {
    let digits: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Element text with whitespace collapsed.
fn text_of(el: ElementRef<'_>) -> String {
    el.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}
