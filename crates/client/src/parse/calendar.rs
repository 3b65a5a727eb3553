//! Contribution calendar grid parsing.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use contribs_core::{ContributionLevel, DayRecord, Error, YearResult};
use scraper::{ElementRef, Html, Selector};

use super::{COUNT_PHRASE, parse_number, text_of};

static DAY_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".ContributionCalendar-day[data-date]").expect("invalid selector"));

static TOOLTIP: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tool-tip[for]").expect("invalid selector"));

static TOTAL_HEADING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("#js-contribution-activity-description, .js-yearly-contributions h2").expect("invalid selector")
});

/// Parse one year's calendar markup.
///
/// Cells dated outside `year` are grid padding and are skipped. The summed
/// counts must equal the total stated in the calendar heading, when the
/// page has one.
pub fn parse_year(html: &str, year: i32) -> Result<YearResult, Error> {
    let document = Html::parse_document(html);

    let tooltips: HashMap<&str, String> = document
        .select(&TOOLTIP)
        .filter_map(|el| Some((el.value().attr("for")?, text_of(el))))
        .collect();

    let mut seen = HashSet::new();
    let mut days = Vec::new();

    for cell in document.select(&DAY_CELL) {
        let Some(day) = parse_cell(cell, &tooltips, year)? else {
            continue;
        };
        if !seen.insert(day.date) {
            return Err(Error::ParseFailed(format!("duplicate calendar day {}", day.date)));
        }
        days.push(day);
    }

    if days.is_empty() {
        return Err(Error::ParseFailed(format!("no calendar days found for {year}")));
    }

    let result = YearResult::new(year, days);

    if let Some(stated) = stated_total(&document)?
        && stated != result.total
    {
        return Err(Error::ParseFailed(format!(
            "calendar for {year} states {stated} contributions but its days sum to {}",
            result.total
        )));
    }

    tracing::debug!(year, days = result.days.len(), total = result.total, "parsed calendar");

    Ok(result)
}

fn parse_cell(cell: ElementRef<'_>, tooltips: &HashMap<&str, String>, year: i32) -> Result<Option<DayRecord>, Error> {
    let el = cell.value();

    let raw_date = el.attr("data-date").unwrap_or_default().trim();
    let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
        .map_err(|e| Error::ParseFailed(format!("invalid data-date {raw_date:?}: {e}")))?;

    if date.year() != year {
        return Ok(None);
    }

    let level = parse_level(el.attr("data-level"), date)?;

    let count = match el.attr("data-count") {
        Some(raw) => parse_number(raw)
            .ok_or_else(|| Error::ParseFailed(format!("invalid data-count {raw:?} on {date}")))?,
        None => match el.id().and_then(|id| tooltips.get(id)) {
            Some(text) => parse_count_phrase(text)
                .ok_or_else(|| Error::ParseFailed(format!("unrecognized tooltip {text:?} on {date}")))?,
            None if level == ContributionLevel::None => 0,
            None => return Err(Error::ParseFailed(format!("no contribution count for active day {date}"))),
        },
    };

    let count = u32::try_from(count).map_err(|_| Error::ParseFailed(format!("count out of range on {date}")))?;

    Ok(Some(DayRecord { date, count, level }))
}

fn parse_level(raw: Option<&str>, date: NaiveDate) -> Result<ContributionLevel, Error> {
    let raw = raw.ok_or_else(|| Error::ParseFailed(format!("missing data-level on {date}")))?;
    raw.trim()
        .parse::<u8>()
        .ok()
        .and_then(|n| ContributionLevel::try_from(n).ok())
        .ok_or_else(|| Error::ParseFailed(format!("invalid data-level {raw:?} on {date}")))
}

/// `"No contributions on …"`, `"1 contribution on …"`, `"1,234 contributions in 2023"`.
fn parse_count_phrase(text: &str) -> Option<u64> {
    let caps = COUNT_PHRASE.captures(text)?;
    match &caps[1] {
        "No" | "no" => Some(0),
        digits => parse_number(digits),
    }
}

fn stated_total(document: &Html) -> Result<Option<u64>, Error> {
    let Some(heading) = document.select(&TOTAL_HEADING).next() else {
        return Ok(None);
    };

    let text = text_of(heading);
    parse_count_phrase(&text)
        .map(Some)
        .ok_or_else(|| Error::ParseFailed(format!("unrecognized calendar heading {text:?}")))
}
