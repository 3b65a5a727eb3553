//! Calendar markup builders for tests.
//!
//! Pages mirror the source's layout: a grid of day cells followed by the
//! tooltips that carry each cell's count.

use std::fmt::Write;

use chrono::{Datelike, NaiveDate};

fn level_for(count: u32) -> u8 {
    match count {
        0 => 0,
        1..=2 => 1,
        3..=5 => 2,
        6..=9 => 3,
        _ => 4,
    }
}

fn tooltip_text(date: &str, count: u32) -> String {
    match count {
        0 => format!("No contributions on {date}."),
        1 => format!("1 contribution on {date}."),
        n => format!("{n} contributions on {date}."),
    }
}

/// Calendar page with the given `(date, count, level)` cells.
///
/// `stated_total` renders the heading the parser cross-checks against.
pub fn calendar_page(year: i32, days: &[(&str, u32, u8)], stated_total: Option<u64>) -> String {
    let mut html = String::from(r#"<div class="js-yearly-contributions">"#);

    if let Some(total) = stated_total {
        let _ = write!(
            html,
            r#"<h2 id="js-contribution-activity-description" class="f4 text-normal mb-2">
                {total} contributions
                    in {year}
            </h2>"#
        );
    }

    html.push_str(r#"<table class="ContributionCalendar-grid js-calendar-graph-table"><tbody><tr>"#);
    html.push_str(r#"<td class="ContributionCalendar-label"><span class="sr-only">Sunday</span></td>"#);
    for (i, (date, _, level)) in days.iter().enumerate() {
        let _ = write!(
            html,
            r#"<td tabindex="0" data-ix="{i}" data-date="{date}" id="contribution-day-component-{i}" data-level="{level}" role="gridcell" class="ContributionCalendar-day"></td>"#
        );
    }
    html.push_str(r#"<td class="ContributionCalendar-day"></td></tr></tbody></table>"#);

    for (i, (date, count, _)) in days.iter().enumerate() {
        let _ = write!(
            html,
            r#"<tool-tip id="tooltip-{i}" for="contribution-day-component-{i}" popover="manual" class="sr-only position-absolute">{}</tool-tip>"#,
            tooltip_text(date, *count)
        );
    }

    html.push_str("</div>");
    html
}

/// Calendar page covering every day of `year` with a consistent heading.
pub fn full_year_page(year: i32, count_for: impl Fn(NaiveDate) -> u32) -> String {
    let dates: Vec<(String, u32)> = NaiveDate::from_ymd_opt(year, 1, 1)
        .into_iter()
        .flat_map(|start| start.iter_days())
        .take_while(|date| date.year() == year)
        .map(|date| (date.format("%Y-%m-%d").to_string(), count_for(date)))
        .collect();

    let total = dates.iter().map(|(_, count)| u64::from(*count)).sum();
    let days: Vec<(&str, u32, u8)> = dates
        .iter()
        .map(|(date, count)| (date.as_str(), *count, level_for(*count)))
        .collect();

    calendar_page(year, &days, Some(total))
}

/// Profile contributions tab listing `years` in its year navigation.
pub fn discovery_page(years: &[i32]) -> String {
    let mut html = String::from(r#"<div class="js-profile-timeline-year-list"><ul class="filter-list small">"#);
    for year in years {
        let _ = write!(
            html,
            r#"<li><a class="js-year-link filter-item px-3 mb-2 py-2" id="year-link-{year}" href="/octocat?tab=overview&amp;from={year}-12-01&amp;to={year}-12-31">{year}</a></li>"#
        );
    }
    html.push_str("</ul></div>");
    html
}
