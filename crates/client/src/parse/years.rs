//! Discovery of the years a profile has contribution data for.

use std::sync::LazyLock;

use contribs_core::Error;
use scraper::{Html, Selector};

use super::text_of;

static YEAR_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.js-year-link").expect("invalid selector"));

/// The year navigation list, or the calendar wrapper rendered next to it.
static CONTRIBUTIONS_SECTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".js-profile-timeline-year-list, .js-yearly-contributions").expect("invalid selector")
});

/// Years listed in the profile's year navigation, newest first.
///
/// A page without the contributions section is not a profile page and
/// fails to parse. An empty list means the section is there but lists no
/// years; the caller decides what that means.
pub fn parse_available_years(html: &str) -> Result<Vec<i32>, Error> {
    let document = Html::parse_document(html);

    if document.select(&CONTRIBUTIONS_SECTION).next().is_none() {
        return Err(Error::ParseFailed("discovery page has no contributions section".into()));
    }

    let mut years = document
        .select(&YEAR_LINK)
        .map(|link| {
            let text = text_of(link);
            text.parse::<i32>()
                .map_err(|_| Error::ParseFailed(format!("unrecognized year link {text:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();

    Ok(years)
}
