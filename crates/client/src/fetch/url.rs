//! Source URL construction for calendar pages.

use contribs_core::Error;
use url::Url;

/// Longest username the source accepts.
const MAX_USERNAME_LEN: usize = 39;

/// Check that a username could exist on the source.
///
/// Usernames are alphanumeric with single inner hyphens. Anything else can
/// only resolve to a missing user, so it is reported as one without
/// touching the network.
pub fn validate_username(username: &str) -> Result<(), Error> {
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && username.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !username.starts_with('-')
        && !username.ends_with('-')
        && !username.contains("--");

    if valid { Ok(()) } else { Err(Error::UserNotFound(username.to_string())) }
}

fn with_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, Error> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::FetchFailed(format!("source base URL cannot carry a path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Profile page listing which years have contributions.
pub fn discovery_url(base: &Url, username: &str) -> Result<Url, Error> {
    validate_username(username)?;
    let mut url = with_segments(base, [username])?;
    url.query_pairs_mut().append_pair("tab", "contributions");
    Ok(url)
}

/// Calendar fragment for one calendar year.
pub fn year_url(base: &Url, username: &str, year: i32) -> Result<Url, Error> {
    validate_username(username)?;
    let mut url = with_segments(base, ["users", username, "contributions"])?;
    url.query_pairs_mut()
        .append_pair("from", &format!("{year}-01-01"))
        .append_pair("to", &format!("{year}-12-31"));
    Ok(url)
}
