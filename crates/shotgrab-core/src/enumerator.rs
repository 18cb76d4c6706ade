//! Page enumerator: walks the paginated screenshot wall of a profile and
//! collects screenshot IDs until the end-of-content marker shows up.

use anyhow::{Context, Result};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::ScrapeError;
use crate::http::Fetch;

/// Marker the listing emits on its last page.
pub const END_MARKER: &str = "EndOfInfiniteContent";

static SCREENSHOT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"OnScreenshotClicked\(\s(\d+)\s\)").expect("screenshot id pattern")
});

/// Listing endpoint for `username`.
pub fn listing_url(base_url: &str, username: &str) -> String {
    format!(
        "{}/id/{}/screenshots/screenshots",
        base_url.trim_end_matches('/'),
        username
    )
}

/// Form body for one listing page: every image, public and unlisted, newest first, image wall.
pub fn listing_form(page: u32) -> Vec<(&'static str, String)> {
    vec![
        ("appid", "0".to_string()),
        ("p", page.to_string()),
        ("privacy", "14".to_string()),
        ("content", "1".to_string()),
        ("browsefilter", "myfiles".to_string()),
        ("sort", "newestfirst".to_string()),
        ("view", "imagewall".to_string()),
    ]
}

/// All screenshot IDs on a listing page, in body order.
pub fn extract_ids(body: &str) -> Vec<String> {
    SCREENSHOT_ID
        .captures_iter(body)
        .map(|c| c[1].to_string())
        .collect()
}

pub fn is_last_page(body: &str) -> bool {
    body.contains(END_MARKER)
}

/// Requests listing pages from `start_page` upward until the end marker.
///
/// A page without matches does not end the walk; only [`END_MARKER`] does.
/// With `max_pages` set, fails with [`ScrapeError::PageLimit`] once that many
/// pages were read without reaching the end.
pub fn enumerate_ids(
    fetch: &dyn Fetch,
    base_url: &str,
    username: &str,
    start_page: u32,
    max_pages: Option<u32>,
) -> Result<Vec<String>> {
    let url = listing_url(base_url, username);
    let mut ids = Vec::new();
    let mut page = start_page;
    let mut pages_read = 0u32;

    loop {
        if let Some(max) = max_pages {
            if pages_read >= max {
                return Err(ScrapeError::PageLimit { max_pages: max }.into());
            }
        }

        println!("- Getting files from page {}", page);
        let response = fetch
            .post_form(&url, &listing_form(page))?
            .error_for_status(&url)
            .with_context(|| format!("listing page {}", page))?;
        let body = response.text(&url)?;

        let found = extract_ids(body);
        tracing::debug!(page, found = found.len(), "listing page scraped");
        ids.extend(found);
        pages_read += 1;

        if is_last_page(body) {
            break;
        }
        page += 1;
    }

    tracing::info!(username, pages = pages_read, ids = ids.len(), "enumeration finished");
    Ok(ids)
}
