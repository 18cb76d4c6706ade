//! Detail resolver: turns a screenshot ID into its direct image URL and the
//! name of the application it was taken in.

use anyhow::{Context, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::error::ScrapeError;
use crate::http::Fetch;

/// Anchor to the full-size image on the content delivery network.
const ASSET_ANCHOR: &str = r#"a[href*="akamaihd"][target="_blank"]"#;

/// Anchors into the application hub; the first whose href is exactly an app page names the app.
const APP_ANCHOR: &str = r#"a[href^="https://steamcommunity.com/app/"]"#;

static APP_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://steamcommunity\.com/app/\d+$").expect("app href pattern")
});

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// A screenshot ready to download: owning application and direct asset URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotRef {
    pub app: String,
    pub url: String,
}

pub fn detail_url(base_url: &str, id: &str) -> String {
    format!(
        "{}/sharedfiles/filedetails/?id={}",
        base_url.trim_end_matches('/'),
        id
    )
}

/// Extracts the first asset anchor and the first app anchor from a detail page.
/// Both are required. The app name is the anchor's text with markup and
/// character references resolved.
pub fn parse_detail(id: &str, body: &str) -> Result<ScreenshotRef, ScrapeError> {
    let document = Html::parse_document(body);
    let missing = |what| ScrapeError::MissingMatch {
        id: id.to_string(),
        what,
    };

    let url = document
        .select(&selector(ASSET_ANCHOR))
        .find_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .ok_or_else(|| missing("asset URL"))?;
    let app = document
        .select(&selector(APP_ANCHOR))
        .find(|a| a.value().attr("href").is_some_and(|h| APP_HREF.is_match(h)))
        .map(anchor_text)
        .ok_or_else(|| missing("application name"))?;
    Ok(ScreenshotRef { app, url })
}

fn anchor_text(anchor: ElementRef<'_>) -> String {
    anchor.text().collect::<String>().trim().to_string()
}

pub fn resolve(fetch: &dyn Fetch, base_url: &str, id: &str) -> Result<ScreenshotRef> {
    println!("- {}", id);
    let url = detail_url(base_url, id);
    let response = fetch
        .get(&url)?
        .error_for_status(&url)
        .with_context(|| format!("detail page for {}", id))?;
    let shot = parse_detail(id, response.text(&url)?)?;
    tracing::debug!(id, app = %shot.app, url = %shot.url, "resolved screenshot");
    Ok(shot)
}

/// Resolves every ID in order; the first failure aborts.
pub fn resolve_all(fetch: &dyn Fetch, base_url: &str, ids: &[String]) -> Result<Vec<ScreenshotRef>> {
    ids.iter().map(|id| resolve(fetch, base_url, id)).collect()
}
