//! Runs enumerate -> resolve -> download in order for one profile.

use anyhow::Result;
use std::path::Path;

use crate::config::Settings;
use crate::downloader::download_all;
use crate::enumerator::enumerate_ids;
use crate::http::Fetch;
use crate::resolver::resolve_all;

/// Counts reported after a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ids: usize,
    pub downloaded: usize,
}

pub fn run(fetch: &dyn Fetch, settings: &Settings, username: &str, dest: &Path) -> Result<RunSummary> {
    println!("=> Downloading screenshots for {}", username);
    tracing::info!(username, dest = %dest.display(), base = settings.base(), "run started");

    let ids = enumerate_ids(
        fetch,
        settings.base(),
        username,
        settings.start_page,
        settings.max_pages,
    )?;

    println!("=> Getting file list");
    let shots = resolve_all(fetch, settings.base(), &ids)?;

    println!("=> Downloading files");
    let written = download_all(fetch, dest, &shots)?;

    let summary = RunSummary {
        ids: ids.len(),
        downloaded: written.len(),
    };
    tracing::info!(ids = summary.ids, downloaded = summary.downloaded, "run completed");
    Ok(summary)
}
