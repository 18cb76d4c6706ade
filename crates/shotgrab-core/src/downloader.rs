//! Downloader: fetches each resolved screenshot into `<dest>/<app>/`, names it
//! by capture time and stamps the file with that time.

use anyhow::{Context, Result};
use std::fs::{self, File, FileTimes};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::filename::{capture_name, FilenameError};
use crate::http::{Fetch, HttpResponse};
use crate::resolver::ScreenshotRef;

/// Directory name used when an app name sanitizes to nothing.
const UNKNOWN_APP: &str = "Unknown";

/// Makes an application name usable as a single path component.
///
/// `/`, `\`, NUL and control characters become `_`; leading/trailing
/// whitespace and dots are trimmed. Everything else, spaces included, is kept.
pub fn app_dir_name(app: &str) -> String {
    let replaced: String = app
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == '\0' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');
    if trimmed.is_empty() {
        UNKNOWN_APP.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Writes an asset response into `app_dir`, named and timestamped from its
/// Content-Disposition header. Returns the written path.
pub fn save_capture(app_dir: &Path, response: &HttpResponse) -> Result<PathBuf> {
    let disposition = response
        .header("Content-Disposition")
        .ok_or(FilenameError::MissingHeader)?;
    println!("- {}", disposition);

    let name = capture_name(disposition)
        .with_context(|| format!("derive filename from {:?}", disposition))?;
    let path = app_dir.join(name.file_name());

    let mut file = open_for_write(&path)?;
    file.write_all(&response.body)
        .with_context(|| format!("write {}", path.display()))?;

    let taken = name.system_time();
    file.set_times(FileTimes::new().set_accessed(taken).set_modified(taken))
        .with_context(|| format!("set times on {}", path.display()))?;

    tracing::info!(path = %path.display(), bytes = response.body.len(), "saved screenshot");
    Ok(path)
}

#[cfg(unix)]
fn open_for_write(path: &Path) -> Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)
        .with_context(|| format!("create {}", path.display()))
}

#[cfg(not(unix))]
fn open_for_write(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("create {}", path.display()))
}

/// Creates the app directory, fetches the asset and saves it.
pub fn download_one(fetch: &dyn Fetch, dest: &Path, shot: &ScreenshotRef) -> Result<PathBuf> {
    let app_dir = dest.join(app_dir_name(&shot.app));
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create directory {}", app_dir.display()))?;

    let response = fetch
        .get(&shot.url)?
        .error_for_status(&shot.url)
        .with_context(|| format!("download {}", shot.url))?;
    save_capture(&app_dir, &response)
}

/// Downloads every screenshot in order. The first failure aborts; files
/// already written are left in place.
pub fn download_all(fetch: &dyn Fetch, dest: &Path, shots: &[ScreenshotRef]) -> Result<Vec<PathBuf>> {
    shots
        .iter()
        .map(|shot| download_one(fetch, dest, shot))
        .collect()
}
