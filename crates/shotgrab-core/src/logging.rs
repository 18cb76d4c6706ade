//! Run diagnostics. The console carries only the `=>` and `-` progress
//! lines; tracing events go to
//! `~/.local/state/shotgrab/shotgrab.log` so the two never interleave.
//! Without a usable state directory the events go to stderr instead.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Page, resolve and download events are debug level; everything else info.
const DEFAULT_FILTER: &str = "info,shotgrab=debug,shotgrab_core=debug";

/// `RUST_LOG` if set and valid, otherwise [`DEFAULT_FILTER`].
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `~/.local/state/shotgrab/shotgrab.log`; the parent directory is created.
pub fn log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("shotgrab")?;
    Ok(xdg_dirs.place_state_file("shotgrab.log")?)
}

/// Successive runs append to one file.
fn open_log(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log {}", path.display()))
}

/// Send tracing events to the state-dir log file.
///
/// Errors leave no subscriber installed, so the caller can still use
/// [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_path()?;
    let file = open_log(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log = %path.display(),
        "shotgrab run started"
    );
    Ok(())
}

/// Send tracing events to stderr. A subscriber that is already installed is kept.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
