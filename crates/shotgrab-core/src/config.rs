use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default community host serving the listing and detail pages.
pub const DEFAULT_BASE_URL: &str = "https://steamcommunity.com";

/// Global configuration loaded from `~/.config/shotgrab/config.toml`.
///
/// Every optional key defaults to "unset", which keeps the plain behavior:
/// no timeouts, no page guard, libcurl's own User-Agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Community host, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// First listing page to request.
    #[serde(default = "default_start_page")]
    pub start_page: u32,
    /// Stop with an error after this many listing pages (None = unbounded).
    #[serde(default)]
    pub max_pages: Option<u32>,
    /// Optional `User-Agent` header for every request.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Optional libcurl connect timeout in seconds.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Optional libcurl whole-request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_start_page() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            start_page: default_start_page(),
            max_pages: None,
            user_agent: None,
            connect_timeout_secs: None,
            timeout_secs: None,
        }
    }
}

impl Settings {
    /// Base URL with any trailing `/` removed, ready for path concatenation.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("shotgrab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Read settings from an explicit TOML file.
pub fn load_from_path(path: &Path) -> Result<Settings> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: Settings =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
///
/// The file is optional: when its location cannot be resolved or the default
/// file cannot be written, a warning is logged and defaults are used. Only a
/// file that exists but does not parse is an error.
pub fn load_or_init() -> Result<Settings> {
    match config_path() {
        Ok(path) => load_or_init_at(&path),
        Err(e) => {
            tracing::warn!("no usable config location ({:#}); using defaults", e);
            Ok(Settings::default())
        }
    }
}

/// Like [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<Settings> {
    if path.exists() {
        return load_from_path(path);
    }

    let default_cfg = Settings::default();
    match write_default(path, &default_cfg) {
        Ok(()) => tracing::info!("created default config at {}", path.display()),
        Err(e) => tracing::warn!(
            "could not create default config at {} ({:#}); using defaults",
            path.display(),
            e
        ),
    }
    Ok(default_cfg)
}

fn write_default(path: &Path, cfg: &Settings) -> Result<()> {
    let toml = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    Ok(())
}
