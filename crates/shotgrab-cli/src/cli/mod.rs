//! CLI for shotgrab: `shotgrab <username> <destination-path>`.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use shotgrab_core::config;
use shotgrab_core::http::CurlFetcher;
use shotgrab_core::pipeline;
use std::path::PathBuf;

/// Printed (with the usage line) when the positional arguments are wrong.
pub const USAGE_HINT: &str = "Please enter your username and destination path";
const USAGE_LINE: &str = "usage: shotgrab <username> <destination-path>";

/// Download a Steam Community profile's screenshots into per-game folders.
#[derive(Debug, Parser)]
#[command(name = "shotgrab", version)]
#[command(about = "Download a Steam Community profile's screenshots, sorted by game", long_about = None)]
pub struct Cli {
    /// Profile name, as in steamcommunity.com/id/<username>.
    pub username: String,

    /// Directory to save into; one subdirectory is created per game.
    pub dest: PathBuf,
}

impl Cli {
    /// Parses process args. Anything but exactly two positionals prints the
    /// usage hint to stdout and exits with status 1; `--help`/`--version` behave as usual.
    pub fn parse_or_exit() -> Self {
        match Cli::try_parse() {
            Ok(cli) => cli,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => {
                tracing::debug!("argument error: {}", e);
                println!("{}", USAGE_HINT);
                println!("{}", USAGE_LINE);
                std::process::exit(1);
            }
        }
    }
}

pub fn run_from_args() -> Result<()> {
    let cli = Cli::parse_or_exit();
    let settings = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", settings);

    let fetcher = CurlFetcher::from_settings(&settings);
    let summary = pipeline::run(&fetcher, &settings, &cli.username, &cli.dest)?;
    tracing::info!(
        "downloaded {} of {} screenshot(s) for {}",
        summary.downloaded,
        summary.ids,
        cli.username
    );
    Ok(())
}

#[cfg(test)]
mod tests;
