//! Error taxonomy for the scrape pipeline.
//!
//! Nothing here is retried: every variant aborts the run once it reaches the CLI.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// libcurl reported an error (connect, resolve, TLS, read...).
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Http { url: String, status: u32 },
    /// Page body was expected to be text but is not valid UTF-8.
    #[error("{url}: response body is not valid UTF-8")]
    Body { url: String },
    /// A mandatory anchor was not present on a detail page.
    #[error("screenshot {id}: no {what} found on detail page")]
    MissingMatch { id: String, what: &'static str },
    /// Enumeration ran past the configured `max_pages` without seeing the end marker.
    #[error("listing did not end within {max_pages} page(s)")]
    PageLimit { max_pages: u32 },
}
