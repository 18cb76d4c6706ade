pub mod config;
pub mod logging;

pub mod downloader;
pub mod enumerator;
pub mod error;
pub mod filename;
pub mod http;
pub mod pipeline;
pub mod resolver;

pub use error::ScrapeError;
pub use resolver::ScreenshotRef;
