//! Error types for the pod-dl library.

use thiserror::Error;

/// Errors that can occur while loading the feed or processing episodes.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// RSS feed parsing failed.
    #[error("feed parse error: {0}")]
    Feed(#[from] rss::Error),

    /// Audio metadata could not be read or written.
    #[error("tag error: {0}")]
    Tag(#[from] lofty::error::LoftyError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for pod-dl operations.
pub type Result<T> = std::result::Result<T, Error>;
