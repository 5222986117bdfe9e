//! pod-dl - A library for downloading and tagging podcast episodes.
//!
//! Loads an RSS feed, downloads every episode's audio file, and embeds a
//! standardized album tag and cover image into each file. Runs are
//! idempotent: a file that is already downloaded and tagged is skipped, a
//! file that is present but untagged is re-tagged without re-downloading.
//!
//! # Example
//!
//! ```no_run
//! use pod_dl::{AppConfig, Pipeline, build_http_client, feed, pipeline::summarize};
//!
//! # async fn example() -> pod_dl::Result<()> {
//! let config = AppConfig::default();
//! let client = build_http_client()?;
//! let pipeline = Pipeline::new(client.clone(), config.clone());
//!
//! pipeline.prepare_output().await?;
//! pipeline.ensure_cover().await?;
//!
//! let episodes = feed::load_episodes(&client, &config.feed.feed_url).await?;
//! let reports = pipeline.process_all(episodes).await;
//! println!("{} downloaded", summarize(&reports).downloaded);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod format;
pub mod fs;
pub mod pipeline;
pub mod tag;

// Re-export main types for convenience
pub use config::{AppConfig, DownloadConfig, FeedConfig};
pub use error::{Error, Result};
pub use feed::Episode;
pub use fetch::build_http_client;
pub use format::{format_bytes, format_duration};
pub use fs::{FileSystem, TokioFileSystem};
pub use pipeline::{BatchSummary, EpisodeReport, FileStatus, Outcome, Pipeline};
