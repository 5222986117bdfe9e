//! Episode pipeline: completeness checks and bounded-concurrency fan-out.

use std::path::{Path, PathBuf};

use futures::{StreamExt, stream};

use crate::config::AppConfig;
use crate::error::Result;
use crate::feed::Episode;
use crate::fetch;
use crate::format::format_bytes;
use crate::fs::{FileSystem, TokioFileSystem};
use crate::tag;

/// File name of the cover image shared by every episode in an output
/// directory.
pub const COVER_FILE_NAME: &str = "cover.jpg";

/// Classification of an episode's target file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// File exists and carries the expected metadata — nothing to do.
    Complete,
    /// File exists but its metadata is missing or stale; re-tag without
    /// re-downloading.
    NeedsRetag,
    /// No usable file on disk; download then tag.
    NeedsDownload,
}

/// What happened to a single episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Already downloaded and tagged; nothing was done.
    AlreadyComplete,
    /// Audio was downloaded and tagged.
    Downloaded,
    /// Only the metadata was rewritten.
    Retagged,
}

/// Terminal result of one episode's run, collected for the batch summary.
#[derive(Debug)]
pub struct EpisodeReport {
    /// The episode this report is about.
    pub episode: Episode,
    /// Terminal outcome, or the error that stopped this episode.
    pub result: Result<Outcome>,
}

/// Aggregated counts for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Episodes that were already complete.
    pub complete: usize,
    /// Episodes downloaded and tagged this run.
    pub downloaded: usize,
    /// Episodes that only had their metadata rewritten.
    pub retagged: usize,
    /// Episodes that failed at fetch or tag time.
    pub failed: usize,
}

impl BatchSummary {
    /// Total number of episodes that reached a terminal state.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.complete + self.downloaded + self.retagged + self.failed
    }
}

/// Aggregates per-episode reports into batch counts.
#[must_use]
pub fn summarize(reports: &[EpisodeReport]) -> BatchSummary {
    let mut summary = BatchSummary::default();
    for report in reports {
        match report.result {
            Ok(Outcome::AlreadyComplete) => summary.complete += 1,
            Ok(Outcome::Downloaded) => summary.downloaded += 1,
            Ok(Outcome::Retagged) => summary.retagged += 1,
            Err(_) => summary.failed += 1,
        }
    }
    summary
}

/// Orchestrates download-or-skip decisions, fetching, and tagging for
/// every episode of a feed.
pub struct Pipeline<F: FileSystem = TokioFileSystem> {
    client: reqwest::Client,
    config: AppConfig,
    cover_path: PathBuf,
    fs: F,
}

impl Pipeline<TokioFileSystem> {
    /// Creates a new pipeline with the default file system.
    #[must_use]
    pub fn new(client: reqwest::Client, config: AppConfig) -> Self {
        Self::with_fs(client, config, TokioFileSystem)
    }
}

impl<F: FileSystem> Pipeline<F> {
    /// Creates a new pipeline with a custom file system implementation.
    #[must_use]
    pub fn with_fs(client: reqwest::Client, config: AppConfig, fs: F) -> Self {
        let cover_path = config.output_dir.join(COVER_FILE_NAME);
        Self {
            client,
            config,
            cover_path,
            fs,
        }
    }

    /// Path of the shared cover image under the output directory.
    #[must_use]
    pub fn cover_path(&self) -> &Path {
        &self.cover_path
    }

    /// Creates the output directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn prepare_output(&self) -> Result<()> {
        self.fs.create_dir_all(&self.config.output_dir).await?;
        Ok(())
    }

    /// Fetches the shared cover image once, if it is not already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the cover download fails.
    pub async fn ensure_cover(&self) -> Result<()> {
        let fetched = fetch::fetch_if_missing(
            &self.client,
            &self.fs,
            &self.config.feed.cover_url,
            &self.cover_path,
            &self.config.download,
        )
        .await?;
        if fetched {
            log::info!("Cover image downloaded.");
        }
        Ok(())
    }

    /// Decides whether `episode`'s target file needs a download, a re-tag,
    /// or nothing at all. Never mutates the filesystem.
    ///
    /// Metadata is the authoritative signal: a fully tagged file is
    /// complete regardless of its byte count. The size comparison only
    /// demotes an untagged file to a full re-download when it is smaller
    /// than the length declared for the episode (tagging can only grow a
    /// file, so a smaller body is truncated). Unknown sizes are
    /// inconclusive and fall through to the metadata verdict.
    pub async fn classify(&self, episode: &Episode) -> FileStatus {
        let path = episode.target_path(&self.config.output_dir);
        if !self.fs.file_exists(&path).await {
            return FileStatus::NeedsDownload;
        }
        if self.is_tagged(&path).await {
            return FileStatus::Complete;
        }
        if let Some(expected) = self.expected_size(episode).await
            && let Some(actual) = self.fs.file_size(&path).await
            && actual < expected
        {
            return FileStatus::NeedsDownload;
        }
        FileStatus::NeedsRetag
    }

    /// Expected byte size of the episode body: feed-declared when present,
    /// otherwise a best-effort `HEAD` probe of the source.
    async fn expected_size(&self, episode: &Episode) -> Option<u64> {
        match episode.expected_size {
            Some(size) => Some(size),
            None => fetch::probe_content_length(&self.client, &episode.source_url).await,
        }
    }

    async fn is_tagged(&self, path: &Path) -> bool {
        let path = path.to_path_buf();
        let album = self.config.feed.album.clone();
        tokio::task::spawn_blocking(move || tag::is_tagged(&path, &album))
            .await
            .unwrap_or(false)
    }

    async fn tag_file(&self, path: &Path) -> Result<()> {
        let path = path.to_path_buf();
        let cover = self.cover_path.clone();
        let album = self.config.feed.album.clone();
        tokio::task::spawn_blocking(move || tag::apply(&path, &cover, &album))
            .await
            .expect("tagging task panicked")
    }

    /// Runs a single episode through the state machine to a terminal
    /// outcome.
    async fn process_episode(&self, episode: &Episode) -> Result<Outcome> {
        let path = episode.target_path(&self.config.output_dir);
        let name = episode.file_name();

        match self.classify(episode).await {
            FileStatus::Complete => {
                log::info!("Episode '{name}' is already complete.");
                Ok(Outcome::AlreadyComplete)
            }
            FileStatus::NeedsRetag => {
                log::info!("Updating tags for '{name}'...");
                self.tag_file(&path).await?;
                Ok(Outcome::Retagged)
            }
            FileStatus::NeedsDownload => {
                match episode.expected_size {
                    Some(size) => {
                        log::info!("Downloading episode '{name}' ({})...", format_bytes(size));
                    }
                    None => log::info!("Downloading episode '{name}'..."),
                }
                fetch::download_to_path(
                    &self.client,
                    &self.fs,
                    &episode.source_url,
                    &path,
                    &self.config.download,
                )
                .await?;
                self.tag_file(&path).await?;
                Ok(Outcome::Downloaded)
            }
        }
    }

    /// Processes every episode with a bounded number in flight, returning
    /// per-episode reports in completion order.
    ///
    /// Individual episode failures are logged and reported; they never
    /// abort the rest of the batch. The call returns only once every
    /// episode has reached a terminal state.
    pub async fn process_all(&self, episodes: Vec<Episode>) -> Vec<EpisodeReport> {
        stream::iter(episodes)
            .map(|episode| async move {
                let result = self.process_episode(&episode).await;
                match &result {
                    Ok(Outcome::AlreadyComplete) => {}
                    Ok(Outcome::Downloaded) => {
                        log::info!("Episode '{}' processed.", episode.file_name());
                    }
                    Ok(Outcome::Retagged) => {
                        log::info!("Episode '{}' re-tagged.", episode.file_name());
                    }
                    Err(e) => log::error!("Error processing '{}': {e}", episode.file_name()),
                }
                EpisodeReport { episode, result }
            })
            .buffer_unordered(self.config.download.concurrent_episodes)
            .collect()
            .await
    }
}
