//! Configuration types for the feed source and download behaviour.

use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The feed and cover art of one content provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// URL of the RSS feed episodes are loaded from.
    pub feed_url: String,
    /// URL of the cover image shared by every episode.
    pub cover_url: String,
    /// Album name written into each episode's tag.
    pub album: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://musicforprogramming.net/rss.php".to_string(),
            cover_url: "https://musicforprogramming.net/img/folder.jpg".to_string(),
            album: "Music For Programming".to_string(),
        }
    }
}

/// Configuration for episode download operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Number of episodes fetched/tagged concurrently.
    pub concurrent_episodes: usize,
    /// Whether to clean up `.part` files on download error.
    pub cleanup_on_error: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrent_episodes: 3,
            cleanup_on_error: true,
        }
    }
}

impl DownloadConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of concurrently processed episodes.
    #[must_use]
    pub const fn with_concurrent_episodes(mut self, concurrent: usize) -> Self {
        self.concurrent_episodes = concurrent;
        self
    }

    /// Sets whether to clean up `.part` files on download error.
    #[must_use]
    pub const fn with_cleanup_on_error(mut self, cleanup: bool) -> Self {
        self.cleanup_on_error = cleanup;
        self
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Feed source configuration.
    pub feed: FeedConfig,
    /// Download configuration.
    pub download: DownloadConfig,
    /// Directory episodes and the cover image are written to.
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            download: DownloadConfig::default(),
            output_dir: PathBuf::from("downloaded_music"),
        }
    }
}

impl AppConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from `<config_dir>/pod-dl/config.toml`,
    /// falling back to defaults when the file is absent. Sections missing
    /// from the file keep their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> crate::Result<Self> {
        let Some(path) = dirs::config_dir().map(|dir| dir.join("pod-dl").join("config.toml"))
        else {
            return Ok(Self::default());
        };
        match std::fs::read_to_string(&path) {
            Ok(raw) => toml::from_str(&raw)
                .map_err(|e| crate::Error::Io(std::io::Error::new(ErrorKind::InvalidData, e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_feed_config() {
        let config = FeedConfig::default();
        assert!(config.feed_url.contains("musicforprogramming.net"));
        assert!(config.cover_url.ends_with("folder.jpg"));
        assert_eq!(config.album, "Music For Programming");
    }

    #[test]
    fn default_download_config() {
        let config = DownloadConfig::default();
        assert_eq!(config.concurrent_episodes, 3);
        assert!(config.cleanup_on_error);
    }

    #[test]
    fn download_config_builder_pattern() {
        let config = DownloadConfig::new()
            .with_concurrent_episodes(8)
            .with_cleanup_on_error(false);

        assert_eq!(config.concurrent_episodes, 8);
        assert!(!config.cleanup_on_error);
    }

    #[test]
    fn default_app_config() {
        let config = AppConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("downloaded_music"));
        assert_eq!(config.download.concurrent_episodes, 3);
    }

    #[test]
    fn app_config_serializes_to_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized.feed.feed_url, config.feed.feed_url);
        assert_eq!(deserialized.feed.album, config.feed.album);
        assert_eq!(
            deserialized.download.concurrent_episodes,
            config.download.concurrent_episodes
        );
        assert_eq!(deserialized.output_dir, config.output_dir);
    }

    #[test]
    fn partial_toml_fills_missing_sections_with_defaults() {
        let config: AppConfig = toml::from_str("output_dir = \"elsewhere\"").unwrap();
        assert_eq!(config.output_dir, PathBuf::from("elsewhere"));
        assert_eq!(config.download.concurrent_episodes, 3);
        assert_eq!(config.feed.album, "Music For Programming");
    }
}
