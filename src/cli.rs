//! CLI mode - loads the feed and processes every episode.

use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::error::Result;
use crate::feed;
use crate::fetch::build_http_client;
use crate::format::format_duration;
use crate::pipeline::{BatchSummary, Pipeline, summarize};

/// Runs a full feed pass: prepare the output directory, fetch the cover,
/// load the feed, then fan out over the episodes.
///
/// # Errors
///
/// Returns an error for fatal setup failures: output directory creation,
/// cover fetch, or feed load/parse. Per-episode failures are logged and
/// counted in the summary instead.
pub async fn run(config: AppConfig) -> Result<()> {
    let client = build_http_client()?;
    let pipeline = Pipeline::new(client.clone(), config.clone());

    pipeline.prepare_output().await?;
    pipeline.ensure_cover().await?;

    let episodes = feed::load_episodes(&client, &config.feed.feed_url).await?;
    if episodes.is_empty() {
        println!("No episodes found in feed.");
        return Ok(());
    }

    let started = Instant::now();
    let reports = pipeline.process_all(episodes).await;
    print_summary(&summarize(&reports), started.elapsed());

    Ok(())
}

fn print_summary(summary: &BatchSummary, elapsed: Duration) {
    println!(
        "{} episode(s): {} downloaded, {} re-tagged, {} already complete, {} failed in {}",
        summary.processed(),
        summary.downloaded,
        summary.retagged,
        summary.complete,
        summary.failed,
        format_duration(elapsed),
    );
}
