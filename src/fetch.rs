//! HTTP fetching of episode audio and the shared cover image.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::config::DownloadConfig;
use crate::error::Result;
use crate::fs::FileSystem;

/// Builds the HTTP client shared by feed, cover, and episode requests.
///
/// No request timeout is set: a hung request stalls only its own slot,
/// matching the original behaviour.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .pool_idle_timeout(Duration::from_secs(60))
        .pool_max_idle_per_host(8)
        .tcp_keepalive(Duration::from_secs(30))
        .build()
}

/// Returns the `.part` path used while a download is in flight.
fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

/// Downloads `url` into `dest` using `.part`-then-rename semantics.
///
/// The body is streamed to `<dest>.part` and renamed into place only after
/// the stream ends cleanly, so a crash mid-write never leaves a file under
/// the final name. On error the `.part` file is removed when
/// `cleanup_on_error` is set.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns an error if the request fails, the server answers with a
/// non-success status, or the file cannot be written.
pub async fn download_to_path<F: FileSystem>(
    client: &reqwest::Client,
    fs: &F,
    url: &str,
    dest: &Path,
    config: &DownloadConfig,
) -> Result<u64> {
    let response = client.get(url).send().await?.error_for_status()?;

    let pp = part_path(dest);
    let mut file = fs.create_file(&pp).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    let result: Result<()> = async {
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(())
    }
    .await;

    drop(file);
    match result {
        Ok(()) => {
            fs.rename_file(&pp, dest).await?;
            Ok(written)
        }
        Err(e) => {
            if config.cleanup_on_error {
                let _ = fs.remove_file(&pp).await;
            }
            Err(e)
        }
    }
}

/// Downloads `url` into `dest` unless the file already exists.
///
/// Returns `true` when a download actually happened. Used for the shared
/// cover image, which is fetched once per output directory and never
/// re-validated afterwards.
///
/// # Errors
///
/// Returns an error if the download fails.
pub async fn fetch_if_missing<F: FileSystem>(
    client: &reqwest::Client,
    fs: &F,
    url: &str,
    dest: &Path,
    config: &DownloadConfig,
) -> Result<bool> {
    if fs.file_exists(dest).await {
        return Ok(false);
    }
    download_to_path(client, fs, url, dest, config).await?;
    Ok(true)
}

/// Probes the remote size of `url` with a `HEAD` request.
///
/// Servers that omit `Content-Length` yield `None`; transport errors do
/// too, since the probe is only a best-effort secondary signal.
pub async fn probe_content_length(client: &reqwest::Client, url: &str) -> Option<u64> {
    let response = client
        .head(url)
        .send()
        .await
        .ok()?
        .error_for_status()
        .ok()?;
    response
        .headers()
        .get(reqwest::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
