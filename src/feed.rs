//! Feed loading: RSS parsing and episode extraction.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Episode\s+(\d+):\s*(.+)$").expect("valid regex"));

/// A podcast episode extracted from the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    /// Episode number as it appears in the feed title (keeps leading zeros).
    pub number: String,
    /// Human-readable episode title.
    pub title: String,
    /// URL of the episode's audio enclosure.
    pub source_url: String,
    /// Byte size declared by the feed enclosure, when available.
    pub expected_size: Option<u64>,
}

impl Episode {
    /// Returns the target file name, `"<number> - <title>.mp3"`.
    ///
    /// This name is the sole correlation key between feed state and
    /// filesystem state across runs.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{} - {}.mp3", self.number, self.title)
    }

    /// Returns the target path for this episode under `dir`.
    #[must_use]
    pub fn target_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// Splits a feed title of the form `Episode <N>: <T>` into number and title.
///
/// Returns `None` for any other shape.
#[must_use]
pub fn parse_title(raw: &str) -> Option<(String, String)> {
    let caps = TITLE_RE.captures(raw)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Extracts episodes from a parsed channel, in feed order.
///
/// Items without an enclosure are dropped. Items whose title does not
/// match the `Episode <N>: <T>` pattern are logged and dropped; a
/// malformed entry never fails the whole feed.
#[must_use]
pub fn episodes_from_channel(channel: &rss::Channel) -> Vec<Episode> {
    channel
        .items()
        .iter()
        .filter_map(episode_from_item)
        .collect()
}

fn episode_from_item(item: &rss::Item) -> Option<Episode> {
    let enclosure = item.enclosure()?;
    let raw_title = item.title().unwrap_or("");
    let Some((number, title)) = parse_title(raw_title) else {
        log::warn!("Unrecognized title format, skipping: {raw_title}");
        return None;
    };

    // Declared lengths are advisory; anything unparseable means "unknown".
    let expected_size = match enclosure.length() {
        "" => None,
        len => len.parse::<u64>().ok(),
    };

    Some(Episode {
        number,
        title,
        source_url: enclosure.url().to_string(),
        expected_size,
    })
}

/// Fetches and parses the feed, returning episodes earliest-first.
///
/// The feed lists newest episodes first, so the parsed list is reversed
/// before returning.
///
/// # Errors
///
/// Returns an error if the feed cannot be fetched or parsed. Individual
/// malformed entries are skipped, not escalated.
pub async fn load_episodes(client: &reqwest::Client, feed_url: &str) -> Result<Vec<Episode>> {
    let body = client
        .get(feed_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let channel = body.parse::<rss::Channel>()?;

    let mut episodes = episodes_from_channel(&channel);
    episodes.reverse();
    log::info!("Found {} episodes.", episodes.len());
    Ok(episodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_xml(items: &str) -> String {
        format!(
            "<rss version=\"2.0\"><channel>\
             <title>test</title><link>http://host</link><description>d</description>\
             {items}\
             </channel></rss>"
        )
    }

    #[test]
    fn parse_title_splits_number_and_title() {
        assert_eq!(
            parse_title("Episode 07: Night Drive"),
            Some(("07".to_string(), "Night Drive".to_string()))
        );
        assert_eq!(
            parse_title("Episode 52: Algorithm Dances"),
            Some(("52".to_string(), "Algorithm Dances".to_string()))
        );
    }

    #[test]
    fn parse_title_keeps_leading_zeros() {
        let (number, _) = parse_title("Episode 001: Intro").unwrap();
        assert_eq!(number, "001");
    }

    #[test]
    fn parse_title_rejects_other_shapes() {
        assert_eq!(parse_title("Bonus: Outtakes"), None);
        assert_eq!(parse_title("Episode seven: Night Drive"), None);
        assert_eq!(parse_title("Episode 7"), None);
        assert_eq!(parse_title(""), None);
    }

    #[test]
    fn file_name_format() {
        let episode = Episode {
            number: "07".to_string(),
            title: "Night Drive".to_string(),
            source_url: "https://host/ep07.mp3".to_string(),
            expected_size: None,
        };
        assert_eq!(episode.file_name(), "07 - Night Drive.mp3");
        assert_eq!(
            episode.target_path(Path::new("out")),
            PathBuf::from("out/07 - Night Drive.mp3")
        );
    }

    #[test]
    fn episodes_skip_items_without_enclosure_or_bad_titles() {
        let xml = feed_xml(
            "<item><title>Episode 52: Algorithm</title>\
             <enclosure url=\"https://host/ep52.mp3\" length=\"123\" type=\"audio/mpeg\"/></item>\
             <item><title>Bonus: Outtakes</title>\
             <enclosure url=\"https://host/bonus.mp3\" length=\"5\" type=\"audio/mpeg\"/></item>\
             <item><title>Episode 51: No Enclosure</title></item>\
             <item><title>Episode 07: Night Drive</title>\
             <enclosure url=\"https://host/ep07.mp3\" length=\"\" type=\"audio/mpeg\"/></item>",
        );
        let channel = xml.parse::<rss::Channel>().unwrap();
        let episodes = episodes_from_channel(&channel);

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].number, "52");
        assert_eq!(episodes[0].expected_size, Some(123));
        assert_eq!(episodes[1].number, "07");
        assert_eq!(episodes[1].title, "Night Drive");
        assert_eq!(episodes[1].source_url, "https://host/ep07.mp3");
        assert_eq!(episodes[1].expected_size, None);
    }

    #[test]
    fn unparseable_length_defaults_to_unknown() {
        let xml = feed_xml(
            "<item><title>Episode 03: Noise</title>\
             <enclosure url=\"https://host/ep03.mp3\" length=\"not-a-number\" type=\"audio/mpeg\"/></item>",
        );
        let channel = xml.parse::<rss::Channel>().unwrap();
        let episodes = episodes_from_channel(&channel);
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].expected_size, None);
    }

    #[tokio::test]
    async fn load_reverses_newest_first_feed() {
        let mut server = mockito::Server::new_async().await;
        let xml = feed_xml(
            "<item><title>Episode 03: Third</title>\
             <enclosure url=\"https://host/ep03.mp3\" length=\"3\" type=\"audio/mpeg\"/></item>\
             <item><title>Episode 02: Second</title>\
             <enclosure url=\"https://host/ep02.mp3\" length=\"2\" type=\"audio/mpeg\"/></item>\
             <item><title>Episode 01: First</title>\
             <enclosure url=\"https://host/ep01.mp3\" length=\"1\" type=\"audio/mpeg\"/></item>",
        );
        let mock = server
            .mock("GET", "/rss.php")
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body(xml)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/rss.php", server.url());
        let episodes = load_episodes(&client, &url).await.unwrap();

        let numbers: Vec<_> = episodes.iter().map(|e| e.number.as_str()).collect();
        assert_eq!(numbers, vec!["01", "02", "03"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn load_fails_on_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/rss.php")
            .with_status(500)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/rss.php", server.url());
        assert!(load_episodes(&client, &url).await.is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parse_title_never_panics(raw in ".*") {
                let _ = parse_title(&raw);
            }

            #[test]
            fn parse_title_round_trips(number in "[0-9]{1,4}", title in "[A-Za-z][A-Za-z0-9 ]{0,30}") {
                let raw = format!("Episode {number}: {title}");
                let (parsed_number, parsed_title) = parse_title(&raw).unwrap();
                prop_assert_eq!(parsed_number, number);
                prop_assert_eq!(parsed_title, title);
            }
        }
    }
}
