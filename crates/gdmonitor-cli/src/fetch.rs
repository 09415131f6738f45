//! Feed polling: download issues the store has not seen yet and register them.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use gdmonitor_core::NewGazette;
use gdmonitor_store::SqliteStore;
use gdmonitor_sync::GazetteClient;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct FetchStats {
    /// Gazette entries in the feed after date filtering.
    pub listed: usize,
    pub already_downloaded: usize,
    pub downloaded: Vec<PathBuf>,
    pub failed: usize,
}

/// Download every gazette in the feed whose URL is not in the store yet.
///
/// A failed download is logged and skipped; it is retried on the next run
/// because nothing was registered for it. Feed and database errors abort.
pub async fn fetch_new(
    client: &GazetteClient,
    store: &SqliteStore,
    download_dir: &Path,
    since: Option<NaiveDate>,
) -> anyhow::Result<FetchStats> {
    let entries = client
        .fetch_feed(since)
        .await
        .with_context(|| format!("fetching feed {}", client.feed_url()))?;

    let mut stats = FetchStats {
        listed: entries.len(),
        ..Default::default()
    };
    if entries.is_empty() {
        warn!("no gazette entries in the feed");
        return Ok(stats);
    }

    for entry in &entries {
        if store.is_already_downloaded(&entry.url)? {
            info!(title = %entry.title, "already downloaded");
            stats.already_downloaded += 1;
            continue;
        }

        let filename = match client
            .download(entry, download_dir, Local::now().naive_local())
            .await
        {
            Ok(filename) => filename,
            Err(e) => {
                warn!(title = %entry.title, url = %entry.url, error = %e, "download failed");
                stats.failed += 1;
                continue;
            }
        };

        store
            .save_gazette(&NewGazette {
                title: entry.title.clone(),
                publication_date: entry.published.clone(),
                url: entry.url.clone(),
                filename: filename.clone(),
            })
            .with_context(|| format!("registering {filename}"))?;
        stats.downloaded.push(download_dir.join(filename));
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdmonitor_core::GazetteSupply;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn feed(base: &str) -> String {
        format!(
            r#"<rss><channel>
              <item>
                <title>Magyar Közlöny 2025. évi 60. szám</title>
                <link>{base}/dokumentumok/60/megtekintes</link>
                <pubDate>Mon, 26 May 2025 21:52:39 +0200</pubDate>
              </item>
              <item>
                <title>Magyar Közlöny 2025. évi 61. szám</title>
                <link>{base}/dokumentumok/61/megtekintes</link>
                <pubDate>Tue, 27 May 2025 21:00:00 +0200</pubDate>
              </item>
            </channel></rss>"#
        )
    }

    async fn server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_string(feed(&server.uri())))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/dokumentumok/60/letoltes"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-60".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/dokumentumok/61/letoltes"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn downloads_new_and_skips_failures() {
        let server = server().await;
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open_in_memory().unwrap();
        let client = GazetteClient::new(format!("{}/feed", server.uri()), None).unwrap();

        let stats = fetch_new(&client, &store, dir.path(), None).await.unwrap();

        assert_eq!(stats.listed, 2);
        assert_eq!(stats.downloaded.len(), 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(std::fs::read(&stats.downloaded[0]).unwrap(), b"%PDF-60");

        let pending = store.list_unanalyzed().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].title, "Magyar Közlöny 2025. évi 60. szám");
        assert_eq!(pending[0].publication_date, "Mon, 26 May 2025 21:52:39 +0200");
    }

    #[tokio::test]
    async fn second_run_skips_known_urls() {
        let server = server().await;
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open_in_memory().unwrap();
        let client = GazetteClient::new(format!("{}/feed", server.uri()), None).unwrap();

        fetch_new(&client, &store, dir.path(), None).await.unwrap();
        let again = fetch_new(&client, &store, dir.path(), None).await.unwrap();

        assert_eq!(again.already_downloaded, 1);
        assert!(again.downloaded.is_empty());
        assert_eq!(store.counts().unwrap().gazettes, 1);
    }

    #[tokio::test]
    async fn since_filters_before_download() {
        let server = server().await;
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open_in_memory().unwrap();
        let client = GazetteClient::new(format!("{}/feed", server.uri()), None).unwrap();

        let stats = fetch_new(&client, &store, dir.path(), NaiveDate::from_ymd_opt(2025, 5, 26))
            .await
            .unwrap();

        // Only issue 61 is newer, and its download fails.
        assert_eq!(stats.listed, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(store.counts().unwrap().gazettes, 0);
    }
}
