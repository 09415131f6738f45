//! HTTP client for the gazette feed and PDF downloads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::feed::{FeedEntry, gazette_filename, parse_feed};

pub const FEED_TIMEOUT: Duration = Duration::from_secs(30);
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// The gazette site rejects non-browser clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("feed parse error: {0}")]
    Feed(String),
    #[error("invalid certificate {path}: {reason}")]
    Certificate { path: PathBuf, reason: String },
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Client for the gazette office's RSS feed and PDF downloads.
pub struct GazetteClient {
    client: reqwest::Client,
    feed_url: String,
}

impl GazetteClient {
    /// Create a client for `feed_url`.
    ///
    /// `certificate` is an optional PEM file added to the trusted roots, for
    /// when the site's chain is not in the bundled root store.
    pub fn new(feed_url: impl Into<String>, certificate: Option<&Path>) -> Result<Self, SyncError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(path) = certificate {
            let invalid = |reason: String| SyncError::Certificate {
                path: path.to_path_buf(),
                reason,
            };
            let pem = std::fs::read(path).map_err(|e| invalid(e.to_string()))?;
            let certs =
                reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| invalid(e.to_string()))?;
            if certs.is_empty() {
                return Err(invalid("no certificates in PEM file".into()));
            }
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
            info!(certificate = %path.display(), "trusting extra root certificate");
        }
        Ok(Self {
            client: builder.build()?,
            feed_url: feed_url.into(),
        })
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    /// Fetch the feed and return its gazette entries.
    pub async fn fetch_feed(&self, since: Option<NaiveDate>) -> Result<Vec<FeedEntry>, SyncError> {
        info!(url = %self.feed_url, "fetching gazette feed");
        let resp = self
            .client
            .get(&self.feed_url)
            .timeout(FEED_TIMEOUT)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let body = resp.text().await?;
        parse_feed(&body, since)
    }

    /// Download the PDF of `entry` into `dir`.
    ///
    /// Returns the file name relative to `dir`. The file only appears under
    /// its final name once the whole body has been written.
    pub async fn download(
        &self,
        entry: &FeedEntry,
        dir: &Path,
        now: NaiveDateTime,
    ) -> Result<String, SyncError> {
        let filename = gazette_filename(&entry.title, now);
        let target = dir.join(&filename);
        let partial = dir.join(format!("{filename}.part"));

        tokio::fs::create_dir_all(dir).await.map_err(io_error(dir))?;

        let resp = self
            .client
            .get(&entry.url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?;
        let mut resp = check_status(resp).await?;

        let mut file = tokio::fs::File::create(&partial)
            .await
            .map_err(io_error(&partial))?;
        let mut bytes = 0usize;
        let written: Result<(), SyncError> = async {
            while let Some(chunk) = resp.chunk().await? {
                file.write_all(&chunk).await.map_err(io_error(&partial))?;
                bytes += chunk.len();
            }
            file.flush().await.map_err(io_error(&partial))?;
            Ok(())
        }
        .await;
        drop(file);

        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                warn!(path = %partial.display(), error = %cleanup, "cannot remove partial download");
            }
            return Err(e);
        }
        tokio::fs::rename(&partial, &target)
            .await
            .map_err(io_error(&target))?;

        info!(title = %entry.title, filename = %filename, bytes, "downloaded gazette");
        Ok(filename)
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SyncError + use<> {
    let path = path.to_path_buf();
    move |source| SyncError::Io { path, source }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SyncError::Server {
        status: status.as_u16(),
        body,
    })
}
