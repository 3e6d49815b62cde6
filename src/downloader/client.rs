use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reqwest::header::LOCATION;
use reqwest::{Client, StatusCode, Url};
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{SdkError, SdkResult};

/// How many redirect hops a single fetch may follow before giving up.
const MAX_REDIRECTS: usize = 10;

/// Snapshot reported to a progress callback after each streamed chunk.
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    pub url: String,
    pub bytes_downloaded: u64,
    /// From `Content-Length`; 0 when the server did not send one.
    pub total_bytes: u64,
    /// `floor(100 * downloaded / total)`; 0 while the total is unknown.
    pub percent: u8,
}

/// Per-file progress callback.
pub type ProgressFn = Arc<dyn Fn(DownloadProgress) + Send + Sync>;

/// Batch progress callback, fired once per completed entry as `(done, total)`.
pub type BatchProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// A single file to download, with optional SHA-1 for validation.
#[derive(Clone)]
pub struct DownloadEntry {
    pub url: String,
    pub dest: PathBuf,
    pub sha1: Option<String>,
    pub size: Option<u64>,
    pub progress: Option<ProgressFn>,
}

impl DownloadEntry {
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>, sha1: Option<String>) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            sha1,
            size: None,
            progress: None,
        }
    }
}

impl fmt::Debug for DownloadEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadEntry")
            .field("url", &self.url)
            .field("dest", &self.dest)
            .field("sha1", &self.sha1)
            .field("size", &self.size)
            .finish()
    }
}

/// Aggregate result of a batch download. A failing entry never cancels its
/// peers; failures are collected here instead of propagating.
#[derive(Debug)]
pub struct BatchOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<(DownloadEntry, SdkError)>,
}

/// Concurrent, SHA-1 validated downloader.
pub struct Downloader {
    client: Client,
    /// Maximum number of in-flight fetches in a batch.
    concurrency: usize,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            concurrency: crate::config::DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    // ── Single file download ────────────────────────────

    /// Download a single file to `dest`, optionally validating SHA-1.
    ///
    /// When `expected_sha1` is given and the file on disk already hashes to
    /// it, the call succeeds without any network I/O. On every failure path
    /// the partial file is removed, so no file remains at `dest` after an
    /// error.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        expected_sha1: Option<&str>,
        progress: Option<&ProgressFn>,
    ) -> SdkResult<()> {
        if let Some(expected) = expected_sha1 {
            if matches!(Self::file_matches_sha1(dest, expected).await, Ok(true)) {
                debug!("Already present and verified: {:?}", dest);
                return Ok(());
            }
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SdkError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let result = self
            .fetch(url.to_string(), dest, expected_sha1, progress, MAX_REDIRECTS)
            .await;

        if result.is_err() {
            let _ = tokio::fs::remove_file(dest).await;
        }
        result
    }

    /// One GET, following redirects by recursing on the resolved URL so the
    /// SHA-1 state and progress callback apply to the terminal response.
    fn fetch<'a>(
        &'a self,
        url: String,
        dest: &'a Path,
        expected_sha1: Option<&'a str>,
        progress: Option<&'a ProgressFn>,
        redirects_left: usize,
    ) -> Pin<Box<dyn Future<Output = SdkResult<()>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| classify_reqwest_error(e, &url))?;

            let status = response.status();
            if is_redirect(status) {
                if redirects_left == 0 {
                    return Err(SdkError::DownloadFailed {
                        url,
                        status: status.as_u16(),
                    });
                }
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| SdkError::DownloadFailed {
                        url: url.clone(),
                        status: status.as_u16(),
                    })?;
                let next = resolve_redirect(&url, location);
                debug!("Redirect {} -> {}", url, next);
                return self
                    .fetch(next, dest, expected_sha1, progress, redirects_left - 1)
                    .await;
            }

            if !status.is_success() {
                return Err(SdkError::DownloadFailed {
                    url,
                    status: status.as_u16(),
                });
            }

            let total_bytes = response.content_length().unwrap_or(0);
            let mut hasher = expected_sha1.map(|_| Sha1::new());

            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| SdkError::Io {
                    path: dest.to_path_buf(),
                    source: e,
                })?;

            let mut downloaded: u64 = 0;
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(|e| classify_reqwest_error(e, &url))?;
                file.write_all(&chunk).await.map_err(|e| SdkError::Io {
                    path: dest.to_path_buf(),
                    source: e,
                })?;
                if let Some(hasher) = hasher.as_mut() {
                    hasher.update(&chunk);
                }
                downloaded += chunk.len() as u64;
                if let Some(callback) = progress {
                    let percent = if total_bytes > 0 {
                        ((downloaded.min(total_bytes) * 100) / total_bytes) as u8
                    } else {
                        0
                    };
                    callback(DownloadProgress {
                        url: url.clone(),
                        bytes_downloaded: downloaded,
                        total_bytes,
                        percent,
                    });
                }
            }
            file.flush().await.map_err(|e| SdkError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;
            // Drop the handle before any removal below; Windows refuses to
            // delete a file that is still open.
            drop(file);

            if let (Some(expected), Some(hasher)) = (expected_sha1, hasher) {
                let actual = hex::encode(hasher.finalize());
                if !actual.eq_ignore_ascii_case(expected) {
                    let _ = tokio::fs::remove_file(dest).await;
                    return Err(SdkError::Sha1Mismatch {
                        path: dest.to_path_buf(),
                        expected: expected.to_ascii_lowercase(),
                        actual,
                    });
                }
            }

            debug!("Downloaded: {} -> {:?}", url, dest);
            Ok(())
        })
    }

    // ── Batch concurrent downloads ──────────────────────

    /// Download many files with at most `concurrency` in flight. As soon as
    /// one entry finishes, the next pending entry starts; completion order is
    /// unspecified. `on_item` fires once per completed entry (success or
    /// failure) with the running `(done, total)` counts.
    pub async fn download_batch(
        &self,
        entries: Vec<DownloadEntry>,
        on_item: Option<BatchProgressFn>,
    ) -> BatchOutcome {
        let total = entries.len();
        info!(
            "Starting batch download: {} files, concurrency={}",
            total, self.concurrency
        );

        let done = Arc::new(AtomicUsize::new(0));
        let results: Vec<_> = stream::iter(entries)
            .map(|entry| {
                let done = Arc::clone(&done);
                let on_item = on_item.clone();
                async move {
                    let result = self
                        .download_file(
                            &entry.url,
                            &entry.dest,
                            entry.sha1.as_deref(),
                            entry.progress.as_ref(),
                        )
                        .await;
                    let completed = done.fetch_add(1, Ordering::SeqCst) + 1;
                    if let Some(callback) = on_item.as_ref() {
                        callback(completed, total);
                    }
                    (entry, result)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut failures = Vec::new();
        for (entry, result) in results {
            if let Err(e) = result {
                warn!("Download failed for {}: {}", entry.url, e);
                failures.push((entry, e));
            }
        }

        let failed = failures.len();
        BatchOutcome {
            total,
            succeeded: total - failed,
            failed,
            failures,
        }
    }

    /// Whether the file at `path` hashes to `expected` (case-insensitive hex).
    pub async fn file_matches_sha1(path: &Path, expected: &str) -> SdkResult<bool> {
        let bytes = tokio::fs::read(path).await.map_err(|e| SdkError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut hasher = Sha1::new();
        hasher.update(&bytes);
        let actual = hex::encode(hasher.finalize());
        Ok(actual.eq_ignore_ascii_case(expected))
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// Resolve a `Location` header against the request URL, so relative
/// redirects become absolute.
fn resolve_redirect(base: &str, location: &str) -> String {
    Url::parse(base)
        .ok()
        .and_then(|base| base.join(location).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| location.to_string())
}

fn classify_reqwest_error(e: reqwest::Error, url: &str) -> SdkError {
    if e.is_timeout() {
        SdkError::Timeout {
            url: url.to_string(),
        }
    } else {
        SdkError::Http(e)
    }
}
