//! HTTP client wrapper for downloading documents.
//!
//! This module provides the `HttpClient` struct which streams documents to
//! disk with timeout configuration and session-aware error handling.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use crate::user_agent;

/// HTTP client for downloading documents with streaming support.
///
/// Created once per run and reused for every document, taking advantage
/// of connection pooling and the shared cookie jar.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client without cookies and with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] when the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, DownloadError> {
        let client = base_client_builder(None, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
            .build()
            .map_err(DownloadError::ClientBuild)?;
        Ok(Self { client })
    }

    /// Creates a client with a cookie jar and explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ClientBuild`] when the client cannot be built.
    #[instrument(level = "debug", skip(cookie_jar))]
    pub fn with_cookie_jar_and_timeouts(
        cookie_jar: Arc<Jar>,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        let client = base_client_builder(Some(cookie_jar), connect_timeout_secs, read_timeout_secs)
            .build()
            .map_err(DownloadError::ClientBuild)?;
        Ok(Self { client })
    }

    /// Downloads `url` into a new file at `path`, returning the bytes written.
    ///
    /// The file is created only after the server has answered with a
    /// success status, and never overwrites an existing file. A partially
    /// written file is removed when the transfer fails.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns an error status (4xx, 5xx) or a login page
    /// - Creating or writing the file fails
    #[instrument(skip(self, path), fields(url = %url))]
    pub async fn download_to_path(&self, url: &str, path: &Path) -> Result<u64, DownloadError> {
        debug!("starting download");

        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self.send_request(url).await?;

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        let stream_result = stream_to_file(file, response, url, path).await;
        if stream_result.is_err() {
            debug!(path = %path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(path).await;
        }
        stream_result
    }

    async fn send_request(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            if matches!(status_code, 401 | 403) {
                return Err(DownloadError::auth_required(url, status_code));
            }
            return Err(DownloadError::http_status(url, status_code));
        }

        if is_html_response(&response) {
            // An expired session is answered with the login page, not an error status.
            return Err(DownloadError::auth_required(url, 0));
        }

        Ok(response)
    }
}

fn is_html_response(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("text/html"))
}

/// Streams response body to file, returning bytes written.
///
/// This is extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}

fn base_client_builder(
    cookie_jar: Option<Arc<Jar>>,
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
) -> ClientBuilder {
    let mut builder = Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_download_user_agent());
    if let Some(jar) = cookie_jar {
        builder = builder.cookie_provider(jar);
    }
    builder
}
