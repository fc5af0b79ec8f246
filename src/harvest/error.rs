//! Harvest error types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::auth::BridgeError;
use crate::browser::BrowserError;
use crate::download::DownloadError;

/// Errors that end a download run.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Launching, navigating, clicking, evaluating or waiting in the browser failed.
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// The browser session could not be transferred to the HTTP client.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// The pager kept offering a next page past the configured bound.
    #[error("document list still paginating after {max_pages} pages; giving up")]
    PageLimitExceeded {
        /// The bound that was hit.
        max_pages: u32,
    },

    /// The overall run deadline fired during the browser phase.
    #[error("browser phase did not finish within {timeout:?}")]
    DeadlineExceeded {
        /// The configured overall deadline.
        timeout: Duration,
    },

    /// The portal URL has no usable origin.
    #[error("invalid portal URL: {url}")]
    InvalidPortalUrl {
        /// The rejected URL.
        url: String,
    },

    /// A document could not be downloaded.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The destination directory could not be prepared.
    #[error("cannot prepare download directory {path}: {source}")]
    Io {
        /// The directory involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl HarvestError {
    /// Creates an IO error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_from_browser_keeps_condition_in_message() {
        let error: HarvestError =
            BrowserError::timed_out("element `#signBtn`", Duration::from_secs(30)).into();
        let msg = error.to_string();
        assert!(msg.contains("#signBtn"), "{msg}");
        assert!(msg.contains("30s"), "{msg}");
    }

    #[test]
    fn test_page_limit_display() {
        let error = HarvestError::PageLimitExceeded { max_pages: 500 };
        assert!(error.to_string().contains("500 pages"));
    }

    #[test]
    fn test_download_error_is_transparent() {
        let error: HarvestError = DownloadError::http_status("https://adpworld.adp.com/doc", 500).into();
        assert_eq!(error.to_string(), "HTTP 500 downloading https://adpworld.adp.com/doc");
    }
}
