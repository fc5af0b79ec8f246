//! Error types for the download module.
//!
//! This module defines structured errors for all download operations,
//! providing context-rich error messages for debugging and user feedback.

use std::path::PathBuf;

use thiserror::Error;

/// Suggestion shown when the portal no longer accepts the bridged session.
const SESSION_EXPIRED_SUGGESTION: &str =
    "Run `adp-docs download` again to start a fresh portal session.";

/// Errors that can occur during document downloads.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The portal rejected the bridged session.
    ///
    /// Status 0 marks a login page served with 200 in place of the document.
    #[error("[AUTH] portal session rejected (HTTP {status}) downloading {url}\n  Suggestion: {suggestion}")]
    AuthRequired {
        /// The URL that requires authentication.
        url: String,
        /// The HTTP status code (401, 403, or 0 for a login page).
        status: u16,
        /// User-facing suggestion for resolving the auth issue.
        suggestion: &'static str,
    },

    /// File system error during download (create file, write, etc.)
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The link is malformed or cannot be resolved against the portal origin.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a session-rejected error.
    pub fn auth_required(url: impl Into<String>, status: u16) -> Self {
        Self::AuthRequired {
            url: url.into(),
            status,
            suggestion: SESSION_EXPIRED_SUGGESTION,
        }
    }

    /// The URL this error is about, when it concerns a request.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Network { url, .. }
            | Self::Timeout { url }
            | Self::HttpStatus { url, .. }
            | Self::AuthRequired { url, .. }
            | Self::InvalidUrl { url } => Some(url),
            Self::Io { .. } | Self::ClientBuild(_) => None,
        }
    }
}

// No From<reqwest::Error> / From<std::io::Error>: every variant needs the
// url or path the source errors do not carry. Use the constructors above.
