//! Constants for the download module (timeouts, naming).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Prefix of the ordinal placeholder names written by the download pass.
pub const ORDINAL_PREFIX: &str = "adp";

/// Extension of every downloaded document.
pub const DOCUMENT_EXTENSION: &str = "pdf";
