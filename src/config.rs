//! Run configuration passed explicitly into the harvest.
//!
//! Nothing here is global: the binary builds these values from CLI flags,
//! environment variables and the optional config file, then hands them to
//! [`run_harvest`](crate::harvest::run_harvest).

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::browser::wait::{DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT};

/// Default portal entry point.
pub const DEFAULT_PORTAL_URL: &str = "https://adpworld.adp.com";

/// Default overall deadline for the browser-driven phase, in minutes.
pub const DEFAULT_TIMEOUT_MINUTES: u64 = 15;

/// Default safety bound on the number of listing pages walked.
pub const DEFAULT_MAX_PAGES: u32 = 500;

/// Portal login credentials.
///
/// The password is redacted in Debug output.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password. Never log it.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Poll intervals, per-step deadlines and settle pauses for the browser phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestTimings {
    /// Interval between readiness checks.
    pub poll_interval: Duration,
    /// Deadline for a single readiness wait.
    pub wait_timeout: Duration,
    /// Pause around filling a login field and pressing its button.
    pub field_settle: Duration,
    /// Pause after the dashboard text shows up, before opening the document list.
    pub dashboard_settle: Duration,
    /// Pause after opening the document list.
    pub navigation_settle: Duration,
    /// Pause after clicking the next-page control.
    pub page_settle: Duration,
    /// Maximum number of listing pages to walk before giving up.
    pub max_pages: u32,
}

impl Default for HarvestTimings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            field_settle: Duration::from_secs(1),
            dashboard_settle: Duration::from_secs(3),
            navigation_settle: Duration::from_secs(2),
            page_settle: Duration::from_secs(2),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Everything a download run needs.
#[derive(Debug, Clone)]
pub struct HarvestOptions {
    /// Portal entry point; its origin scopes the bridged cookies.
    pub portal_url: Url,
    /// Login credentials.
    pub credentials: Credentials,
    /// Directory receiving the ordinal-named files.
    pub download_dir: PathBuf,
    /// Run Chrome without a window.
    pub headless: bool,
    /// Deadline for the whole browser-driven phase.
    pub overall_timeout: Duration,
    /// Browser phase timings.
    pub timings: HarvestTimings,
}

impl HarvestOptions {
    /// Creates options with default timings and a 15 minute deadline.
    #[must_use]
    pub fn new(portal_url: Url, credentials: Credentials, download_dir: PathBuf) -> Self {
        Self {
            portal_url,
            credentials,
            download_dir,
            headless: true,
            overall_timeout: Duration::from_secs(DEFAULT_TIMEOUT_MINUTES * 60),
            timings: HarvestTimings::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("max.mustermann", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("max.mustermann"));
        assert!(!debug.contains("hunter2"), "password leaked: {debug}");
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_default_timings_match_portal_render_latency() {
        let timings = HarvestTimings::default();
        assert_eq!(timings.poll_interval, Duration::from_millis(500));
        assert_eq!(timings.wait_timeout, Duration::from_secs(30));
        assert_eq!(timings.page_settle, Duration::from_secs(2));
        assert_eq!(timings.max_pages, DEFAULT_MAX_PAGES);
    }

    #[test]
    fn test_harvest_options_defaults() {
        let options = HarvestOptions::new(
            Url::parse(DEFAULT_PORTAL_URL).unwrap(),
            Credentials::new("u", "p"),
            PathBuf::from("/tmp/adp"),
        );
        assert!(options.headless);
        assert_eq!(options.overall_timeout, Duration::from_secs(900));
    }
}
