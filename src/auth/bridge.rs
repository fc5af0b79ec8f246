//! Allow-listed cookie transfer from a [`BrowserSession`] into a reqwest jar.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use reqwest::cookie::Jar;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::browser::{BrowserCookie, BrowserError, BrowserSession};
use crate::download::{DownloadError, HttpClient};

/// Cookies that carry the portal's session identity and server affinity.
///
/// Every other cookie the browser holds (tracking, consent, other domains)
/// stays behind.
pub const SESSION_COOKIE_ALLOW_LIST: [&str; 4] = [
    "BIGipServer_DE1_world-v2",
    "SERVERSESSIONID",
    "JSESSIONIDSSO",
    "EMEASMSESSION",
];

/// Errors that can occur while bridging the browser session.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The browser could not enumerate its cookies.
    #[error("cookie extraction failed: {0}")]
    CookieExtractionFailed(#[source] BrowserError),

    /// The cookie-aware HTTP client could not be built.
    #[error("failed to build bridged HTTP client: {0}")]
    Client(#[from] DownloadError),
}

#[derive(Clone)]
struct SessionCookie {
    value: String,
    domain: String,
}

/// The allow-listed session cookies, keyed by name.
///
/// Values are redacted in Debug output.
#[derive(Clone, Default)]
pub struct CookieSet {
    cookies: BTreeMap<String, SessionCookie>,
}

impl CookieSet {
    /// Keeps only the cookies named in [`SESSION_COOKIE_ALLOW_LIST`].
    ///
    /// When the browser reports the same name twice, the last one wins.
    #[must_use]
    pub fn from_browser_cookies(cookies: &[BrowserCookie]) -> Self {
        let mut kept = BTreeMap::new();
        for cookie in cookies {
            if SESSION_COOKIE_ALLOW_LIST.contains(&cookie.name.as_str()) {
                kept.insert(
                    cookie.name.clone(),
                    SessionCookie {
                        value: cookie.value().to_string(),
                        domain: cookie.domain.clone(),
                    },
                );
            } else {
                debug!(name = %cookie.name, domain = %cookie.domain, "discarding non-session cookie");
            }
        }
        Self { cookies: kept }
    }

    /// Number of session cookies kept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Whether no session cookie was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Whether a cookie with `name` was kept.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Names of the kept cookies, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cookies.keys().map(String::as_str)
    }

    /// Returns the value and domain recorded for `name`.
    ///
    /// Cookie values are sensitive. Avoid logging the return value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<(&str, &str)> {
        self.cookies
            .get(name)
            .map(|cookie| (cookie.value.as_str(), cookie.domain.as_str()))
    }

    /// Installs the cookies into a fresh jar scoped to `origin`.
    ///
    /// A cookie whose domain is the origin host becomes host-only; a parent
    /// domain is kept as the `Domain` attribute. Cookies for domains the
    /// origin does not belong to are rejected by the jar.
    #[instrument(level = "debug", skip(self), fields(origin = %origin))]
    #[must_use]
    pub fn to_jar(&self, origin: &Url) -> Arc<Jar> {
        let jar = Arc::new(Jar::default());
        let host = origin.host_str().unwrap_or_default();

        for (name, cookie) in &self.cookies {
            let set_cookie = build_set_cookie_string(name, cookie, host);
            jar.add_cookie_str(&set_cookie, origin);
            debug!(name = %name, domain = %cookie.domain, "loaded session cookie into jar");
        }

        jar
    }
}

impl fmt::Debug for CookieSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieSet")
            .field("names", &self.cookies.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Builds a `Set-Cookie` header string for the jar.
fn build_set_cookie_string(name: &str, cookie: &SessionCookie, origin_host: &str) -> String {
    let domain = cookie.domain.strip_prefix('.').unwrap_or(&cookie.domain);
    let mut set_cookie = format!("{name}={}; Path=/", cookie.value);
    if !domain.is_empty() && !domain.eq_ignore_ascii_case(origin_host) {
        set_cookie.push_str("; Domain=");
        set_cookie.push_str(domain);
    }
    set_cookie
}

/// Copies the session cookies from `session` into a new download client.
///
/// # Errors
///
/// Returns [`BridgeError::CookieExtractionFailed`] when the browser cannot
/// list its cookies, or [`BridgeError::Client`] when the client cannot be built.
pub async fn bridge_session(
    session: &dyn BrowserSession,
    origin: &Url,
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
) -> Result<HttpClient, BridgeError> {
    info!("Getting cookies for document access");

    let browser_cookies = session
        .cookies()
        .await
        .map_err(BridgeError::CookieExtractionFailed)?;

    let cookie_set = CookieSet::from_browser_cookies(&browser_cookies);
    if cookie_set.is_empty() {
        warn!(
            browser_cookies = browser_cookies.len(),
            "No session cookies found; downloads will likely be rejected"
        );
    }

    let jar = cookie_set.to_jar(origin);
    let client = HttpClient::with_cookie_jar_and_timeouts(jar, connect_timeout_secs, read_timeout_secs)?;

    info!(
        cookie_count = cookie_set.len(),
        discarded = browser_cookies.len() - cookie_set.len(),
        "Cookie setup complete"
    );
    Ok(client)
}
