//! Browser capability used to drive the portal.
//!
//! The harvest only needs a handful of operations from a live browser page:
//! navigate, click by selector, evaluate a script, read the rendered markup,
//! and enumerate cookies. [`BrowserSession`] names exactly those, so the
//! login flow, the readiness waits and the pagination loop run the same
//! against Chrome ([`ChromeSession`]) and against scripted fakes in tests.

mod chrome;
mod error;
pub mod wait;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

pub use chrome::{ChromeBrowser, ChromeSession, LaunchOptions};
pub use error::BrowserError;
pub use wait::{ReadinessWaiter, WaitCondition};

/// A cookie as reported by the browser.
///
/// The value field is redacted in Debug output to prevent accidental
/// logging of session identifiers.
#[derive(Clone)]
pub struct BrowserCookie {
    /// Cookie name.
    pub name: String,
    /// The domain the cookie belongs to (e.g., `.adp.com`).
    pub domain: String,
    /// The URL path scope for the cookie.
    pub path: String,
    /// Whether the cookie should only be sent over HTTPS.
    pub secure: bool,
    /// Cookie value. Sensitive, never log it.
    value: String,
}

impl BrowserCookie {
    /// Creates a new cookie entry.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
        secure: bool,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            path: path.into(),
            secure,
            value: value.into(),
        }
    }

    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive. Avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for BrowserCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserCookie")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// A single live browser page the harvest drives.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Loads `url` and waits for the navigation to finish.
    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Clicks the first element matching the CSS `selector`.
    async fn click(&self, selector: &str) -> Result<(), BrowserError>;

    /// Evaluates `script` in the page and returns its JSON result.
    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError>;

    /// Returns the rendered outer HTML of the whole document.
    async fn content(&self) -> Result<String, BrowserError>;

    /// Returns every cookie visible to the page.
    async fn cookies(&self) -> Result<Vec<BrowserCookie>, BrowserError>;
}

/// Encodes `value` as a JavaScript string literal.
pub(crate) fn js_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_cookie_debug_redacts_value() {
        let cookie = BrowserCookie::new("SERVERSESSIONID", "s3cr3t", ".adp.com", "/", true);
        let debug = format!("{cookie:?}");
        assert!(debug.contains("SERVERSESSIONID"));
        assert!(!debug.contains("s3cr3t"), "value leaked: {debug}");
        assert_eq!(cookie.value(), "s3cr3t");
    }

    #[test]
    fn test_js_string_escapes_quotes_and_backslashes() {
        assert_eq!(js_string("plain"), "\"plain\"");
        assert_eq!(js_string(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(js_string("line\nbreak"), r#""line\nbreak""#);
    }
}
