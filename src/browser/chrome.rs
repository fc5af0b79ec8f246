//! Chrome-backed [`BrowserSession`] built on `chromiumoxide`.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures_util::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{BrowserCookie, BrowserError, BrowserSession};

/// Default CDP request timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chrome launch settings.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window.
    pub headless: bool,
    /// Timeout for individual CDP requests.
    pub request_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// A running Chrome process and its CDP event handler.
///
/// Call [`close`](Self::close) when done; the harvest does so on every exit path.
pub struct ChromeBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromeBrowser {
    /// Launches Chrome incognito with a German locale.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::LaunchFailed`] when the configuration is
    /// rejected or Chrome cannot be started.
    pub async fn launch(options: &LaunchOptions) -> Result<Self, BrowserError> {
        let mut builder = BrowserConfig::builder();

        // chromiumoxide runs headless unless with_head() is called
        if !options.headless {
            builder = builder.with_head();
        }

        builder = builder
            .request_timeout(options.request_timeout)
            .arg("--incognito")
            .arg("--disable-extensions")
            .arg("--disable-default-apps")
            .arg("--no-first-run")
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--lang=de-DE")
            .arg("--accept-lang=de-DE")
            .arg("--disable-background-timer-throttling")
            .arg("--disable-backgrounding-occluded-windows")
            .arg("--disable-renderer-backgrounding");

        let config = builder.build().map_err(BrowserError::LaunchFailed)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(error) = event {
                    debug!(%error, source = "chromiumoxide", "browser handler event error");
                }
            }
        });

        info!(headless = options.headless, "Browser launched");
        Ok(Self { browser, handler })
    }

    /// Opens a blank page to drive.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::NavigationFailed`] when the page cannot be created.
    pub async fn open_session(&self) -> Result<ChromeSession, BrowserError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::navigation("about:blank", e))?;
        Ok(ChromeSession { page })
    }

    /// Closes Chrome and stops the event handler.
    pub async fn close(mut self) {
        if let Err(error) = self.browser.close().await {
            warn!(%error, "Failed to close browser cleanly");
        }
        if let Err(error) = self.browser.wait().await {
            debug!(%error, "Browser process wait failed");
        }
        self.handler.abort();
        debug!("Browser closed");
    }
}

/// One Chrome page.
#[derive(Clone)]
pub struct ChromeSession {
    page: Page,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::navigation(url, e))?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::interaction(selector, e))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::interaction(selector, e))?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::EvaluationFailed(e.to_string()))?
            .into_value::<Value>()
            .map_err(|e| BrowserError::EvaluationFailed(e.to_string()))
    }

    async fn content(&self) -> Result<String, BrowserError> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::EvaluationFailed(format!("reading page markup: {e}")))
    }

    async fn cookies(&self) -> Result<Vec<BrowserCookie>, BrowserError> {
        let cookies = self
            .page
            .get_cookies()
            .await
            .map_err(|e| BrowserError::CookiesUnavailable(e.to_string()))?;

        Ok(cookies
            .into_iter()
            .map(|cookie| {
                BrowserCookie::new(
                    cookie.name,
                    cookie.value,
                    cookie.domain,
                    cookie.path,
                    cookie.secure,
                )
            })
            .collect())
    }
}
