//! The download run: log in, bridge the session, collect links, download.
//!
//! The browser-driven phase (launch, login, cookie transfer, pagination)
//! runs under one overall deadline. Chrome is closed before the downloads
//! start, on success and on every failure path.

mod collector;
mod error;
mod login;

use std::path::PathBuf;

use tokio::time::Instant;
use tracing::{info, instrument};
use url::Url;

pub use collector::{
    DISABLED_CLASS, DOCUMENT_LINK_MARKER, DOCUMENT_TABLE_SELECTOR, LinkCollector, LinkRecord,
    NEXT_PAGE_SELECTOR, PageState, extract_document_links,
};
pub use error::HarvestError;

use crate::auth::bridge_session;
use crate::browser::{BrowserSession, ChromeBrowser, LaunchOptions};
use crate::config::HarvestOptions;
use crate::download::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::download::{HttpClient, download_all};

/// Outcome of a completed download run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    /// Number of document links found across all listing pages.
    pub link_count: usize,
    /// Files written, in link order.
    pub files: Vec<PathBuf>,
}

/// Runs the whole download command against Chrome.
///
/// # Errors
///
/// Returns [`HarvestError::DeadlineExceeded`] when the browser phase outlives
/// `overall_timeout`, and the underlying error for any failing step.
#[instrument(skip(options), fields(portal = %options.portal_url))]
pub async fn run_harvest(options: &HarvestOptions) -> Result<HarvestReport, HarvestError> {
    let origin = portal_origin(&options.portal_url)?;

    tokio::fs::create_dir_all(&options.download_dir)
        .await
        .map_err(|e| HarvestError::io(&options.download_dir, e))?;

    let deadline = Instant::now() + options.overall_timeout;

    let launch = LaunchOptions {
        headless: options.headless,
        ..LaunchOptions::default()
    };
    let browser = tokio::time::timeout_at(deadline, ChromeBrowser::launch(&launch))
        .await
        .map_err(|_| deadline_exceeded(options))??;

    let outcome = browser_phase(&browser, options, &origin, deadline).await;

    browser.close().await;

    let (client, links) = outcome?;

    info!(count = links.len(), "Found document links");
    let files = download_all(&client, &links, &origin, &options.download_dir).await?;

    Ok(HarvestReport {
        link_count: links.len(),
        files,
    })
}

async fn browser_phase(
    browser: &ChromeBrowser,
    options: &HarvestOptions,
    origin: &Url,
    deadline: Instant,
) -> Result<(HttpClient, Vec<LinkRecord>), HarvestError> {
    let session = tokio::time::timeout_at(deadline, browser.open_session())
        .await
        .map_err(|_| deadline_exceeded(options))??;
    harvest_links_within(&session, options, origin, deadline).await
}

/// [`harvest_links`] bounded by the overall run `deadline`.
///
/// Whatever step is in flight when the deadline passes (a readiness wait,
/// a settle pause, a click) is dropped.
///
/// # Errors
///
/// Returns [`HarvestError::DeadlineExceeded`] when `deadline` passes first,
/// otherwise whatever [`harvest_links`] returns.
pub async fn harvest_links_within(
    session: &dyn BrowserSession,
    options: &HarvestOptions,
    origin: &Url,
    deadline: Instant,
) -> Result<(HttpClient, Vec<LinkRecord>), HarvestError> {
    tokio::time::timeout_at(deadline, harvest_links(session, options, origin))
        .await
        .map_err(|_| deadline_exceeded(options))?
}

/// Drives an open browser session from the login page to the full link list.
///
/// Returns the cookie-bridged HTTP client together with the links, so the
/// caller can close the browser before downloading.
///
/// # Errors
///
/// Returns the first failing step's error.
pub async fn harvest_links(
    session: &dyn BrowserSession,
    options: &HarvestOptions,
    origin: &Url,
) -> Result<(HttpClient, Vec<LinkRecord>), HarvestError> {
    login::log_in(
        session,
        options.portal_url.as_str(),
        &options.credentials,
        &options.timings,
    )
    .await?;

    let client = bridge_session(session, origin, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS).await?;

    let links = LinkCollector::new(&options.timings)
        .collect_all(session)
        .await?;

    Ok((client, links))
}

fn deadline_exceeded(options: &HarvestOptions) -> HarvestError {
    HarvestError::DeadlineExceeded {
        timeout: options.overall_timeout,
    }
}

/// Scheme, host and port of `portal_url`, as a URL.
///
/// # Errors
///
/// Returns [`HarvestError::InvalidPortalUrl`] for URLs without a host-based origin.
pub fn portal_origin(portal_url: &Url) -> Result<Url, HarvestError> {
    let invalid = || HarvestError::InvalidPortalUrl {
        url: portal_url.to_string(),
    };

    let origin = portal_url.origin();
    if !origin.is_tuple() {
        return Err(invalid());
    }
    Url::parse(&origin.ascii_serialization()).map_err(|_| invalid())
}
