//! Paginated document-link collection.
//!
//! The portal lists documents in a PrimeFaces data table, a page at a time.
//! Each page's markup is read from the browser and parsed locally; the
//! pager's "next" control is then checked and clicked until it is missing
//! or disabled.

use std::fmt;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, info};

use super::HarvestError;
use crate::browser::{BrowserSession, ReadinessWaiter, WaitCondition, js_string};
use crate::config::HarvestTimings;

/// Rendered document table on the "Alle Dokumente" page.
pub const DOCUMENT_TABLE_SELECTOR: &str =
    r"#epaysliplist\:ePayListForm\:ePayslipDocs > div.ui-datatable-tablewrapper > table";

/// Pager control leading to the next page.
pub const NEXT_PAGE_SELECTOR: &str = r#"a[aria-label="Nächste Seite"]"#;

/// Class the pager puts on the next control once the last page is shown.
pub const DISABLED_CLASS: &str = "ui-state-disabled";

/// Path fragment shared by every document download link.
pub const DOCUMENT_LINK_MARKER: &str = "/AdpwAdpaWeb/DocDownload";

#[allow(clippy::expect_used)]
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// A document link as found in the listing (absolute or relative).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkRecord(String);

impl LinkRecord {
    /// Wraps an href.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self(href.into())
    }

    /// The href as found in the markup.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the collector stands in the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    /// 1-based number of the page currently shown.
    pub page_number: u32,
    /// Whether the pager offers an enabled next control.
    pub has_next: bool,
}

/// Walks the document listing page by page.
#[derive(Debug, Clone)]
pub struct LinkCollector {
    waiter: ReadinessWaiter,
    timings: HarvestTimings,
    table: WaitCondition,
}

impl LinkCollector {
    /// Creates a collector using `timings` for waits, settling and the page bound.
    #[must_use]
    pub fn new(timings: &HarvestTimings) -> Self {
        Self {
            waiter: ReadinessWaiter::new(timings.poll_interval),
            timings: *timings,
            table: WaitCondition::visible(DOCUMENT_TABLE_SELECTOR),
        }
    }

    /// Collects every document link across all pages, page-major.
    ///
    /// Links are not deduplicated.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Browser`] when the table does not render or
    /// the pager cannot be read or clicked, and
    /// [`HarvestError::PageLimitExceeded`] when the pager never ends.
    pub async fn collect_all(
        &self,
        session: &dyn BrowserSession,
    ) -> Result<Vec<LinkRecord>, HarvestError> {
        let mut links = Vec::new();
        let mut state = PageState {
            page_number: 1,
            has_next: true,
        };

        self.waiter
            .wait_for(session, &self.table, self.timings.wait_timeout)
            .await?;

        loop {
            info!(page = state.page_number, "Processing document page");

            let html = session.content().await?;
            debug!(page = state.page_number, "Parsing HTML for document links");
            let page_links = extract_document_links(&html);
            info!(
                page = state.page_number,
                count = page_links.len(),
                "Found document links on current page"
            );
            links.extend(page_links);

            state.has_next = next_page_available(session).await?;
            if !state.has_next {
                info!(total_pages = state.page_number, "Reached last page");
                break;
            }
            if state.page_number >= self.timings.max_pages {
                return Err(HarvestError::PageLimitExceeded {
                    max_pages: self.timings.max_pages,
                });
            }

            info!("Navigating to next page");
            session.click(NEXT_PAGE_SELECTOR).await?;
            tokio::time::sleep(self.timings.page_settle).await;
            self.waiter
                .wait_for(session, &self.table, self.timings.wait_timeout)
                .await?;
            state.page_number += 1;
        }

        info!(count = links.len(), "Total document links found across all pages");
        Ok(links)
    }
}

/// Every `a[href]` in `html` whose href contains [`DOCUMENT_LINK_MARKER`],
/// in document order.
#[must_use]
pub fn extract_document_links(html: &str) -> Vec<LinkRecord> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| href.contains(DOCUMENT_LINK_MARKER))
        .map(LinkRecord::new)
        .collect()
}

async fn next_page_available(session: &dyn BrowserSession) -> Result<bool, HarvestError> {
    let script = format!(
        "(function() {{
            const next = document.querySelector({selector});
            return next !== null && !next.classList.contains({disabled});
        }})()",
        selector = js_string(NEXT_PAGE_SELECTOR),
        disabled = js_string(DISABLED_CLASS),
    );
    let value = session.evaluate(&script).await?;
    Ok(value == Value::Bool(true))
}
