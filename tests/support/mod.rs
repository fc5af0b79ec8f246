//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use adp_docs_core::browser::{BrowserCookie, BrowserError, BrowserSession};
use adp_docs_core::classify::{ExtractionError, TextExtractor};
use adp_docs_core::harvest::NEXT_PAGE_SELECTOR;
use adp_docs_core::HarvestTimings;
use async_trait::async_trait;
use serde_json::Value;

/// Timings that keep scripted portal runs fast.
pub fn fast_timings() -> HarvestTimings {
    HarvestTimings {
        poll_interval: Duration::from_millis(2),
        wait_timeout: Duration::from_millis(200),
        field_settle: Duration::ZERO,
        dashboard_settle: Duration::ZERO,
        navigation_settle: Duration::ZERO,
        page_settle: Duration::ZERO,
        max_pages: 50,
    }
}

/// Renders one listing page holding `hrefs` plus some unrelated links.
pub fn listing_page(hrefs: &[String]) -> String {
    let rows: String = hrefs
        .iter()
        .map(|href| format!(r#"<tr><td><a href="{href}">PDF</a></td></tr>"#))
        .collect();
    format!(
        r#"<html><body>
            <a href="/AdpwAdpaWeb/logout.xhtml">Abmelden</a>
            <div id="epaysliplist:ePayListForm:ePayslipDocs">
              <div class="ui-datatable-tablewrapper"><table>{rows}</table></div>
            </div>
        </body></html>"#
    )
}

/// Document hrefs for `pages` listing pages with the given sizes.
pub fn paged_hrefs(sizes: &[usize]) -> Vec<Vec<String>> {
    let mut next_id = 1;
    sizes
        .iter()
        .map(|&size| {
            (0..size)
                .map(|_| {
                    let href = format!("/AdpwAdpaWeb/DocDownload?docId={next_id}");
                    next_id += 1;
                    href
                })
                .collect()
        })
        .collect()
}

#[derive(Debug, Default)]
struct PortalState {
    current_page: usize,
    navigations: Vec<String>,
    clicks: Vec<String>,
    filled_values: Vec<String>,
}

/// A scripted stand-in for the portal rendered in a browser.
///
/// It recognises the scripts the harvest evaluates by their shape and
/// answers them from its configuration.
pub struct FakePortal {
    pages: Vec<String>,
    dashboard_text: String,
    login_fields_present: bool,
    endless_pager: bool,
    cookies: Option<Vec<BrowserCookie>>,
    state: Mutex<PortalState>,
}

impl FakePortal {
    /// A portal whose listing has one page per entry of `pages`.
    pub fn with_pages(pages: Vec<Vec<String>>) -> Self {
        Self {
            pages: pages.iter().map(|hrefs| listing_page(hrefs)).collect(),
            dashboard_text: "Startseite\nAlle Dokumente (12)\nHilfe".to_string(),
            login_fields_present: true,
            endless_pager: false,
            cookies: Some(Vec::new()),
            state: Mutex::new(PortalState::default()),
        }
    }

    pub fn with_cookies(mut self, cookies: Vec<BrowserCookie>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    pub fn with_cookie_failure(mut self) -> Self {
        self.cookies = None;
        self
    }

    pub fn with_dashboard_text(mut self, text: &str) -> Self {
        self.dashboard_text = text.to_string();
        self
    }

    pub fn without_login_fields(mut self) -> Self {
        self.login_fields_present = false;
        self
    }

    pub fn with_endless_pager(mut self) -> Self {
        self.endless_pager = true;
        self
    }

    pub fn pages_shown(&self) -> usize {
        self.state.lock().unwrap().current_page + 1
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn filled_values(&self) -> Vec<String> {
        self.state.lock().unwrap().filled_values.clone()
    }

    fn has_next_page(&self, current_page: usize) -> bool {
        self.endless_pager || current_page + 1 < self.pages.len()
    }
}

#[async_trait]
impl BrowserSession for FakePortal {
    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.state.lock().unwrap().navigations.push(url.to_string());
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        state.clicks.push(selector.to_string());
        if selector == NEXT_PAGE_SELECTOR {
            state.current_page += 1;
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        let mut state = self.state.lock().unwrap();

        if script.contains("shadowRoot") {
            if !self.login_fields_present {
                return Ok(Value::Bool(false));
            }
            let value = script
                .split("input.value = ")
                .nth(1)
                .and_then(|rest| rest.split(";\n").next())
                .and_then(|literal| serde_json::from_str::<String>(literal.trim()).ok())
                .unwrap_or_default();
            state.filled_values.push(value);
            return Ok(Value::Bool(true));
        }
        if script.contains("getClientRects") {
            return Ok(Value::Bool(true));
        }
        if script.contains("innerText") {
            return Ok(Value::String(self.dashboard_text.clone()));
        }
        if script.contains("querySelectorAll") {
            state.clicks.push("Alle Dokumente".to_string());
            return Ok(Value::Bool(true));
        }
        if script.contains("classList.contains") {
            return Ok(Value::Bool(self.has_next_page(state.current_page)));
        }

        Err(BrowserError::EvaluationFailed(format!(
            "unexpected script: {script}"
        )))
    }

    async fn content(&self) -> Result<String, BrowserError> {
        let state = self.state.lock().unwrap();
        let index = state.current_page.min(self.pages.len().saturating_sub(1));
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }

    async fn cookies(&self) -> Result<Vec<BrowserCookie>, BrowserError> {
        self.cookies
            .clone()
            .ok_or_else(|| BrowserError::CookiesUnavailable("target closed".to_string()))
    }
}

/// A [`TextExtractor`] answering from a file-name keyed map.
///
/// Files missing from the map fail extraction.
#[derive(Debug, Default)]
pub struct MapExtractor {
    texts: HashMap<String, String>,
}

impl MapExtractor {
    pub fn new<const N: usize>(entries: [(&str, &str); N]) -> Self {
        Self {
            texts: entries
                .into_iter()
                .map(|(name, text)| (name.to_string(), text.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl TextExtractor for MapExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.texts
            .get(&name)
            .cloned()
            .ok_or_else(|| ExtractionError::unreadable(path, "not a PDF"))
    }
}
