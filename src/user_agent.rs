//! Shared User-Agent string for the bridged download client.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/adp-docs";

/// Default User-Agent for document downloads (identifies the tool).
#[must_use]
pub(crate) fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("adp-docs/{version} (document-archiver; +{PROJECT_UA_URL})")
}
