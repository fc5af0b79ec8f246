//! ADP Docs Core Library
//!
//! This library provides the core functionality for the adp-docs tool,
//! which logs into the ADP employee portal through a real browser, harvests
//! every document from the paginated document list, and later renames the
//! downloaded PDFs after what they are.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`browser`] - Browser capability, Chrome driver, and readiness polling
//! - [`auth`] - Session bridging from browser cookies to the HTTP client
//! - [`harvest`] - Login flow, paginated link collection, and the harvest run
//! - [`download`] - HTTP client, sequential batch downloads, filename allocation
//! - [`classify`] - Document classification and text extraction
//! - [`process`] - Classification pass that renames downloaded documents

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod browser;
pub mod classify;
pub mod config;
pub mod download;
pub mod harvest;
pub mod process;
mod user_agent;

// Re-export commonly used types
pub use auth::{CookieSet, SESSION_COOKIE_ALLOW_LIST, bridge_session};
pub use browser::{
    BrowserCookie, BrowserError, BrowserSession, ChromeBrowser, ReadinessWaiter, WaitCondition,
};
pub use classify::{
    Category, ClassificationResult, ExtractionError, PdfTextExtractor, Period, TextExtractor,
    classify,
};
pub use config::{Credentials, HarvestOptions, HarvestTimings};
pub use download::{DownloadError, FilenameAllocator, HttpClient, allocate_unique_path, download_all};
pub use harvest::{HarvestError, HarvestReport, LinkCollector, LinkRecord, run_harvest};
pub use process::{
    ProcessError, ProcessOptions, ProcessSummary, RenameDecision, process_directory,
};
