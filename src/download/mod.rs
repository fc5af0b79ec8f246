//! Document download over the bridged HTTP client.
//!
//! This module fetches the harvested document links one at a time and
//! streams each body to disk under an ordinal placeholder name. Final,
//! semantic names are assigned later by the [`process`](crate::process) pass.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Relative link resolution against the portal origin
//! - First failure aborts the batch (later files share the same session)
//! - Ordinal names already on disk are skipped, never overwritten
//!
//! # Example
//!
//! ```no_run
//! use adp_docs_core::download::{HttpClient, download_all};
//! use adp_docs_core::harvest::LinkRecord;
//! use std::path::Path;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let origin = Url::parse("https://adpworld.adp.com")?;
//! let links = vec![LinkRecord::new("/AdpwAdpaWeb/DocDownload?id=1")];
//! let paths = download_all(&client, &links, &origin, Path::new("./downloads")).await?;
//! println!("Downloaded {} files", paths.len());
//! # Ok(())
//! # }
//! ```

mod batch;
mod client;
pub mod constants;
mod error;
pub mod filename;

pub use batch::{download_all, ordinal_filename, resolve_link};
pub use client::HttpClient;
pub use error::DownloadError;
pub use filename::{
    DISAMBIGUATING_SUFFIX, FilenameAllocator, allocate_unique_path, carries_proposed_name,
};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
