//! Sequential download of harvested links under ordinal names.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use url::Url;

use super::client::HttpClient;
use super::constants::{DOCUMENT_EXTENSION, ORDINAL_PREFIX};
use super::error::DownloadError;
use crate::harvest::LinkRecord;

/// Placeholder name for the `n`-th downloaded document (1-based).
#[must_use]
pub fn ordinal_filename(n: usize) -> String {
    format!("{ORDINAL_PREFIX}_{n}.{DOCUMENT_EXTENSION}")
}

/// Resolves a harvested href against the portal origin.
///
/// Absolute links are kept as they are; relative ones are joined onto `origin`.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidUrl`] when the link cannot be joined or
/// does not use http(s).
pub fn resolve_link(link: &LinkRecord, origin: &Url) -> Result<Url, DownloadError> {
    let resolved = origin
        .join(link.as_str())
        .map_err(|_| DownloadError::invalid_url(link.as_str()))?;

    match resolved.scheme() {
        "http" | "https" => Ok(resolved),
        _ => Err(DownloadError::invalid_url(link.as_str())),
    }
}

/// Downloads every link in order into `destination_dir`.
///
/// Links are stored as `adp_{n}.pdf` with increasing `n`, starting at 1.
/// Ordinals already taken in the directory (placeholders left by an earlier
/// run) are skipped, so a repeated run never overwrites or fails on them.
/// The first failure aborts the batch; files written before it are kept.
///
/// # Errors
///
/// Returns the first [`DownloadError`] encountered, naming the failing URL
/// or path.
#[instrument(skip(client, links), fields(count = links.len(), dir = %destination_dir.display()))]
pub async fn download_all(
    client: &HttpClient,
    links: &[LinkRecord],
    origin: &Url,
    destination_dir: &Path,
) -> Result<Vec<PathBuf>, DownloadError> {
    let total = links.len();
    let mut written = Vec::with_capacity(total);
    let mut ordinal = 0;

    for (index, link) in links.iter().enumerate() {
        let url = resolve_link(link, origin)?;
        ordinal = next_free_ordinal(destination_dir, ordinal + 1);
        let path = destination_dir.join(ordinal_filename(ordinal));

        info!(
            progress = %format_args!("{}/{total}", index + 1),
            path = %path.display(),
            "Downloading document"
        );
        let bytes = client.download_to_path(url.as_str(), &path).await?;
        debug!(bytes, path = %path.display(), "document saved");

        written.push(path);
    }

    info!(count = written.len(), "All documents downloaded");
    Ok(written)
}

/// The first ordinal at or after `from` whose placeholder name is free in `dir`.
fn next_free_ordinal(dir: &Path, from: usize) -> usize {
    let mut ordinal = from;
    while dir.join(ordinal_filename(ordinal)).exists() {
        debug!(ordinal, "placeholder name taken; skipping");
        ordinal += 1;
    }
    ordinal
}
