//! Plain-text extraction from downloaded documents.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Text could not be extracted from a file.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a PDF the extractor understands.
    #[error("cannot extract text from {path}: {reason}")]
    Unreadable {
        /// The file involved.
        path: PathBuf,
        /// Parser-reported cause.
        reason: String,
    },
}

impl ExtractionError {
    /// Creates an unreadable-document error.
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Unreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// A document's text together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// The file the text was read from.
    pub source_path: PathBuf,
    /// Extracted plain text.
    pub text: String,
}

/// Turns a document file into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extracts the text of the document at `path`.
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError>;

    /// Extracts the text and pairs it with its source path.
    async fn extract_document(&self, path: &Path) -> Result<ExtractedDocument, ExtractionError> {
        let text = self.extract(path).await?;
        Ok(ExtractedDocument {
            source_path: path.to_path_buf(),
            text,
        })
    }
}

/// [`TextExtractor`] for PDF files, backed by `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // Parsing is CPU-bound and synchronous.
        let owned_path = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| ExtractionError::unreadable(&owned_path, e))?
            .map_err(|e| ExtractionError::unreadable(&owned_path, e))?;

        debug!(path = %path.display(), chars = text.chars().count(), "extracted text");
        Ok(text)
    }
}
