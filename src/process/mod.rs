//! The process pass: classify downloaded PDFs and rename them in place.
//!
//! Files are handled one at a time in name order. A file that cannot be
//! read, classified or renamed is logged and skipped; only a missing or
//! unreadable directory fails the pass. A dry run makes the same decisions
//! as a live run and logs them without touching the disk.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::classify::{Category, TextExtractor, classify};
use crate::download::{FilenameAllocator, carries_proposed_name};

/// Extension of the files the pass picks up (case-sensitive).
const PDF_EXTENSION: &str = "pdf";

/// Directory-level failures of the process pass.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The directory does not exist.
    #[error("directory does not exist: {path}")]
    MissingDirectory {
        /// The directory that was asked for.
        path: PathBuf,
    },

    /// The path exists but is not a directory.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The directory could not be listed.
    #[error("failed to list PDF files in {path}: {source}")]
    ReadDir {
        /// The directory being listed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Inputs of the process pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Directory holding the downloaded PDFs.
    pub dir: PathBuf,
    /// Log decisions without renaming anything.
    pub dry_run: bool,
}

/// A rename decided by the pass, by file name within the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameDecision {
    /// Current file name.
    pub from: String,
    /// Name the file gets (or would get in a dry run).
    pub to: String,
}

/// What the pass did, by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    /// PDF files found.
    pub total: usize,
    /// Files renamed.
    pub renamed: usize,
    /// Files that would have been renamed (dry run).
    pub would_rename: usize,
    /// Files already carrying their canonical name.
    pub already_named: usize,
    /// Files whose text matched no rule.
    pub unrecognized: usize,
    /// Recognised files whose billing month could not be read.
    pub incomplete: usize,
    /// Files whose text could not be extracted.
    pub extraction_failures: usize,
    /// Renames that failed or had no free target name.
    pub rename_failures: usize,
    /// Renames performed, or planned in a dry run, in processing order.
    pub renames: Vec<RenameDecision>,
}

impl fmt::Display for ProcessSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files: {} renamed, {} would rename, {} already named, {} unrecognized, \
             {} incomplete, {} unreadable, {} rename failures",
            self.total,
            self.renamed,
            self.would_rename,
            self.already_named,
            self.unrecognized,
            self.incomplete,
            self.extraction_failures,
            self.rename_failures,
        )
    }
}

/// Classifies every `*.pdf` in `options.dir` and renames it to its canonical name.
///
/// # Errors
///
/// Returns [`ProcessError`] only when the directory is missing or cannot be
/// listed. Per-file problems are logged and counted in the summary.
#[instrument(skip(options, extractor), fields(path = %options.dir.display(), dry_run = options.dry_run))]
pub async fn process_directory(
    options: &ProcessOptions,
    extractor: &dyn TextExtractor,
) -> Result<ProcessSummary, ProcessError> {
    let files = list_pdf_files(&options.dir).await?;
    info!(count = files.len(), "Found PDF files");

    let mut summary = ProcessSummary {
        total: files.len(),
        ..ProcessSummary::default()
    };
    let mut allocator = FilenameAllocator::new();

    for (index, source) in files.iter().enumerate() {
        let filename = display_name(source);
        info!(
            progress = %format_args!("{}/{}", index + 1, files.len()),
            filename = %filename,
            "Processing PDF"
        );

        let document = match extractor.extract_document(source).await {
            Ok(document) => document,
            Err(error) => {
                warn!(filename = %filename, %error, "Failed to extract text from PDF");
                summary.extraction_failures += 1;
                continue;
            }
        };

        let result = classify(&document.text);
        let Some(proposed_name) = result.proposed_name.as_deref() else {
            if result.category == Category::Unrecognized {
                info!(filename = %filename, "Not a recognized document type");
                summary.unrecognized += 1;
            } else {
                warn!(
                    filename = %filename,
                    category = %result.category,
                    "Recognized document but couldn't extract month/year"
                );
                summary.incomplete += 1;
            }
            continue;
        };

        let proposed = options.dir.join(proposed_name);
        if carries_proposed_name(source, &proposed) {
            info!(filename = %filename, "Already named canonically");
            summary.already_named += 1;
            continue;
        }

        let Some(target) = allocator.allocate(&proposed) else {
            error!(
                filename = %filename,
                new_filename = %proposed_name,
                "Target name and its _2 variant are both taken; leaving file in place"
            );
            summary.rename_failures += 1;
            continue;
        };
        let new_filename = display_name(&target);
        info!(
            filename = %filename,
            category = %result.category,
            period = ?result.period.as_ref().map(ToString::to_string),
            is_correction = result.is_correction,
            new_filename = %new_filename,
            "Classified document"
        );

        if options.dry_run {
            info!(filename = %filename, new_filename = %new_filename, "Would rename");
            allocator.release(source);
            summary.would_rename += 1;
            summary.renames.push(RenameDecision {
                from: filename,
                to: new_filename,
            });
            continue;
        }

        match tokio::fs::rename(source, &target).await {
            Ok(()) => {
                info!(old = %filename, new = %new_filename, "Renamed file successfully");
                allocator.release(source);
                summary.renamed += 1;
                summary.renames.push(RenameDecision {
                    from: filename,
                    to: new_filename,
                });
            }
            Err(error) => {
                error!(filename = %filename, %error, "Failed to rename file");
                allocator.unreserve(&target);
                summary.rename_failures += 1;
            }
        }
    }

    info!(%summary, "PDF processing finished");
    Ok(summary)
}

/// Lists the regular `*.pdf` files directly inside `dir`, sorted by name.
async fn list_pdf_files(dir: &Path) -> Result<Vec<PathBuf>, ProcessError> {
    let metadata = match tokio::fs::metadata(dir).await {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProcessError::MissingDirectory {
                path: dir.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(ProcessError::ReadDir {
                path: dir.to_path_buf(),
                source,
            });
        }
    };
    if !metadata.is_dir() {
        return Err(ProcessError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let read_dir_error = |source| ProcessError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_dir_error)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
        let path = entry.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext == PDF_EXTENSION);
        if is_pdf && entry.file_type().await.is_ok_and(|kind| kind.is_file()) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_pdf_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["adp_2.pdf", "adp_10.pdf", "adp_1.pdf", "notes.txt", "scan.PDF"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("archive.pdf")).unwrap();

        let files = list_pdf_files(dir.path()).await.unwrap();
        let names: Vec<String> = files.iter().map(|p| display_name(p)).collect();
        assert_eq!(names, vec!["adp_1.pdf", "adp_10.pdf", "adp_2.pdf"]);
    }

    #[tokio::test]
    async fn test_list_pdf_files_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let result = list_pdf_files(&missing).await;
        assert!(matches!(result, Err(ProcessError::MissingDirectory { .. })));
    }

    #[tokio::test]
    async fn test_list_pdf_files_rejects_file_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("adp_1.pdf");
        std::fs::write(&file, b"x").unwrap();
        let result = list_pdf_files(&file).await;
        assert!(matches!(result, Err(ProcessError::NotADirectory { .. })));
    }

    #[test]
    fn test_summary_display_lists_every_outcome() {
        let summary = ProcessSummary {
            total: 4,
            renamed: 2,
            unrecognized: 1,
            extraction_failures: 1,
            ..ProcessSummary::default()
        };
        let text = summary.to_string();
        assert!(text.starts_with("4 files: 2 renamed"), "{text}");
        assert!(text.contains("1 unrecognized"));
        assert!(text.contains("1 unreadable"));
    }
}
