//! `adp-docs process`: classify downloaded PDFs and rename them.

use adp_docs_core::{PdfTextExtractor, ProcessOptions, process_directory};
use anyhow::{Context, Result};
use tracing::info;

use crate::app_config::{FileConfig, default_download_dir};
use crate::cli::ProcessArgs;

/// Runs the process command over `--path`, the configured directory, or the default.
///
/// Per-file problems are logged by the pass and do not fail the command.
pub async fn run_process_command(args: ProcessArgs, file_config: &FileConfig) -> Result<()> {
    let dir = match args.path.or_else(|| file_config.download_dir.clone()) {
        Some(dir) => dir,
        None => default_download_dir()?,
    };
    let options = ProcessOptions {
        dir,
        dry_run: args.dry,
    };

    info!(path = %options.dir.display(), dry_run = options.dry_run, "Starting PDF processing");

    let summary = process_directory(&options, &PdfTextExtractor)
        .await
        .context("Failed to process PDFs")?;

    info!(%summary, "All PDFs processed");
    Ok(())
}
