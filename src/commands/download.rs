//! `adp-docs download`: log in, harvest and download every document.

use std::time::Duration;

use adp_docs_core::config::{DEFAULT_PORTAL_URL, DEFAULT_TIMEOUT_MINUTES};
use adp_docs_core::{Credentials, HarvestOptions, run_harvest};
use anyhow::{Context, Result, bail};
use tracing::info;
use url::Url;

use crate::app_config::{FileConfig, default_download_dir};
use crate::cli::DownloadArgs;

/// Runs the download command with CLI values taking precedence over the file config.
pub async fn run_download_command(args: DownloadArgs, file_config: &FileConfig) -> Result<()> {
    let options = build_options(args, file_config)?;

    info!(
        url = %options.portal_url,
        path = %options.download_dir.display(),
        headless = options.headless,
        timeout_minutes = options.overall_timeout.as_secs() / 60,
        "Starting ADP document download"
    );

    let report = run_harvest(&options)
        .await
        .context("Failed to download documents")?;

    info!(
        count = report.files.len(),
        path = %options.download_dir.display(),
        "All documents downloaded successfully"
    );
    Ok(())
}

fn build_options(args: DownloadArgs, file_config: &FileConfig) -> Result<HarvestOptions> {
    if args.username.trim().is_empty() {
        bail!("Username is empty; pass --username or set ADP_USERNAME");
    }
    if args.password.is_empty() {
        bail!("Password is empty; pass --password or set ADP_PASSWORD");
    }

    let raw_url = args
        .url
        .or_else(|| file_config.url.clone())
        .unwrap_or_else(|| DEFAULT_PORTAL_URL.to_string());
    let portal_url =
        Url::parse(&raw_url).with_context(|| format!("Invalid portal URL '{raw_url}'"))?;

    let download_dir = match args.download_path.or_else(|| file_config.download_dir.clone()) {
        Some(dir) => dir,
        None => default_download_dir()?,
    };

    let mut options = HarvestOptions::new(
        portal_url,
        Credentials::new(args.username, args.password),
        download_dir,
    );
    options.headless = args.headless.or(file_config.headless).unwrap_or(true);
    let timeout_minutes = args
        .timeout
        .or(file_config.timeout_minutes)
        .unwrap_or(DEFAULT_TIMEOUT_MINUTES);
    options.overall_timeout = Duration::from_secs(timeout_minutes * 60);

    Ok(options)
}
