//! CLI argument definitions using clap derive macros.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Download and file documents from the ADP employee portal.
///
/// `download` logs into the portal through Chrome and saves every document
/// from the "Alle Dokumente" list; `process` renames the downloaded PDFs
/// after what they are.
#[derive(Parser, Debug)]
#[command(name = "adp-docs")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log into the portal and download every document as adp_<n>.pdf
    Download(DownloadArgs),

    /// Classify downloaded PDFs and rename them after their content
    Process(ProcessArgs),
}

/// Arguments for `adp-docs download`.
#[derive(clap::Args)]
pub struct DownloadArgs {
    /// Portal URL [default: https://adpworld.adp.com]
    #[arg(long)]
    pub url: Option<String>,

    /// Portal username
    #[arg(short = 'u', long, env = "ADP_USERNAME")]
    pub username: String,

    /// Portal password
    #[arg(short = 'p', long, env = "ADP_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Run the browser without a window (`--headless=false` to watch it) [default: true]
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = clap::value_parser!(bool)
    )]
    pub headless: Option<bool>,

    /// Directory to save documents to [default: ~/Downloads/adpworld.adp.com]
    #[arg(long)]
    pub download_path: Option<PathBuf>,

    /// Overall timeout for the browser phase in minutes (1-1440) [default: 15]
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=1440))]
    pub timeout: Option<u64>,
}

impl fmt::Debug for DownloadArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadArgs")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("headless", &self.headless)
            .field("download_path", &self.download_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Arguments for `adp-docs process`.
#[derive(clap::Args, Debug)]
pub struct ProcessArgs {
    /// Directory containing the PDFs [default: ~/Downloads/adpworld.adp.com]
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Log the renames without performing them
    #[arg(long)]
    pub dry: bool,
}
