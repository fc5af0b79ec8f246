//! CLI entry point for adp-docs.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

mod app_config;
mod cli;
mod commands;

use cli::{Args, Command};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    init_tracing(args.verbose, args.quiet);
    debug!(?args, "CLI arguments parsed");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Priority: `RUST_LOG` env var > quiet flag > verbose flag > default (info).
fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let file_config = app_config::load_default_file_config()?.unwrap_or_default();

    match args.command {
        Command::Download(download) => {
            commands::run_download_command(download, &file_config).await
        }
        Command::Process(process) => commands::run_process_command(process, &file_config).await,
    }
}
