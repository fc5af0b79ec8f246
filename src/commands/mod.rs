//! CLI command handlers.

mod download;
mod process;

pub use download::run_download_command;
pub use process::run_process_command;
