//! End-to-end CLI tests for the adp-docs binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Builds the binary with an isolated config directory and no portal credentials.
fn adp_docs(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("adp-docs").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("ADP_USERNAME")
        .env_remove("ADP_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let config_home = TempDir::new().unwrap();
    adp_docs(&config_home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ADP employee portal"))
        .stdout(predicate::str::contains("download"))
        .stdout(predicate::str::contains("process"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let config_home = TempDir::new().unwrap();
    adp_docs(&config_home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("adp-docs"));
}

/// Test that a missing subcommand is rejected.
#[test]
fn test_binary_without_subcommand_fails() {
    let config_home = TempDir::new().unwrap();
    adp_docs(&config_home).assert().failure();
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let config_home = TempDir::new().unwrap();
    adp_docs(&config_home)
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_process_dry_run_on_empty_directory_succeeds() {
    let config_home = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();
    adp_docs(&config_home)
        .args(["process", "--dry", "--path"])
        .arg(downloads.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Found PDF files"))
        .stderr(predicate::str::contains("0 files: 0 renamed"));
}

#[test]
fn test_process_dry_run_leaves_files_alone() {
    let config_home = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();
    std::fs::write(downloads.path().join("notes.txt"), b"not a pdf").unwrap();

    adp_docs(&config_home)
        .args(["-q", "process", "--dry", "--path"])
        .arg(downloads.path())
        .assert()
        .success();

    assert!(downloads.path().join("notes.txt").exists());
}

#[test]
fn test_process_missing_directory_fails() {
    let config_home = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();
    adp_docs(&config_home)
        .args(["process", "--path"])
        .arg(downloads.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("directory does not exist"));
}

#[test]
fn test_process_uses_download_dir_from_config_file() {
    let config_home = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();
    let config_dir = config_home.path().join("adp-docs");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!(
            "download_dir = \"{}\"\n",
            downloads.path().join("missing").display()
        ),
    )
    .unwrap();

    // The configured directory does not exist, so the run must fail on it.
    adp_docs(&config_home)
        .arg("process")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing"));
}

#[test]
fn test_download_without_credentials_fails() {
    let config_home = TempDir::new().unwrap();
    adp_docs(&config_home)
        .arg("download")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--username"));
}

#[test]
fn test_download_rejects_out_of_range_timeout() {
    let config_home = TempDir::new().unwrap();
    adp_docs(&config_home)
        .args(["download", "-u", "user", "-p", "secret", "--timeout", "0"])
        .assert()
        .failure();
}
