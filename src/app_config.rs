//! Application configuration loading for CLI defaults.
//!
//! The optional file uses simple `key = value` lines in TOML syntax:
//!
//! ```toml
//! download_dir = "~/Documents/ADP"
//! url = "https://adpworld.adp.com"
//! headless = false
//! timeout_minutes = 30
//! ```
//!
//! Values given on the command line take precedence.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Directory name under the user's config directory.
const CONFIG_DIR_NAME: &str = "adp-docs";

/// Default download directory, relative to the home directory.
const DEFAULT_DOWNLOAD_SUBDIR: [&str; 2] = ["Downloads", "adpworld.adp.com"];

/// File configuration for adp-docs defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Directory documents are downloaded to and processed in.
    pub download_dir: Option<PathBuf>,
    /// Portal URL.
    pub url: Option<String>,
    /// Run Chrome headless.
    pub headless: Option<bool>,
    /// Overall browser-phase timeout in minutes.
    pub timeout_minutes: Option<u64>,
}

impl FileConfig {
    /// Validates config values against the CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.timeout_minutes
            && !(1..=1440).contains(&timeout)
        {
            bail!("Invalid config value for `timeout_minutes`: {timeout}. Expected range: 1..=1440");
        }
        if let Some(url) = &self.url
            && url::Url::parse(url).is_err()
        {
            bail!("Invalid config value for `url`: '{url}' is not an absolute URL");
        }
        Ok(())
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/adp-docs/config.toml`
/// 2. `$HOME/.config/adp-docs/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(CONFIG_DIR_NAME)
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Default directory for downloads and processing: `~/Downloads/adpworld.adp.com`.
pub fn default_download_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine the home directory")?;
    Ok(DEFAULT_DOWNLOAD_SUBDIR
        .iter()
        .fold(home, |path, part| path.join(part)))
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<Option<FileConfig>> {
    let Some(path) = resolve_default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(None);
    }

    let config = load_file_config(&path)?;
    debug!(path = %path.display(), ?config, "loaded config file");
    Ok(Some(config))
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid config syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let line_number = line_index + 1;

        match key {
            "download_dir" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `download_dir` value on line {line_number}")
                })?;
                cfg.download_dir = Some(expand_home(&parsed));
            }
            "url" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `url` value on line {line_number}"))?;
                cfg.url = Some(parsed);
            }
            "headless" => {
                let parsed = parse_boolean(value)
                    .with_context(|| format!("Invalid `headless` value on line {line_number}"))?;
                cfg.headless = Some(parsed);
            }
            "timeout_minutes" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `timeout_minutes` value on line {line_number}")
                })?;
                cfg.timeout_minutes = Some(parsed);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}

/// Expands a leading `~/` to the home directory.
fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_all_fields() {
        let raw = r#"
            # adp-docs defaults
            download_dir = "/srv/adp" # NAS share
            url = "https://adpworld.adp.com"
            headless = false
            timeout_minutes = 30
        "#;
        let cfg = parse_config_str(raw).unwrap();
        assert_eq!(cfg.download_dir, Some(PathBuf::from("/srv/adp")));
        assert_eq!(cfg.url.as_deref(), Some("https://adpworld.adp.com"));
        assert_eq!(cfg.headless, Some(false));
        assert_eq!(cfg.timeout_minutes, Some(30));
    }

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str("headless = true\n").unwrap();
        assert_eq!(cfg.headless, Some(true));
        assert!(cfg.download_dir.is_none());
        assert!(cfg.url.is_none());
        assert!(cfg.timeout_minutes.is_none());
    }

    #[test]
    fn test_parse_config_empty_is_default() {
        assert_eq!(parse_config_str("").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_parse_config_unknown_key_rejected() {
        let err = parse_config_str("password = \"nope\"").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
    }

    #[test]
    fn test_parse_config_missing_equals_rejected() {
        let err = parse_config_str("headless true").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_parse_config_unquoted_string_rejected() {
        assert!(parse_config_str("url = https://adpworld.adp.com").is_err());
    }

    #[test]
    fn test_parse_config_timeout_out_of_range_rejected() {
        let err = parse_config_str("timeout_minutes = 0").unwrap_err();
        assert!(err.to_string().contains("timeout_minutes"));
        assert!(parse_config_str("timeout_minutes = -5").is_err());
    }

    #[test]
    fn test_parse_config_relative_url_rejected() {
        assert!(parse_config_str("url = \"/login\"").is_err());
    }

    #[test]
    fn test_strip_inline_comment_keeps_hash_inside_string() {
        assert_eq!(
            strip_inline_comment(r#"download_dir = "/tmp/#adp" # comment"#),
            r#"download_dir = "/tmp/#adp" "#
        );
    }

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/srv/adp"), PathBuf::from("/srv/adp"));
    }

    #[test]
    fn test_default_download_dir_ends_with_portal_host() {
        if let Ok(dir) = default_download_dir() {
            assert!(dir.ends_with("Downloads/adpworld.adp.com"));
        }
    }
}
