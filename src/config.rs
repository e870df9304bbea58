// src/config.rs
// =============================================================================
// Runtime configuration.
//
// HarvestConfig holds the matching and retry knobs: file name suffix, retry
// budget, retry delay and OAuth scope. RunSettings holds the surrounding
// plumbing (where the key lives, where files go, which API endpoint to use).
// Both are built once in main.rs from the CLI and passed by reference into
// the Traverser, Fetcher and LocalSink.
// =============================================================================

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// File names must end with this (compared case-insensitively) to be harvested.
pub const DEFAULT_MATCH_SUFFIX: &str = "_lane_rate_data_report.csv";

/// Number of download attempts per file, including the first one.
pub const DEFAULT_MAX_DOWNLOAD_RETRIES: u32 = 2;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";

pub const DEFAULT_CREDENTIALS_PATH: &str = "./service_account_secret.json";

pub const DEFAULT_OUTPUT_DIR: &str = "~/Desktop/peruse-demo-data";

/// OAuth scope requested for the service credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadScope {
    /// Read-only access to file metadata and content
    #[default]
    ReadOnly,
}

impl DownloadScope {
    pub fn oauth_scope(&self) -> &'static str {
        match self {
            DownloadScope::ReadOnly => "https://www.googleapis.com/auth/drive.readonly",
        }
    }
}

/// Matching and retry behaviour shared by the Traverser and the Fetcher.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestConfig {
    pub match_suffix: String,
    pub max_download_retries: u32,
    pub retry_delay: Duration,
    pub download_scope: DownloadScope,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            match_suffix: DEFAULT_MATCH_SUFFIX.to_string(),
            max_download_retries: DEFAULT_MAX_DOWNLOAD_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            download_scope: DownloadScope::ReadOnly,
        }
    }
}

impl HarvestConfig {
    /// Case-insensitive suffix test used to pick which files to harvest.
    pub fn matches(&self, name: &str) -> bool {
        name.to_lowercase().ends_with(&self.match_suffix.to_lowercase())
    }
}

/// Everything a single run needs besides the matching rules.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub credentials: PathBuf,
    pub output_dir: PathBuf,
    pub api_base: Url,
    pub concurrency: usize,
    pub strict: bool,
}

impl RunSettings {
    pub fn new(
        credentials: PathBuf,
        output_dir: &str,
        api_base: &str,
        concurrency: usize,
        strict: bool,
    ) -> Result<Self> {
        let parsed = Url::parse(api_base)
            .map_err(|e| anyhow!("Invalid API base URL '{}': {}", api_base, e))?;
        // Endpoints are appended as path segments, so e.g. `data:` or `mailto:` can't work
        if parsed.cannot_be_a_base() {
            return Err(anyhow!("Invalid API base URL '{}': cannot carry a path", api_base));
        }

        Ok(Self {
            credentials,
            output_dir: expand_home(output_dir),
            api_base: parsed,
            concurrency: concurrency.max(1),
            strict,
        })
    }
}

// Expands a leading "~" using $HOME; anything else is taken literally
fn expand_home(path: &str) -> PathBuf {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            let rest = path.trim_start_matches('~').trim_start_matches('/');
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_report_job() {
        let config = HarvestConfig::default();
        assert_eq!(config.match_suffix, "_lane_rate_data_report.csv");
        assert_eq!(config.max_download_retries, 2);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert_eq!(
            config.download_scope.oauth_scope(),
            "https://www.googleapis.com/auth/drive.readonly"
        );
    }

    #[test]
    fn suffix_match_ignores_case() {
        let config = HarvestConfig::default();
        assert!(config.matches("x_lane_rate_data_report.csv"));
        assert!(config.matches("z_LANE_RATE_DATA_REPORT.CSV"));
        assert!(!config.matches("y.csv"));
        assert!(!config.matches("_lane_rate_data_report.csv.bak"));
    }

    #[test]
    fn custom_suffix_is_lowercased_too() {
        let config = HarvestConfig {
            match_suffix: "_Weekly.CSV".to_string(),
            ..Default::default()
        };
        assert!(config.matches("sales_weekly.csv"));
    }

    #[test]
    fn expand_home_keeps_absolute_paths() {
        assert_eq!(expand_home("/tmp/out"), PathBuf::from("/tmp/out"));
        assert_eq!(expand_home("relative/out"), PathBuf::from("relative/out"));
    }

    #[test]
    fn run_settings_reject_bad_api_base() {
        let result = RunSettings::new(PathBuf::from("key.json"), "/tmp", "not a url", 1, false);
        assert!(result.is_err());
    }

    #[test]
    fn run_settings_reject_api_base_without_a_path() {
        for base in ["data:text/plain,drive", "mailto:drive@example.com"] {
            let result = RunSettings::new(PathBuf::from("key.json"), "/tmp", base, 1, false);
            let err = result.unwrap_err().to_string();
            assert!(err.contains("cannot carry a path"), "{}: {}", base, err);
        }
    }

    #[test]
    fn run_settings_clamp_concurrency() {
        let settings = RunSettings::new(
            PathBuf::from("key.json"),
            "/tmp",
            DEFAULT_API_BASE,
            0,
            false,
        )
        .unwrap();
        assert_eq!(settings.concurrency, 1);
    }
}
