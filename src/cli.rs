// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Running `drive-harvest` with no subcommand does a full sync with the
// defaults, which is the classic "run it from cron" mode. Every knob has a
// flag; the key file, token and output directory can also come from the
// environment.
// =============================================================================

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{
    DownloadScope, HarvestConfig, RunSettings, DEFAULT_API_BASE, DEFAULT_CREDENTIALS_PATH,
    DEFAULT_MATCH_SUFFIX, DEFAULT_MAX_DOWNLOAD_RETRIES, DEFAULT_OUTPUT_DIR,
};

#[derive(Parser, Debug)]
#[command(
    name = "drive-harvest",
    version,
    about = "Download lane-rate report files shared with a Google service account",
    long_about = "drive-harvest walks every folder shared with a service account, picks the files \
                  whose names end with a report suffix, and downloads them into a local directory."
)]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    /// Defaults to `sync` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Find matching files, download them and write them to the output directory
    ///
    /// Example: drive-harvest sync --output-dir ./reports
    Sync,

    /// Only list the matching files, without downloading anything
    ///
    /// Example: drive-harvest list --json
    List {
        /// Output the matches as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Path to the service-account JSON key
    #[arg(long, global = true, env = "DRIVE_HARVEST_CREDENTIALS", default_value = DEFAULT_CREDENTIALS_PATH)]
    pub credentials: PathBuf,

    /// Use this OAuth access token instead of the service-account key
    #[arg(long, global = true, env = "DRIVE_HARVEST_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Directory the downloaded files are written to (created if missing)
    #[arg(long, global = true, env = "DRIVE_HARVEST_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: String,

    /// Only files whose name ends with this (case-insensitive) are harvested
    #[arg(long, global = true, default_value = DEFAULT_MATCH_SUFFIX)]
    pub match_suffix: String,

    /// Download attempts per file, the first one included
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DOWNLOAD_RETRIES)]
    pub max_retries: u32,

    /// Pause between download attempts (e.g. "1s", "500ms")
    #[arg(long, global = true, default_value = "1s", value_parser = humantime::parse_duration)]
    pub retry_delay: Duration,

    /// Number of files downloaded at the same time
    #[arg(long, global = true, default_value_t = 1)]
    pub concurrency: usize,

    /// Exit non-zero on errors and failed downloads instead of just logging them
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log every listed entry and token request
    #[arg(short, long, global = true)]
    pub verbose: bool,

    // Hidden: only useful for pointing tests or a proxy at another endpoint
    #[arg(long, global = true, default_value = DEFAULT_API_BASE, hide = true)]
    pub api_base: String,
}

impl GlobalOptions {
    pub fn harvest_config(&self) -> HarvestConfig {
        // Read-only is the only scope there is, so it has no flag
        HarvestConfig {
            match_suffix: self.match_suffix.clone(),
            max_download_retries: self.max_retries,
            retry_delay: self.retry_delay,
            download_scope: DownloadScope::ReadOnly,
        }
    }

    // Fails only on a bad --api-base; paths are checked when first used
    pub fn run_settings(&self) -> Result<RunSettings> {
        RunSettings::new(
            self.credentials.clone(),
            &self.output_dir,
            &self.api_base,
            self.concurrency,
            self.strict,
        )
    }
}
