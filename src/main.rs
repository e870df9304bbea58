// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments and set up logging
// 2. Load credentials and build the Drive client
// 3. Dispatch to `sync` (default) or `list`
// 4. Exit with the right code
//
// Exit codes:
//   default mode: always 0; errors are printed and the run just ends
//   --strict:     0 = all good, 1 = some downloads failed, 2 = error
// =============================================================================

mod cli;
mod config;
mod drive;
mod error;
mod fetch;
mod harvest;
mod sink;
mod traverse;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands, GlobalOptions};
use config::{HarvestConfig, RunSettings};
use drive::{FileMatch, HttpDrive, ServiceAccountAuth, StaticToken, TokenProvider};
use harvest::HarvestReport;
use sink::LocalSink;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.options.verbose);

    // Read before `run` takes ownership of the parsed CLI
    let strict = cli.options.strict;
    let result = run(cli).await;

    if let Err(e) = &result {
        // Errors go to stdout alongside the rest of the run's output
        println!("Error: {:#}", e);
    }

    std::process::exit(exit_code(&result, strict));
}

/// Turns the outcome of a whole run into the process exit code.
fn exit_code(result: &Result<i32>, strict: bool) -> i32 {
    match result {
        Ok(code) => *code,
        // Lenient mode swallows the error after printing it
        Err(_) if strict => 2,
        Err(_) => 0,
    }
}

// Only --strict turns failed downloads into a non-zero exit
fn sync_exit_code(report: &HarvestReport, strict: bool) -> i32 {
    if strict && report.has_failures() {
        1
    } else {
        0
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    let config = cli.options.harvest_config();
    let settings = cli.options.run_settings()?;

    // One HTTP client shared by the token exchange and every Drive request
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("Failed to create HTTP client")?;

    let tokens = token_provider(&cli.options, &settings, &config, client.clone())?;
    let drive = HttpDrive::new(client, settings.api_base.clone(), tokens);

    // No subcommand means sync, so a bare invocation does the whole job
    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => handle_sync(&drive, &config, &settings).await,
        Commands::List { json } => handle_list(&drive, &config, json).await,
    }
}

// Picks the static token when one was given, otherwise the service-account key
fn token_provider(
    options: &GlobalOptions,
    settings: &RunSettings,
    config: &HarvestConfig,
    client: Client,
) -> Result<Arc<dyn TokenProvider>> {
    if let Some(token) = &options.access_token {
        return Ok(Arc::new(StaticToken::new(token.clone())));
    }

    let auth = ServiceAccountAuth::from_file(client, &settings.credentials, config.download_scope)
        .context("Failed to load service account credentials")?;
    tracing::info!("Authenticating as {}", auth.client_email());
    Ok(Arc::new(auth))
}

async fn handle_sync(drive: &HttpDrive, config: &HarvestConfig, settings: &RunSettings) -> Result<i32> {
    let sink = LocalSink::open(&settings.output_dir)
        .await
        .context("Failed to prepare output directory")?;

    println!("📁 Output directory: {}", sink.output_dir().display());

    let report = harvest::sync(drive, config, &sink, settings.concurrency).await?;
    print_summary(&report);

    Ok(sync_exit_code(&report, settings.strict))
}

async fn handle_list(drive: &HttpDrive, config: &HarvestConfig, json: bool) -> Result<i32> {
    let files = harvest::list_matches(drive, config)
        .await
        .context("Failed to enumerate shared files")?;

    print_matches(&files, json)?;
    Ok(0)
}

// Prints the matches either as a table or JSON
fn print_matches(files: &[FileMatch], json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(files)?;
        println!("{}", json_output);
        return Ok(());
    }

    // Table header, same widths as the rows below
    println!("{:<45} {:<60}", "ID", "NAME");
    println!("{}", "=".repeat(105));
    for file in files {
        println!("{:<45} {:<60}", file.id, file.name);
    }
    println!();
    println!("📋 Total: {}", files.len());
    Ok(())
}

fn print_summary(report: &HarvestReport) {
    println!();
    println!("📊 Summary:");
    println!("   📋 Found: {}", report.found);
    println!("   ✅ Saved: {}", report.saved);
    println!("   ⚪ Empty: {}", report.empty);
    println!("   ❌ Failed: {}", report.failed);
    if report.rejected > 0 {
        println!("   🚫 Rejected names: {}", report.rejected);
    }
    for name in &report.failed_files {
        println!("      - {}", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn lenient_mode_exits_zero_on_error() {
        let result: Result<i32> = Err(anyhow!("listing failed"));
        assert_eq!(exit_code(&result, false), 0);
    }

    #[test]
    fn strict_mode_exits_two_on_error() {
        let result: Result<i32> = Err(anyhow!("listing failed"));
        assert_eq!(exit_code(&result, true), 2);
    }

    #[test]
    fn strict_mode_exits_one_when_a_download_failed() {
        let report = HarvestReport {
            found: 2,
            saved: 1,
            failed: 1,
            failed_files: vec!["b_lane_rate_data_report.csv".to_string()],
            ..Default::default()
        };

        let code = sync_exit_code(&report, true);
        assert_eq!(code, 1);
        assert_eq!(exit_code(&Ok(code), true), 1);
        // The same report is not an error without --strict
        assert_eq!(sync_exit_code(&report, false), 0);
    }

    #[test]
    fn strict_mode_exits_zero_on_a_clean_run() {
        let report = HarvestReport {
            found: 2,
            saved: 1,
            empty: 1,
            ..Default::default()
        };

        let code = sync_exit_code(&report, true);
        assert_eq!(code, 0);
        assert_eq!(exit_code(&Ok(code), true), 0);
    }
}
