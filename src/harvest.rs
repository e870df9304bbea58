// src/harvest.rs
// =============================================================================
// Orchestration for one run: enumerate -> fetch -> persist.
//
// 1. Ask the Traverser for every matching file under "Shared with me"
// 2. Hand each match to the Fetcher (one at a time unless --concurrency > 1)
// 3. Write non-empty content through the LocalSink
// 4. Tally what happened to each file in a HarvestReport
//
// A failed download only affects its own file. A listing failure stops the
// run before anything is downloaded.
// =============================================================================

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::config::HarvestConfig;
use crate::drive::{FileMatch, FolderContext, RemoteDrive};
use crate::error::{ListingError, SinkError};
use crate::fetch::{DownloadOutcome, Fetcher};
use crate::sink::LocalSink;
use crate::traverse::Traverser;

/// Per-run counts, printed at the end of `sync`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub found: usize,
    pub saved: usize,
    pub empty: usize,
    pub failed: usize,
    pub rejected: usize,
    /// Names of files whose download never succeeded
    pub failed_files: Vec<String>,
}

impl HarvestReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Walks the shared tree and returns every matching file.
pub async fn list_matches<D>(drive: &D, config: &HarvestConfig) -> Result<Vec<FileMatch>, ListingError>
where
    D: RemoteDrive + ?Sized,
{
    info!("--- STARTING GOOGLE DRIVE FILE SEARCH ---");
    let files = Traverser::new(drive, config)
        .enumerate(FolderContext::Root)
        .await?;
    info!("--- FOUND {} FILES IN TOTAL ---", files.len());
    Ok(files)
}

/// Downloads `files` and writes each non-empty one through `sink`.
pub async fn download_all<D>(
    drive: &D,
    config: &HarvestConfig,
    sink: &LocalSink,
    files: Vec<FileMatch>,
    concurrency: usize,
) -> Result<HarvestReport>
where
    D: RemoteDrive + ?Sized,
{
    info!("--- DOWNLOADING {} FILES ---", files.len());

    let fetcher = Fetcher::new(drive, config);
    // Borrowed by every future below; `move` then copies the reference, not the Fetcher
    let fetcher = &fetcher;
    let mut report = HarvestReport {
        found: files.len(),
        ..Default::default()
    };

    let mut downloads = stream::iter(files)
        .map(move |file| async move {
            let outcome = fetcher.fetch(&file).await;
            (file, outcome)
        })
        // At most `concurrency` fetches in flight; results arrive in completion order
        .buffer_unordered(concurrency.max(1));

    while let Some((file, outcome)) = downloads.next().await {
        match outcome {
            DownloadOutcome::Content(bytes) => match sink.write(&file.name, &bytes).await {
                Ok(_) => report.saved += 1,
                // A bad name only costs this one file
                Err(SinkError::UnsafeName(name)) => {
                    warn!("Skipping {} ({}): unsafe file name", name, file.id);
                    report.rejected += 1;
                }
                // Disk full, permissions and the like: later writes would fail too
                Err(err) => {
                    return Err(err).with_context(|| format!("Failed to save {}", file.name));
                }
            },
            DownloadOutcome::Empty => report.empty += 1,
            DownloadOutcome::Failed => {
                error!("Skipping {} ({}): download failed", file.name, file.id);
                report.failed += 1;
                report.failed_files.push(file.name);
            }
        }
    }

    Ok(report)
}

/// Full pass: enumerate everything, then download and persist it.
pub async fn sync<D>(
    drive: &D,
    config: &HarvestConfig,
    sink: &LocalSink,
    concurrency: usize,
) -> Result<HarvestReport>
where
    D: RemoteDrive + ?Sized,
{
    let files = list_matches(drive, config)
        .await
        .context("Failed to enumerate shared files")?;

    download_all(drive, config, sink, files, concurrency).await
}
