// src/fetch/download.rs
// =============================================================================
// Downloads one file's bytes, retrying transport failures.
//
// Per call the state machine is:
//   Start -> Downloading -> Complete(non-empty)  => Content
//                        -> Complete(empty)      => Empty (never retried)
//                        -> TransportError       => retry or Failed
//
// Each attempt opens a brand new stream into a brand new buffer; bytes from a
// failed attempt are thrown away, never resumed.
// =============================================================================

use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::HarvestConfig;
use crate::drive::{FileMatch, RemoteDrive};
use crate::error::TransportError;

/// How a single fetch ended. Exactly one per call, never partial bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Content(Vec<u8>),
    /// The transfer succeeded but the file has no bytes
    Empty,
    /// Every attempt hit a transport error
    Failed,
}

pub struct Fetcher<'a, D: RemoteDrive + ?Sized> {
    drive: &'a D,
    config: &'a HarvestConfig,
}

impl<'a, D: RemoteDrive + ?Sized> Fetcher<'a, D> {
    pub fn new(drive: &'a D, config: &'a HarvestConfig) -> Self {
        Self { drive, config }
    }

    /// Fetches a matched file using the configured retry budget.
    pub async fn fetch(&self, file: &FileMatch) -> DownloadOutcome {
        self.fetch_with_retries(&file.id, &file.name, self.config.max_download_retries)
            .await
    }

    /// `max_retries` counts attempts, the first one included.
    pub async fn fetch_with_retries(&self, id: &str, name: &str, max_retries: u32) -> DownloadOutcome {
        let mut attempts = 0;

        // attempts only counts failures; success and Empty return straight away
        while attempts < max_retries {
            match self.download_once(id, name).await {
                Ok(content) if content.is_empty() => {
                    info!("{} ({}) is empty. Skipping download.", name, id);
                    return DownloadOutcome::Empty;
                }
                Ok(content) => return DownloadOutcome::Content(content),
                Err(err) => {
                    attempts += 1;
                    warn!(
                        "An error occurred while downloading {} ({}): {} [attempt {}/{}]",
                        name, id, err, attempts, max_retries
                    );
                    // No point waiting after the last attempt
                    if attempts < max_retries {
                        pause(self.config.retry_delay).await;
                    }
                }
            }
        }

        error!("Giving up on {} ({}) after {} attempt(s)", name, id, attempts);
        DownloadOutcome::Failed
    }

    async fn download_once(&self, id: &str, name: &str) -> Result<Vec<u8>, TransportError> {
        // Fresh stream and buffer every time; nothing carries over from a failed attempt
        let mut stream = self.drive.open_download(id).await?;
        let mut buffer = Vec::new();

        loop {
            let chunk = stream.next_chunk().await?;
            buffer.extend_from_slice(&chunk.data);
            info!(
                "{} ({}) download: {}% ...",
                name,
                id,
                (chunk.progress * 100.0) as u32
            );

            if chunk.done {
                return Ok(buffer);
            }
        }
    }
}

// A zero delay (tests) skips the timer entirely
async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why return DownloadOutcome instead of Result?
//    - A failed download is an expected, per-file result, not an error
//    - The caller counts it and carries on with the next file
//    - Result would invite `?`, which would abort the whole batch
//
// 2. Why `Ok(content) if content.is_empty()`?
//    - A match guard: the arm only matches when the condition is true
//    - The next arm `Ok(content)` then handles every non-empty body
//
// 3. What is `Box<dyn DownloadStream>`?
//    - open_download() can return different stream types (HTTP, test fake)
//    - Boxing hides the concrete type behind the trait
// -----------------------------------------------------------------------------
