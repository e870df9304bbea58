// src/fetch/mod.rs
// =============================================================================
// Downloading matched files.
//
// The Fetcher only produces bytes (or says why it couldn't); writing them to
// disk is the sink's job.
// =============================================================================

mod download;

pub use download::{DownloadOutcome, Fetcher};
