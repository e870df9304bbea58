// src/error.rs
// =============================================================================
// Typed errors for the four ways a harvest run can go wrong.
//
// - ListingError: a folder listing call failed. Never retried.
// - TransportError: a download failed mid-flight. Retried by the Fetcher.
// - CredentialError: the service-account key could not produce a token.
// - SinkError: a downloaded file could not be written locally.
//
// The application glue (main.rs, harvest/) wraps these in anyhow::Error with
// extra context, the same way the rest of the CLI reports failures.
// =============================================================================

use std::io;
use std::path::PathBuf;

/// A folder listing request failed.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("listing request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("listing returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode listing response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// A download failed before the transfer reported completion.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("download request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("download returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("download interrupted: {0}")]
    Interrupted(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("could not read service account file {path:?}")]
    ReadKeyFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("service account file {path:?} is not a valid key: {source}")]
    ParseKeyFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid service account private key: {0}")]
    PrivateKey(String),

    #[error("token request failed: {0}")]
    TokenRequest(#[from] reqwest::Error),

    #[error("token endpoint returned HTTP {status}: {body}")]
    TokenRejected { status: u16, body: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("could not create output directory {path:?}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("refusing to write remote file with unsafe name {0:?}")]
    UnsafeName(String),
}
