// src/drive/mod.rs
// =============================================================================
// Everything that talks to (or stands in for) the remote file store.
//
// Submodules:
// - types: entries, folder contexts, listing pages, file matches
// - api: the RemoteDrive / DownloadStream traits
// - http: Drive v3 REST implementation of those traits
// - auth: service-account credentials -> bearer tokens
// =============================================================================

mod api;
mod auth;
mod http;
mod types;

pub use api::RemoteDrive;
pub use auth::{ServiceAccountAuth, StaticToken, TokenProvider};
pub use http::HttpDrive;
pub use types::{EntryKind, FileMatch, FolderContext, RemoteEntry};

#[cfg(test)]
pub(crate) mod fake;
