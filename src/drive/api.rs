// src/drive/api.rs
// =============================================================================
// The two remote seams the rest of the tool is written against.
//
// - RemoteDrive: paginated listing + opening a chunked download
// - DownloadStream: pulls one chunk at a time from an open download
//
// HttpDrive (http.rs) implements these against the real Drive REST API.
// Tests implement them in memory so traversal and retry logic can be checked
// without a network.
// =============================================================================

use async_trait::async_trait;

use super::types::{FolderContext, ListPage};
use crate::error::{ListingError, TransportError};

/// One step of a chunked download.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Bytes received in this step (may be empty on the final step)
    pub data: Vec<u8>,
    /// Fraction of the file received so far, 0.0..=1.0
    pub progress: f32,
    /// True once the transfer has finished
    pub done: bool,
}

#[async_trait]
pub trait DownloadStream: Send {
    async fn next_chunk(&mut self) -> Result<Chunk, TransportError>;
}

#[async_trait]
pub trait RemoteDrive: Send + Sync {
    /// Lists one page of `context`'s children, continuing from `page_token`.
    async fn list_page(
        &self,
        context: &FolderContext,
        page_token: Option<&str>,
    ) -> Result<ListPage, ListingError>;

    /// Starts a fresh download of `file_id`.
    async fn open_download(&self, file_id: &str)
        -> Result<Box<dyn DownloadStream>, TransportError>;
}
