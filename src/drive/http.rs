// src/drive/http.rs
// =============================================================================
// RemoteDrive implementation backed by the Google Drive v3 REST API.
//
// Endpoints used:
// - GET {api_base}/files?q=...&fields=...&pageToken=...   (listing)
// - GET {api_base}/files/{id}?alt=media                    (download)
//
// Every request carries a bearer token from the TokenProvider. A download is
// consumed chunk by chunk straight off the response body, so progress can be
// reported as bytes arrive.
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use super::api::{Chunk, DownloadStream, RemoteDrive};
use super::auth::TokenProvider;
use super::types::{EntryKind, FolderContext, ListPage, Permission, RemoteEntry};
use crate::error::{ListingError, TransportError};

/// Fields requested for every listing page.
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, permissions)";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    mime_type: String,
    #[serde(default)]
    permissions: Vec<Permission>,
}

pub struct HttpDrive {
    client: Client,
    api_base: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpDrive {
    pub fn new(client: Client, api_base: Url, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client,
            api_base,
            tokens,
        }
    }

    // Appends path segments to the API base, e.g. ["files", id]
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl RemoteDrive for HttpDrive {
    async fn list_page(
        &self,
        context: &FolderContext,
        page_token: Option<&str>,
    ) -> Result<ListPage, ListingError> {
        // May hit the token endpoint if the cached token ran out
        let token = self.tokens.access_token().await?;
        let query = context.query().to_drive_query();

        let mut request = self
            .client
            .get(self.endpoint(&["files"]))
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("fields", LIST_FIELDS)]);

        if let Some(page_token) = page_token {
            request = request.query(&[("pageToken", page_token)]);
        }

        let response = request.send().await?;

        // Keep Drive's error body; it usually says which permission is missing
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ListingError::Status { status, body });
        }

        // Read as text first so a bad payload is a Decode error, not a transport one
        let body = response.text().await?;
        let listing: FileListResponse = serde_json::from_str(&body).map_err(ListingError::Decode)?;

        let entries = listing
            .files
            .into_iter()
            .map(|file| RemoteEntry {
                kind: EntryKind::from_mime_type(&file.mime_type),
                id: file.id,
                name: file.name,
                parent: context.clone(),
                permissions: file.permissions,
            })
            .collect();

        Ok(ListPage {
            entries,
            // Drive sometimes sends "" on the last page
            next_page_token: listing.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn open_download(
        &self,
        file_id: &str,
    ) -> Result<Box<dyn DownloadStream>, TransportError> {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .get(self.endpoint(&["files", file_id]))
            .bearer_auth(token)
            .query(&[("alt", "media")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        Ok(Box::new(HttpDownload {
            total: response.content_length(),
            received: 0,
            response,
        }))
    }
}

/// An in-flight `alt=media` response body.
struct HttpDownload {
    response: Response,
    total: Option<u64>,
    received: u64,
}

impl HttpDownload {
    fn progress(&self) -> f32 {
        fraction(self.received, self.total)
    }
}

// Share of the body received so far, in 0.0..=1.0. Without a known length
// (chunked transfer encoding) there is nothing to compare against, so 0.0.
fn fraction(received: u64, total: Option<u64>) -> f32 {
    match total {
        Some(total) if total > 0 => (received as f64 / total as f64).min(1.0) as f32,
        _ => 0.0,
    }
}

#[async_trait]
impl DownloadStream for HttpDownload {
    async fn next_chunk(&mut self) -> Result<Chunk, TransportError> {
        // None means the server closed the body
        match self.response.chunk().await? {
            Some(bytes) => {
                self.received += bytes.len() as u64;
                Ok(Chunk {
                    data: bytes.to_vec(),
                    progress: self.progress(),
                    done: false,
                })
            }
            None => {
                if let Some(total) = self.total {
                    if self.received < total {
                        return Err(TransportError::Interrupted(format!(
                            "body ended after {} of {} bytes",
                            self.received, total
                        )));
                    }
                }
                Ok(Chunk {
                    data: Vec::new(),
                    progress: 1.0,
                    done: true,
                })
            }
        }
    }
}
