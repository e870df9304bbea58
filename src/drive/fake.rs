// src/drive/fake.rs
// =============================================================================
// In-memory RemoteDrive used by unit tests.
//
// Folder contents are stored flat per parent and split into pages of
// `page_size` on the way out, so the same tree can be served with different
// page boundaries. Downloads are scripted per file as a queue of attempts.
// =============================================================================

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::api::{Chunk, DownloadStream, RemoteDrive};
use super::types::{EntryKind, FolderContext, ListPage, RemoteEntry};
use crate::error::{ListingError, TransportError};

/// What happens on one download attempt.
#[derive(Debug, Clone)]
pub(crate) enum Attempt {
    Content(Vec<u8>),
    FailOpen,
    /// Sends these bytes, then drops the connection
    FailMidway(Vec<u8>),
}

pub(crate) struct FakeDrive {
    children: HashMap<Option<String>, Vec<(String, String, EntryKind)>>,
    page_size: usize,
    failing_folders: HashSet<String>,
    downloads: Mutex<HashMap<String, VecDeque<Attempt>>>,
    opens: Mutex<HashMap<String, usize>>,
    list_calls: AtomicUsize,
}

impl FakeDrive {
    pub(crate) fn new() -> Self {
        Self {
            children: HashMap::new(),
            page_size: usize::MAX,
            failing_folders: HashSet::new(),
            downloads: Mutex::new(HashMap::new()),
            opens: Mutex::new(HashMap::new()),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Adds a folder under `parent` (None = shared root).
    pub(crate) fn folder(mut self, parent: Option<&str>, id: &str, name: &str) -> Self {
        self.children
            .entry(parent.map(str::to_string))
            .or_default()
            .push((id.to_string(), name.to_string(), EntryKind::Folder));
        self
    }

    pub(crate) fn file(mut self, parent: Option<&str>, id: &str, name: &str) -> Self {
        self.children
            .entry(parent.map(str::to_string))
            .or_default()
            .push((id.to_string(), name.to_string(), EntryKind::File));
        self
    }

    pub(crate) fn failing_folder(mut self, id: &str) -> Self {
        self.failing_folders.insert(id.to_string());
        self
    }

    pub(crate) fn download(self, id: &str, attempts: Vec<Attempt>) -> Self {
        self.downloads
            .lock()
            .unwrap()
            .insert(id.to_string(), attempts.into());
        self
    }

    pub(crate) fn opens(&self, id: &str) -> usize {
        self.opens.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteDrive for FakeDrive {
    async fn list_page(
        &self,
        context: &FolderContext,
        page_token: Option<&str>,
    ) -> Result<ListPage, ListingError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let key = match context {
            FolderContext::Root => None,
            FolderContext::Folder { id, .. } => {
                if self.failing_folders.contains(id) {
                    return Err(ListingError::Status {
                        status: 403,
                        body: format!("no access to {}", id),
                    });
                }
                Some(id.clone())
            }
        };

        let all = self.children.get(&key).cloned().unwrap_or_default();
        let start: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let end = start.saturating_add(self.page_size).min(all.len());

        let entries = all[start..end]
            .iter()
            .map(|(id, name, kind)| RemoteEntry {
                id: id.clone(),
                name: name.clone(),
                kind: *kind,
                parent: context.clone(),
                permissions: Vec::new(),
            })
            .collect();

        Ok(ListPage {
            entries,
            next_page_token: (end < all.len()).then(|| end.to_string()),
        })
    }

    async fn open_download(
        &self,
        file_id: &str,
    ) -> Result<Box<dyn DownloadStream>, TransportError> {
        *self
            .opens
            .lock()
            .unwrap()
            .entry(file_id.to_string())
            .or_default() += 1;

        let attempt = self
            .downloads
            .lock()
            .unwrap()
            .get_mut(file_id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(Attempt::FailOpen);

        match attempt {
            Attempt::FailOpen => Err(TransportError::Status {
                status: 503,
                body: "backend error".to_string(),
            }),
            Attempt::Content(bytes) => Ok(Box::new(FakeDownload::new(bytes, false))),
            Attempt::FailMidway(bytes) => Ok(Box::new(FakeDownload::new(bytes, true))),
        }
    }
}

struct FakeDownload {
    pending: VecDeque<Vec<u8>>,
    total: usize,
    received: usize,
    fail_at_end: bool,
}

impl FakeDownload {
    fn new(bytes: Vec<u8>, fail_at_end: bool) -> Self {
        Self {
            total: bytes.len(),
            pending: bytes.chunks(2).map(<[u8]>::to_vec).collect(),
            received: 0,
            fail_at_end,
        }
    }
}

#[async_trait]
impl DownloadStream for FakeDownload {
    async fn next_chunk(&mut self) -> Result<Chunk, TransportError> {
        if let Some(data) = self.pending.pop_front() {
            self.received += data.len();
            return Ok(Chunk {
                progress: self.received as f32 / self.total as f32,
                data,
                done: false,
            });
        }

        if self.fail_at_end {
            return Err(TransportError::Interrupted("connection reset".to_string()));
        }

        Ok(Chunk {
            data: Vec::new(),
            progress: 1.0,
            done: true,
        })
    }
}
