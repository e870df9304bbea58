// src/drive/types.rs
// =============================================================================
// Data model shared by the listing API, the Traverser and the Fetcher.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// mimeType Drive uses for folders; everything else is treated as a file.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    File,
}

impl EntryKind {
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type == FOLDER_MIME_TYPE {
            EntryKind::Folder
        } else {
            EntryKind::File
        }
    }
}

/// Where a listing starts: the virtual "shared with me" root or a real folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderContext {
    Root,
    Folder { id: String, name: String },
}

impl FolderContext {
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        FolderContext::Folder {
            id: id.into(),
            name: name.into(),
        }
    }

    /// The query predicate that lists this context's direct children.
    pub fn query(&self) -> ListQuery {
        match self {
            FolderContext::Root => ListQuery::SharedWithMe,
            FolderContext::Folder { id, .. } => ListQuery::Parent(id.clone()),
        }
    }
}

impl fmt::Display for FolderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolderContext::Root => write!(f, "Shared with me"),
            FolderContext::Folder { name, .. } => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListQuery {
    SharedWithMe,
    Parent(String),
}

impl ListQuery {
    /// Renders the predicate in Drive's `q` syntax.
    pub fn to_drive_query(&self) -> String {
        match self {
            ListQuery::SharedWithMe => "sharedWithMe=true".to_string(),
            ListQuery::Parent(id) => format!("'{}' in parents", id.replace('\'', "\\'")),
        }
    }
}

/// Fetched with every entry; only logged, never used for filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

// Rendered as `role:email`, with "?" for whatever Drive left out
impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.role.as_deref().unwrap_or("?"),
            self.email_address.as_deref().unwrap_or("?")
        )
    }
}

/// One object returned by a listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub id: String,
    pub name: String,
    pub kind: EntryKind,
    pub parent: FolderContext,
    pub permissions: Vec<Permission>,
}

/// One page of a listing plus the token for the next one, if any.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub entries: Vec<RemoteEntry>,
    pub next_page_token: Option<String>,
}

/// A file picked by the Traverser for download.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileMatch {
    pub id: String,
    pub name: String,
}

impl FileMatch {
    pub(crate) fn new(entry: &RemoteEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
        }
    }
}
