// src/traverse/walker.rs
// =============================================================================
// Depth-first walk of the remote folder tree.
//
// How it works:
// 1. Push the starting context (usually the "shared with me" root)
// 2. Pop a context and list ALL of its pages
// 3. Keep files whose name ends with the configured suffix
// 4. Push every subfolder found, so the first one listed is walked next
// 5. Repeat until the stack is empty
//
// The stack replaces recursion, so a very deep (or hostile) folder hierarchy
// costs heap instead of call stack.
//
// Listing errors are not retried and not isolated: the first failure stops
// the whole walk and is returned to the caller.
// =============================================================================

use tracing::{debug, info};

use crate::config::HarvestConfig;
use crate::drive::{EntryKind, FileMatch, FolderContext, RemoteDrive, RemoteEntry};
use crate::error::ListingError;

pub struct Traverser<'a, D: RemoteDrive + ?Sized> {
    drive: &'a D,
    config: &'a HarvestConfig,
}

impl<'a, D: RemoteDrive + ?Sized> Traverser<'a, D> {
    pub fn new(drive: &'a D, config: &'a HarvestConfig) -> Self {
        Self { drive, config }
    }

    /// Collects every matching file reachable from `start`.
    pub async fn enumerate(&self, start: FolderContext) -> Result<Vec<FileMatch>, ListingError> {
        let mut pending = vec![start];
        let mut matches = Vec::new();

        while let Some(context) = pending.pop() {
            info!("--- SEARCHING {} ---", context);

            let entries = self.list_all(&context).await?;
            let mut subfolders = Vec::new();

            for entry in entries {
                let shared_with: Vec<String> =
                    entry.permissions.iter().map(ToString::to_string).collect();
                debug!(
                    name = %entry.name,
                    id = %entry.id,
                    kind = ?entry.kind,
                    from = %entry.parent,
                    permissions = %shared_with.join(","),
                    "entry"
                );

                match entry.kind {
                    EntryKind::Folder => {
                        subfolders.push(FolderContext::folder(entry.id, entry.name));
                    }
                    EntryKind::File if self.config.matches(&entry.name) => {
                        matches.push(FileMatch::new(&entry));
                    }
                    EntryKind::File => {}
                }
            }

            // LIFO: reversed so the first subfolder listed is popped first
            pending.extend(subfolders.into_iter().rev());
        }

        Ok(matches)
    }

    // Follows continuation tokens until the folder is exhausted
    async fn list_all(&self, context: &FolderContext) -> Result<Vec<RemoteEntry>, ListingError> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .drive
                .list_page(context, page_token.as_deref())
                .await?;

            info!("Found {} items in {}", page.entries.len(), context);
            entries.extend(page.entries);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(entries)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Vec instead of recursion?
//    - A recursive async fn needs boxing (Box::pin) to even compile
//    - Each level of recursion would hold its own future on the heap anyway
//    - Vec::push / Vec::pop give us a stack (LIFO) = depth-first order
//
// 2. What is `D: RemoteDrive + ?Sized`?
//    - D is any type that implements the RemoteDrive trait
//    - ?Sized also allows trait objects like `dyn RemoteDrive`
//    - Tests pass an in-memory fake, main.rs passes the real HttpDrive
//
// 3. What does `page_token.as_deref()` do?
//    - Turns Option<String> into Option<&str> without cloning
// -----------------------------------------------------------------------------
