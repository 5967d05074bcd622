//! Freshness detection: mtime snapshots of tracked files and folders.
//!
//! ```text
//! freshness/
//! ├── entry    # FileEntry: one tracked file + its last stat
//! ├── folder   # FolderEntry: fresh, sorted directory listings
//! ├── ext      # ExtensionSet: which children of a folder are tracked
//! └── watcher  # ChangeWatcher: snapshot reconciliation per poll
//! ```
//!
//! Everything here is async: stats and listings go through `tokio::fs`, and
//! per-file checks fan out concurrently and join before a verdict is given.

mod entry;
mod ext;
mod folder;
mod watcher;

pub use entry::{FileEntry, Stat};
pub use ext::{ExtensionSet, SASS_EXTENSIONS, find_files_with_exts};
pub use folder::FolderEntry;
pub use watcher::ChangeWatcher;

use crate::error::{GateError, Result};
use futures::future::try_join_all;
use std::path::PathBuf;

/// Create a baseline `FileEntry` for every path, stat-ing them concurrently.
///
/// The returned entries keep the order of `paths`.
pub async fn init_entries(paths: Vec<PathBuf>) -> Result<Vec<FileEntry>> {
    try_join_all(paths.into_iter().map(|path| async move {
        let mut entry = FileEntry::new(path);
        entry.init().await?;
        Ok::<_, GateError>(entry)
    }))
    .await
}
