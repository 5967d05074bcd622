//! A tracked directory.

use super::{ChangeWatcher, FileEntry};
use crate::error::{GateError, Result};
use std::path::{Path, PathBuf};

/// Read-through view of a directory. Listings are fetched fresh every time.
#[derive(Debug, Clone)]
pub struct FolderEntry {
    file: FileEntry,
}

impl FolderEntry {
    /// Track `path`. Listings are as absolute as `path` is; config loading
    /// already resolves the sass directory against the project root.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: FileEntry::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub async fn exists(&self) -> Result<bool> {
        self.file.exists().await
    }

    /// Absolute paths of the direct children, sorted and deduplicated.
    pub async fn list(&self) -> Result<Vec<PathBuf>> {
        let path = self.path();
        let mut dir = tokio::fs::read_dir(path)
            .await
            .map_err(|err| GateError::from_io(path, err))?;

        let mut children = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|err| GateError::from_io(path, err))?
        {
            children.push(entry.path());
        }

        children.sort();
        children.dedup();
        Ok(children)
    }

    /// Watch this folder for changes to files with the given extensions.
    pub fn watch_for_changes<I, S>(self, exts: I) -> ChangeWatcher
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ChangeWatcher::new(self, exts)
    }
}
