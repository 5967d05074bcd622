//! Polling change detection for one folder.

use super::{ExtensionSet, FileEntry, FolderEntry, init_entries};
use crate::error::{GateError, Result};
use futures::future::try_join_all;
use std::path::{Path, PathBuf};

/// Detects added, removed, renamed and modified files in a folder.
///
/// Each call to [`has_changed`](Self::has_changed) compares the current
/// listing with the snapshot taken by the previous call.
#[derive(Debug)]
pub struct ChangeWatcher {
    folder: FolderEntry,
    exts: ExtensionSet,
    files: Option<Vec<FileEntry>>,
}

impl ChangeWatcher {
    pub fn new<I, S>(folder: FolderEntry, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            folder,
            exts: ExtensionSet::new(exts),
            files: None,
        }
    }

    pub fn folder(&self) -> &FolderEntry {
        &self.folder
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.exts
    }

    /// Paths in the current snapshot, `None` before the first poll.
    pub fn tracked(&self) -> Option<Vec<&Path>> {
        self.files
            .as_ref()
            .map(|files| files.iter().map(FileEntry::path).collect())
    }

    /// Whether anything changed since the previous call.
    ///
    /// The first call always reports a change. A different set of paths
    /// (including a same-count rename) replaces the snapshot; otherwise every
    /// tracked file is re-stat'ed in place.
    ///
    /// Fails with [`GateError::DoesNotExist`] when the folder is gone.
    pub async fn has_changed(&mut self) -> Result<bool> {
        self.error_if_not_exists().await?;
        let current = self.list().await?;

        if let Some(known) = self.files.as_mut()
            && same_paths(known, &current)
        {
            let results = try_join_all(known.iter_mut().map(|file| file.changed())).await?;
            return Ok(results.contains(&true));
        }

        crate::debug!("watch"; "{} tracked file(s) in {}", current.len(), self.folder.path().display());
        self.files = Some(init_entries(current).await?);
        Ok(true)
    }

    async fn error_if_not_exists(&self) -> Result<()> {
        if self.folder.exists().await? {
            Ok(())
        } else {
            Err(GateError::DoesNotExist {
                path: self.folder.path().to_path_buf(),
            })
        }
    }

    async fn list(&self) -> Result<Vec<PathBuf>> {
        let children = self.folder.list().await?;
        Ok(children
            .into_iter()
            .filter(|path| self.exts.matches(path))
            .collect())
    }
}

/// Ordered, element-wise path equality.
fn same_paths(known: &[FileEntry], current: &[PathBuf]) -> bool {
    known.len() == current.len()
        && known
            .iter()
            .zip(current)
            .all(|(entry, path)| entry.path() == path)
}
