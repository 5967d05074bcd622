//! A single tracked file.

use crate::error::{GateError, Result};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Metadata observed by one stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    /// Last modification time.
    pub modified: SystemTime,
    /// Size in bytes.
    pub len: u64,
    /// Whether the path is a directory.
    pub is_dir: bool,
}

impl Stat {
    fn from_metadata(path: &Path, meta: &Metadata) -> Result<Self> {
        let modified = meta
            .modified()
            .map_err(|err| GateError::from_io(path, err))?;
        Ok(Self {
            modified,
            len: meta.len(),
            is_dir: meta.is_dir(),
        })
    }
}

/// A file path plus the stat recorded the last time it was checked.
///
/// The stored stat is only ever replaced as a whole. `exists` and `stat`
/// never touch it; `init`, `changed` and `modified` may.
#[derive(Debug, Clone)]
pub struct FileEntry {
    path: PathBuf,
    stat: Option<Stat>,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stat: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stat stored by the last `init`/`changed`, if any.
    pub fn last_stat(&self) -> Option<&Stat> {
        self.stat.as_ref()
    }

    /// Stat the path without recording the result.
    ///
    /// Fails with [`GateError::NotFound`] when the path does not exist.
    pub async fn stat(&self) -> Result<Stat> {
        let meta = tokio::fs::metadata(&self.path)
            .await
            .map_err(|err| GateError::from_io(&self.path, err))?;
        Stat::from_metadata(&self.path, &meta)
    }

    /// Whether the path exists. Failures other than not-found propagate.
    pub async fn exists(&self) -> Result<bool> {
        match self.stat().await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Whether the mtime moved since the last recorded stat.
    ///
    /// With no recorded stat this always reports a change. A detected change
    /// replaces the recorded stat.
    pub async fn changed(&mut self) -> Result<bool> {
        let fresh = self.stat().await?;
        let changed = self
            .stat
            .is_none_or(|known| known.modified != fresh.modified);

        if changed {
            self.stat = Some(fresh);
        }
        Ok(changed)
    }

    /// Whether the file was removed or changed since the last recorded stat.
    ///
    /// A missing file is always reported as modified and its recorded stat is
    /// left alone, so a path that never existed reports `true` on every call.
    pub async fn modified(&mut self) -> Result<bool> {
        if !self.exists().await? {
            return Ok(true);
        }

        match self.changed().await {
            // removed between the two stats
            Err(err) if err.is_not_found() => Ok(true),
            other => other,
        }
    }

    /// Record the current stat as the baseline.
    pub async fn init(&mut self) -> Result<Stat> {
        let stat = self.stat().await?;
        self.stat = Some(stat);
        Ok(stat)
    }
}
