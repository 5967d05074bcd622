//! Error types for change detection and the compile gate.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by tracked files, watchers, the compile gate and the
/// request filter.
///
/// A compiler exiting with a non-zero status is not an error; it is reported
/// as [`CompileOutcome::Ran`](crate::compiler::CompileOutcome::Ran).
#[derive(Debug, Error)]
pub enum GateError {
    /// The path does not exist at the OS level.
    #[error("no such file or directory: `{}`", path.display())]
    NotFound { path: PathBuf },

    /// A watched folder is missing.
    #[error("watched folder does not exist: `{}`", path.display())]
    DoesNotExist { path: PathBuf },

    /// A request without a usable path reached the filter.
    #[error("invalid request: {0}")]
    InvalidInput(String),

    /// The compiler could not be started.
    #[error("failed to spawn `{command}`")]
    ProcessSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The compiler ran longer than the configured timeout and was killed.
    #[error("`{command}` did not finish within {secs}s")]
    Timeout { command: String, secs: u64 },

    /// Any other filesystem failure (permission denied, not a directory, ...).
    #[error("IO error on `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = GateError> = std::result::Result<T, E>;

impl GateError {
    /// Classify an `io::Error` raised while touching `path`.
    pub fn from_io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Whether this is the low-level "path does not exist" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_from_io_classifies_not_found() {
        let err = GateError::from_io(Path::new("/x/a.scss"), Error::from(ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert!(format!("{err}").contains("/x/a.scss"));
    }

    #[test]
    fn test_from_io_keeps_other_kinds() {
        let err = GateError::from_io(
            Path::new("/x"),
            Error::from(ErrorKind::PermissionDenied),
        );
        match err {
            GateError::Io { source, .. } => {
                assert_eq!(source.kind(), ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_display() {
        let err = GateError::Timeout {
            command: "compass".into(),
            secs: 30,
        };
        assert_eq!(format!("{err}"), "`compass` did not finish within 30s");

        let err = GateError::DoesNotExist {
            path: PathBuf::from("/p/sass"),
        };
        assert!(format!("{err}").contains("does not exist"));
    }
}
