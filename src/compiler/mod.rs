//! The compile gate.
//!
//! Decides whether the sass sources changed since the last compile and, if
//! so, runs the compass compiler once and waits for it.
//!
//! # Decision
//!
//! | Condition                                  | Result                      |
//! |--------------------------------------------|-----------------------------|
//! | `cache = false`                            | compile (`CacheDisabled`)   |
//! | no snapshot yet                            | compile (`ColdCache`)       |
//! | number of sass files differs from snapshot | compile (`CountChanged`)    |
//! | any tracked file reports `modified()`      | compile (`Modified`)        |
//! | otherwise                                  | skip                        |
//!
//! After every compile that actually ran, the snapshot is rebuilt from the
//! sass directory when caching is on, whatever the exit code was.
//!
//! # Concurrency
//!
//! The snapshot sits behind a `tokio::sync::Mutex` that `compile()` holds
//! from decision to rebuild, so one gate never runs two compilers at once.
//! Callers arriving mid-compile wait and then usually see a warm cache.

mod flags;
mod process;

pub use flags::build_flags;
pub use process::Cmd;

use crate::config::{CompassOptions, OptionsPatch};
use crate::error::Result;
use crate::freshness::{ExtensionSet, FileEntry, SASS_EXTENSIONS, find_files_with_exts, init_entries};
use crate::logger::{Logger, NullLogger};
use crate::debug;
use futures::future::try_join_all;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Exit code reported for a compile that was skipped.
pub const SKIPPED_CODE: i32 = -1;

/// Result of one `compile()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileOutcome {
    /// The compiler ran and exited with this code.
    Ran(i32),
    /// Sources were unchanged; nothing was spawned.
    Skipped,
}

impl CompileOutcome {
    /// Exit code, or [`SKIPPED_CODE`] when nothing ran.
    pub fn code(self) -> i32 {
        match self {
            Self::Ran(code) => code,
            Self::Skipped => SKIPPED_CODE,
        }
    }

    pub fn is_skipped(self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// Why the gate decided to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileReason {
    CacheDisabled,
    ColdCache,
    CountChanged { cached: usize, found: usize },
    Modified,
}

impl fmt::Display for CompileReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CacheDisabled => write!(f, "cache disabled"),
            Self::ColdCache => write!(f, "first compile"),
            Self::CountChanged { cached, found } => {
                write!(f, "sass file count changed ({cached} -> {found})")
            }
            Self::Modified => write!(f, "sass sources modified"),
        }
    }
}

/// Anything that can be asked to compile before a request is served.
pub trait Compiler: Send + Sync {
    fn compile(&self, patch: &OptionsPatch) -> impl Future<Output = Result<CompileOutcome>> + Send;
}

// ============================================================================
// CompassCompiler
// ============================================================================

/// Compile gate for one compass project.
pub struct CompassCompiler {
    options: CompassOptions,
    logger: Arc<dyn Logger>,
    exts: ExtensionSet,
    snapshot: Mutex<Option<Vec<FileEntry>>>,
    compiling: AtomicBool,
}

impl CompassCompiler {
    /// Gate that discards compiler output.
    pub fn new(options: CompassOptions) -> Self {
        Self::with_logger(options, Arc::new(NullLogger))
    }

    pub fn with_logger(options: CompassOptions, logger: Arc<dyn Logger>) -> Self {
        Self {
            // fills in import_path when left empty
            options: options.merged(&OptionsPatch::new()),
            logger,
            exts: ExtensionSet::new(SASS_EXTENSIONS),
            snapshot: Mutex::new(None),
            compiling: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &CompassOptions {
        &self.options
    }

    /// Whether a compiler process is running right now.
    pub fn is_compiling(&self) -> bool {
        self.compiling.load(Ordering::Acquire)
    }

    /// Files recorded by the last compile, or `None` before the first one.
    pub async fn tracked_paths(&self) -> Option<Vec<PathBuf>> {
        let snapshot = self.snapshot.lock().await;
        snapshot
            .as_ref()
            .map(|files| files.iter().map(|f| f.path().to_path_buf()).collect())
    }

    /// Decide whether `patch` applied to the stored options needs a compile.
    ///
    /// Checking tracked files refreshes their recorded stat, so a change
    /// reported here is not reported again.
    pub async fn decide(&self, patch: &OptionsPatch) -> Result<Option<CompileReason>> {
        let options = self.options.merged(patch);
        let mut snapshot = self.snapshot.lock().await;
        self.decide_locked(&options, &mut snapshot).await
    }

    pub async fn should_compile(&self, patch: &OptionsPatch) -> Result<bool> {
        Ok(self.decide(patch).await?.is_some())
    }

    /// Compile if needed and wait for the compiler to exit.
    pub async fn compile(&self, patch: &OptionsPatch) -> Result<CompileOutcome> {
        let options = self.options.merged(patch);
        let mut snapshot = self.snapshot.lock().await;

        let Some(reason) = self.decide_locked(&options, &mut snapshot).await? else {
            if options.logging {
                self.logger.info("No changes. Skipping compilation");
            }
            return Ok(CompileOutcome::Skipped);
        };
        debug!("compass"; "compiling: {reason}");

        let flags = build_flags(&options);
        if options.logging {
            self.logger
                .info(&format!("Running command \"{} {}\"", options.command, flags.join(" ")));
        }

        let code = {
            let _running = Running::start(&self.compiling);
            Cmd::new(&options.command)
                .args(&flags)
                .cwd(&options.project)
                .timeout(options.timeout())
                .stream_to(options.logging.then(|| Arc::clone(&self.logger)))
                .run()
                .await?
        };

        if options.cache {
            let files = find_files_with_exts(&options.sass_dir(), &self.exts).await?;
            *snapshot = Some(init_entries(files).await?);
        }

        Ok(CompileOutcome::Ran(code))
    }

    async fn decide_locked(
        &self,
        options: &CompassOptions,
        snapshot: &mut Option<Vec<FileEntry>>,
    ) -> Result<Option<CompileReason>> {
        if !options.cache {
            return Ok(Some(CompileReason::CacheDisabled));
        }

        let found = find_files_with_exts(&options.sass_dir(), &self.exts).await?;
        let Some(tracked) = snapshot.as_mut() else {
            return Ok(Some(CompileReason::ColdCache));
        };
        if tracked.len() != found.len() {
            return Ok(Some(CompileReason::CountChanged {
                cached: tracked.len(),
                found: found.len(),
            }));
        }

        let modified = try_join_all(tracked.iter_mut().map(|entry| entry.modified())).await?;
        Ok(modified
            .into_iter()
            .any(|changed| changed)
            .then_some(CompileReason::Modified))
    }
}

impl Compiler for CompassCompiler {
    fn compile(&self, patch: &OptionsPatch) -> impl Future<Output = Result<CompileOutcome>> + Send {
        CompassCompiler::compile(self, patch)
    }
}

/// Marks the gate busy until dropped.
struct Running<'a>(&'a AtomicBool);

impl<'a> Running<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
