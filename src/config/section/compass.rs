//! `[compass]` section configuration.
//!
//! Options handed to the compass compiler, plus the gate's own switches
//! (`cache`, `logging`, `timeout`).
//!
//! # Example
//!
//! ```toml
//! [compass]
//! project = "public"          # compass project root (relative to compass.toml)
//! sass = "stylesheets"        # sass sources, relative to project
//! css = "stylesheets"         # compiled output, relative to project
//! img = "images"
//! mode = "compress"           # --output-style
//! libs = ["susy"]             # -r susy
//! cache = true                # skip compiling when no source changed
//! timeout = 60                # seconds; omit to wait forever
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Compiler executable used when none is configured.
pub const DEFAULT_COMMAND: &str = if cfg!(windows) {
    "compass.bat"
} else {
    "compass"
};

/// Everything the compile gate needs to decide on and run a compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompassOptions {
    /// Output style (`--output-style`).
    pub mode: String,
    /// Folder for compiled css, relative to the project (`--css-dir`).
    pub css: String,
    /// Folder holding sass sources, relative to the project (`--sass-dir`).
    pub sass: String,
    /// Folder holding images, relative to the project (`--images-dir`).
    pub img: String,
    /// Import path (`-I`). Empty means the project directory.
    pub import_path: String,
    /// Compass project root; the compiler runs here.
    pub project: PathBuf,
    /// Compiler executable.
    pub command: String,
    /// Compass config file (`-c`).
    pub config_file: String,
    /// Libraries to require (`-r`, once per entry).
    pub libs: Vec<String>,
    /// Skip compiling when no sass source changed.
    pub cache: bool,
    /// Use relative asset paths (`--relative-assets`).
    pub relative: bool,
    /// Forward compiler output to the logger.
    pub logging: bool,
    /// Keep line comments in the output; `false` adds `--no-line-comments`.
    pub comments: bool,
    /// Seconds before a running compiler is killed. `None` waits forever.
    pub timeout: Option<u64>,
}

impl Default for CompassOptions {
    fn default() -> Self {
        Self {
            mode: "compress".into(),
            css: "stylesheets".into(),
            sass: "stylesheets".into(),
            img: "images".into(),
            import_path: String::new(),
            project: std::env::current_dir()
                .unwrap_or_default()
                .join("public"),
            command: DEFAULT_COMMAND.into(),
            config_file: String::new(),
            libs: Vec::new(),
            cache: true,
            relative: true,
            logging: false,
            comments: false,
            timeout: None,
        }
    }
}

impl CompassOptions {
    pub const COMMAND: FieldPath = FieldPath::new("compass.command");
    pub const LIBS: FieldPath = FieldPath::new("compass.libs");
    pub const PROJECT: FieldPath = FieldPath::new("compass.project");
    pub const TIMEOUT: FieldPath = FieldPath::new("compass.timeout");

    /// Defaults overlaid with `overrides`.
    pub fn resolve(overrides: &OptionsPatch) -> Self {
        Self::default().merged(overrides)
    }

    /// A copy of `self` with every field set in `patch` replaced.
    ///
    /// An empty `import_path` falls back to the project directory.
    pub fn merged(&self, patch: &OptionsPatch) -> Self {
        let mut merged = self.clone();

        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = &patch.$field {
                        merged.$field = value.clone();
                    }
                )*
            };
        }

        apply!(
            mode,
            css,
            sass,
            img,
            import_path,
            project,
            command,
            config_file,
            libs,
            cache,
            relative,
            logging,
            comments,
        );

        if let Some(secs) = patch.timeout {
            merged.timeout = (secs > 0).then_some(secs);
        }

        if merged.import_path.is_empty() && !merged.project.as_os_str().is_empty() {
            merged.import_path = merged.project.display().to_string();
        }

        merged
    }

    /// Directory holding the sass sources.
    pub fn sass_dir(&self) -> PathBuf {
        self.project.join(&self.sass)
    }

    /// Directory compiled css is written to.
    pub fn css_dir(&self) -> PathBuf {
        self.project.join(&self.css)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Resolve a relative `project` against `root` and expand `~`.
    pub fn resolve_project(&mut self, root: &Path) {
        let raw = self.project.to_string_lossy();
        let expanded = PathBuf::from(shellexpand::tilde(&raw).as_ref());
        self.project = if expanded.is_relative() {
            root.join(expanded)
        } else {
            expanded
        };
    }

    /// Validate compiler options.
    ///
    /// # Checks
    /// - `command` must not be empty; a command missing from `PATH` is a warning
    /// - `libs` entries must not be empty
    /// - `timeout = 0` is rejected (omit the key to wait forever)
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let command = self.command.trim();
        if command.is_empty() {
            diag.error(Self::COMMAND, "compiler command is empty");
        } else if which::which(command).is_err() {
            diag.warn(
                Self::COMMAND,
                format!("`{command}` not found in PATH, compiling will fail"),
            );
        }

        if self.libs.iter().any(|lib| lib.trim().is_empty()) {
            diag.error(Self::LIBS, "library names must not be empty");
        }

        if self.timeout == Some(0) {
            diag.error_with_hint(
                Self::TIMEOUT,
                "timeout must be at least 1 second",
                "remove the key to wait for the compiler indefinitely",
            );
        }

        if self.project.as_os_str().is_empty() {
            diag.error(Self::PROJECT, "project directory is empty");
        }
    }
}

/// Per-call overrides for [`CompassOptions`]; unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionsPatch {
    pub mode: Option<String>,
    pub css: Option<String>,
    pub sass: Option<String>,
    pub img: Option<String>,
    pub import_path: Option<String>,
    pub project: Option<PathBuf>,
    pub command: Option<String>,
    pub config_file: Option<String>,
    pub libs: Option<Vec<String>>,
    pub cache: Option<bool>,
    pub relative: Option<bool>,
    pub logging: Option<bool>,
    pub comments: Option<bool>,
    /// Seconds; `0` clears the timeout.
    pub timeout: Option<u64>,
}

impl OptionsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bypass the cache so the compiler always runs.
    pub fn force() -> Self {
        Self::new().cache(false)
    }

    pub fn cache(mut self, cache: bool) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn logging(mut self, logging: bool) -> Self {
        self.logging = Some(logging);
        self
    }

    pub fn project(mut self, project: impl Into<PathBuf>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(secs);
        self
    }

    pub fn libs<I, S>(mut self, libs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.libs = Some(libs.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
