//! External compiler execution.
//!
//! A small builder over `tokio::process::Command` that runs the compiler in
//! the project directory, optionally streams its output line by line to a
//! [`Logger`], and kills it when a deadline passes.
//!
//! ```ignore
//! let code = Cmd::new("compass")
//!     .args(["compile", "--output-style", "compress"])
//!     .cwd(project)
//!     .timeout(Some(Duration::from_secs(60)))
//!     .stream_to(logger)
//!     .run()
//!     .await?;
//! ```

use crate::error::{GateError, Result};
use crate::logger::Logger;
use owo_colors::OwoColorize;
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::{Child, Command},
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for the compiler process.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    timeout: Option<Duration>,
    logger: Option<Arc<dyn Logger>>,
}

impl Cmd {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Kill the process when it runs longer than `limit`.
    pub fn timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    /// Forward stdout lines to `info` and stderr lines to `error`.
    ///
    /// Without a logger the output is discarded.
    pub fn stream_to(mut self, logger: Option<Arc<dyn Logger>>) -> Self {
        self.logger = logger;
        self
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Run to completion and return the exit code.
    ///
    /// A non-zero exit is returned as a value. A process terminated by a
    /// signal reports `128 + signal` on Unix and `1` elsewhere.
    pub async fn run(self) -> Result<i32> {
        let name = self.program_name();
        let output: fn() -> Stdio = if self.logger.is_some() {
            Stdio::piped
        } else {
            Stdio::null
        };

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(output())
            .stderr(output())
            .kill_on_drop(true);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| GateError::ProcessSpawn {
            command: name.clone(),
            source,
        })?;

        let finished = wait_streaming(&mut child, self.logger.as_deref());
        let status = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, finished).await {
                Ok(status) => status,
                Err(_) => {
                    // already exited or gone; nothing left to report
                    let _ = child.kill().await;
                    return Err(GateError::Timeout {
                        command: name,
                        secs: limit.as_secs(),
                    });
                }
            },
            None => finished.await,
        };

        let status = status.map_err(|source| GateError::Io {
            path: PathBuf::from(&name),
            source,
        })?;
        Ok(exit_code(status))
    }
}

// ============================================================================
// Output streaming
// ============================================================================

/// Pump both pipes into `logger` while waiting for the child to exit.
async fn wait_streaming(
    child: &mut Child,
    logger: Option<&dyn Logger>,
) -> std::io::Result<ExitStatus> {
    if let Some(logger) = logger {
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        tokio::join!(
            forward_lines(stdout, |line| logger.info(line)),
            forward_lines(stderr, |line| {
                if !is_ansi_reset(line) {
                    logger.error(&format!("{} {line}", "stderr:".red()));
                }
            }),
        );
    }
    child.wait().await
}

async fn forward_lines<R, F>(pipe: Option<R>, mut emit: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let Some(pipe) = pipe else { return };
    let mut lines = BufReader::new(pipe).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        emit(&line);
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Lines consisting only of an SGR reset, which compass prints after
/// colored errors.
fn is_ansi_reset(line: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^\x1b\[[0-9]+m$").unwrap());
    re.is_match(line)
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("compass")
            .arg("compile")
            .args(["--sass-dir", "stylesheets"])
            .cwd("/tmp");

        assert_eq!(cmd.program, OsString::from("compass"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
        assert!(cmd.timeout.is_none());
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("compass").arg("").args(["a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_is_ansi_reset() {
        assert!(is_ansi_reset("\x1b[0m"));
        assert!(is_ansi_reset("\x1b[39m"));
        assert!(!is_ansi_reset("\x1b[31merror\x1b[0m"));
        assert!(!is_ansi_reset("\x1b[0m "));
        assert!(!is_ansi_reset(""));
        assert!(!is_ansi_reset("\x1b[m"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_is_a_value() {
        let code = Cmd::new("sh").args(["-c", "exit 7"]).run().await.unwrap();
        assert_eq!(code, 7);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_maps_above_128() {
        let code = Cmd::new("sh")
            .args(["-c", "kill -9 $$"])
            .run()
            .await
            .unwrap();
        assert_eq!(code, 128 + 9);
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let err = Cmd::new("compass-gate-missing-binary").run().await.unwrap_err();
        assert!(matches!(err, GateError::ProcessSpawn { ref command, .. } if command == "compass-gate-missing-binary"));
    }
}
