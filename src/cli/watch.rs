//! `compass-gate watch`: poll the sass directory and compile on change.

use crate::{
    compiler::CompassCompiler,
    config::{GateConfig, OptionsPatch},
    core::is_shutdown,
    error::{GateError, Result},
    freshness::{ChangeWatcher, FolderEntry, SASS_EXTENSIONS},
    log,
    logger::{ConsoleLogger, status_error, status_success, status_unchanged},
    utils::plural::plural_count,
};
use std::sync::Arc;
use std::time::Duration;

/// What one poll found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    Unchanged,
    /// Sources changed; the compiler ran with this exit code.
    Compiled(i32),
    /// The sass directory is gone.
    Missing,
}

/// Poll until Ctrl+C.
pub async fn watch(config: &GateConfig, interval: Duration) -> anyhow::Result<()> {
    let compiler =
        CompassCompiler::with_logger(config.compass.clone(), Arc::new(ConsoleLogger::default()));
    let mut watcher =
        FolderEntry::new(config.compass.sass_dir()).watch_for_changes(SASS_EXTENSIONS);

    log!("watch"; "{} (every {}ms)", watcher.folder().path().display(), interval.as_millis());

    let mut last = None;
    while !is_shutdown() {
        match poll(&mut watcher, &compiler).await {
            Ok(result) => {
                if last != Some(result) || matches!(result, Poll::Compiled(_)) {
                    report(result, &watcher, config);
                }
                last = Some(result);
            }
            Err(e) => {
                status_error("watch failed", &e.to_string());
                last = None;
            }
        }
        tokio::time::sleep(interval).await;
    }

    Ok(())
}

/// Check the watcher once and compile, bypassing the gate's cache, when it
/// reports a change.
pub async fn poll(watcher: &mut ChangeWatcher, compiler: &CompassCompiler) -> Result<Poll> {
    match watcher.has_changed().await {
        Ok(false) => Ok(Poll::Unchanged),
        Ok(true) => {
            let outcome = compiler.compile(&OptionsPatch::force()).await?;
            Ok(Poll::Compiled(outcome.code()))
        }
        Err(GateError::DoesNotExist { .. }) => Ok(Poll::Missing),
        Err(e) => Err(e),
    }
}

fn report(result: Poll, watcher: &ChangeWatcher, config: &GateConfig) {
    let tracked = watcher.tracked().map_or(0, |files| files.len());
    match result {
        Poll::Unchanged => status_unchanged(&format!(
            "watching {}",
            plural_count(tracked, "sass file")
        )),
        Poll::Compiled(0) => status_success(&format!(
            "compiled {}",
            plural_count(tracked, "sass file")
        )),
        Poll::Compiled(code) => status_error(
            &format!("{} exited with {}", config.compass.command, code),
            "",
        ),
        Poll::Missing => status_error(
            "sass directory missing",
            &watcher.folder().path().display().to_string(),
        ),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup(dir: &TempDir) -> (ChangeWatcher, CompassCompiler) {
        let root = std::path::absolute(dir.path()).unwrap();
        fs::create_dir_all(root.join("stylesheets")).unwrap();
        fs::write(root.join("stylesheets/screen.scss"), "").unwrap();
        fs::write(root.join("compile"), "echo run >> runs.log").unwrap();

        let options = crate::config::CompassOptions::resolve(
            &OptionsPatch::new().project(&root).command("sh"),
        );
        let watcher = FolderEntry::new(options.sass_dir()).watch_for_changes(SASS_EXTENSIONS);
        (watcher, CompassCompiler::new(options))
    }

    fn runs(dir: &TempDir) -> usize {
        fs::read_to_string(dir.path().join("runs.log"))
            .map(|log| log.lines().count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_poll_compiles_on_change_only() {
        let dir = TempDir::new().unwrap();
        let (mut watcher, compiler) = setup(&dir);

        assert_eq!(poll(&mut watcher, &compiler).await.unwrap(), Poll::Compiled(0));
        assert_eq!(poll(&mut watcher, &compiler).await.unwrap(), Poll::Unchanged);
        assert_eq!(runs(&dir), 1);

        fs::write(dir.path().join("stylesheets/print.sass"), "").unwrap();
        assert_eq!(poll(&mut watcher, &compiler).await.unwrap(), Poll::Compiled(0));
        assert_eq!(runs(&dir), 2);
    }

    #[tokio::test]
    async fn test_missing_dir_keeps_polling() {
        let dir = TempDir::new().unwrap();
        let (mut watcher, compiler) = setup(&dir);
        poll(&mut watcher, &compiler).await.unwrap();

        fs::remove_dir_all(dir.path().join("stylesheets")).unwrap();
        assert_eq!(poll(&mut watcher, &compiler).await.unwrap(), Poll::Missing);
        assert_eq!(poll(&mut watcher, &compiler).await.unwrap(), Poll::Missing);

        fs::create_dir_all(dir.path().join("stylesheets")).unwrap();
        assert_eq!(poll(&mut watcher, &compiler).await.unwrap(), Poll::Compiled(0));
        assert_eq!(runs(&dir), 2);
    }
}
