//! `compass-gate compile`: run the gate once.

use crate::{
    compiler::{CompassCompiler, CompileOutcome},
    config::{GateConfig, OptionsPatch},
    log,
    logger::{ConsoleLogger, Logger},
};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Run the compile gate once and return the process exit code.
///
/// A fresh process has no snapshot, so this always compiles; `force` also
/// keeps the gate from recording one.
pub async fn compile_once(config: &GateConfig, force: bool) -> Result<i32> {
    compile_with(config, force, Arc::new(ConsoleLogger::default())).await
}

async fn compile_with(config: &GateConfig, force: bool, logger: Arc<dyn Logger>) -> Result<i32> {
    let project = config.compass.project.display();
    let compiler = CompassCompiler::with_logger(config.compass.clone(), logger);
    let patch = if force {
        OptionsPatch::force()
    } else {
        OptionsPatch::new()
    };

    let outcome = compiler
        .compile(&patch)
        .await
        .with_context(|| format!("failed to compile `{project}`"))?;

    Ok(match outcome {
        CompileOutcome::Ran(0) => {
            log!("compass"; "compiled {}", project);
            0
        }
        CompileOutcome::Ran(code) => {
            log!("error"; "{} exited with {}", config.compass.command, code);
            code
        }
        CompileOutcome::Skipped => {
            log!("compass"; "sources unchanged");
            0
        }
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::GateError;
    use crate::logger::NullLogger;
    use std::fs;
    use tempfile::TempDir;

    fn config(dir: &TempDir, script: &str) -> GateConfig {
        let root = std::path::absolute(dir.path()).unwrap();
        fs::create_dir_all(root.join("stylesheets")).unwrap();
        fs::write(root.join("compile"), script).unwrap();

        let mut config = GateConfig::default();
        config.compass = config
            .compass
            .merged(&OptionsPatch::new().project(&root).command("sh"));
        config
    }

    #[tokio::test]
    async fn test_exit_code_passes_through() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, "exit 2");
        let code = compile_with(&config, false, Arc::new(NullLogger)).await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_force_compiles() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, "touch compiled");
        let code = compile_with(&config, true, Arc::new(NullLogger)).await.unwrap();
        assert_eq!(code, 0);
        assert!(dir.path().join("compiled").exists());
    }

    #[tokio::test]
    async fn test_spawn_failure_keeps_cause() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir, "exit 0");
        config.compass.command = "compass-gate-missing-binary".into();

        let err = compile_with(&config, false, Arc::new(NullLogger))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GateError>(),
            Some(GateError::ProcessSpawn { .. })
        ));
    }
}
