//! compass-gate command-line entry point.

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use compass_gate::{
    cli::{self, Cli, Commands},
    config::GateConfig,
    core,
};
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Ctrl+C unblocks the server or stops the watch loop; otherwise exit now
    core::setup_shutdown_handler(!matches!(cli.command, Commands::Watch { .. }))?;

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = GateConfig::load(&cli)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    match &cli.command {
        Commands::Serve { .. } => cli::serve::bind_server(&config, runtime.handle().clone())?.run(),
        Commands::Compile { force, .. } => {
            let code = runtime.block_on(cli::compile::compile_once(&config, *force))?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Commands::Watch { interval, .. } => {
            runtime.block_on(cli::watch::watch(&config, Duration::from_millis(*interval)))
        }
    }
}
