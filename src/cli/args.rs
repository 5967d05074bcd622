//! Command-line interface definitions.

use crate::config::FailurePolicy;
use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// compass-gate: compile stylesheets on request, only when sources changed
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: compass.toml)
    #[arg(short = 'C', long, default_value = "compass.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Compass project directory (overrides `compass.project`)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub project: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the project, compiling stylesheets when a `.css` file is requested
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        gate_args: GateArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(long)]
        port: Option<u16>,

        /// What to do when compiling fails: keep serving (open) or answer 500 (closed)
        #[arg(long, value_enum)]
        on_error: Option<FailurePolicy>,
    },

    /// Run the compile gate once and exit with the compiler's status
    #[command(visible_alias = "c")]
    Compile {
        #[command(flatten)]
        gate_args: GateArgs,

        /// Compile even if no source changed
        #[arg(short, long)]
        force: bool,
    },

    /// Poll the sass directory and compile whenever it changes
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        gate_args: GateArgs,

        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 500)]
        interval: u64,
    },
}

/// Compile gate options shared by every subcommand
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GateArgs {
    /// Skip compiling when no sass source changed
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub cache: Option<bool>,

    /// Forward compiler output to the console
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub logging: Option<bool>,

    /// Kill the compiler after this many seconds (0 = wait forever)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Compiler executable (e.g., compass, compass.bat)
    #[arg(long)]
    pub command: Option<String>,
}

impl Cli {
    /// Gate arguments of the selected subcommand.
    pub fn gate_args(&self) -> &GateArgs {
        match &self.command {
            Commands::Serve { gate_args, .. }
            | Commands::Compile { gate_args, .. }
            | Commands::Watch { gate_args, .. } => gate_args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compile_force() {
        let cli = Cli::parse_from(["compass-gate", "compile", "--force", "--timeout", "30"]);
        match &cli.command {
            Commands::Compile { force, gate_args } => {
                assert!(*force);
                assert_eq!(gate_args.timeout, Some(30));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_serve_options() {
        let cli = Cli::parse_from([
            "compass-gate",
            "-C",
            "site/compass.toml",
            "serve",
            "--port",
            "8080",
            "--on-error",
            "closed",
            "--cache",
            "false",
        ]);
        assert_eq!(cli.config, PathBuf::from("site/compass.toml"));
        match &cli.command {
            Commands::Serve {
                port,
                on_error,
                gate_args,
                ..
            } => {
                assert_eq!(*port, Some(8080));
                assert_eq!(*on_error, Some(FailurePolicy::Closed));
                assert_eq!(gate_args.cache, Some(false));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_bare_flag_means_true() {
        let cli = Cli::parse_from(["compass-gate", "watch", "--logging"]);
        assert_eq!(cli.gate_args().logging, Some(true));
        match cli.command {
            Commands::Watch { interval, .. } => assert_eq!(interval, 500),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_project_flag() {
        let cli = Cli::parse_from(["compass-gate", "compile", "--project", "/srv/site"]);
        assert_eq!(cli.project, Some(PathBuf::from("/srv/site")));
    }
}
