//! compass-gate - compile compass/sass stylesheets only when their sources
//! changed.
//!
//! The [`compiler::CompassCompiler`] keeps an mtime snapshot of the sass
//! directory and runs the external `compass compile` only when that snapshot
//! is out of date. [`middleware::Middleware`] puts the gate in front of
//! stylesheet requests, and the `cli` module wires both into the
//! `serve`, `compile` and `watch` commands.

pub mod cli;
pub mod compiler;
pub mod config;
pub mod core;
pub mod error;
pub mod freshness;
pub mod logger;
pub mod middleware;
pub mod utils;
