//! cli
//!
//! Command-line interface layer for modpublish.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers build a forge and settings from the
//! configuration and hand the work to [`crate::publish`]. No command keeps
//! state between runs other than the secret store.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::ui::output::Verbosity;

/// Global flags shared by every command handler.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub debug: bool,
    pub quiet: bool,
    pub interactive: bool,
    /// Explicit `--config` path
    pub config_path: Option<PathBuf>,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Load the config named by `--config`, or search the standard locations.
    pub fn load_config(&self) -> Result<Config> {
        match &self.config_path {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display())),
            None => Config::load().context("Failed to load config"),
        }
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = Context {
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
        config_path: cli.config.clone(),
    };

    commands::dispatch(cli.command, &ctx)
}
