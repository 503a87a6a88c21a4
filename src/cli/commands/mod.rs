//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Loads configuration and credentials
//! 3. Calls into the library to do the work
//! 4. Formats and displays output
//!
//! # Async Commands
//!
//! `publish` talks to the hosting API, so its handler creates a tokio
//! runtime and blocks on the async publish run.

mod auth;
mod completion;
mod config_cmd;
mod publish;

pub use auth::{auth, validate_token};
pub use completion::completion;
pub use config_cmd::{path as config_path, show as config_show};
pub use publish::publish;

use crate::cli::args::{Command, ConfigAction};
use crate::cli::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Publish(args) => publish::publish(ctx, args),
        Command::Auth { action } => auth::auth(ctx, action),
        Command::Config { action } => match action {
            ConfigAction::Path => config_cmd::path(ctx),
            ConfigAction::Show => config_cmd::show(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}
