//! cli::commands::auth
//!
//! Storing, removing and checking the GitHub token.
//!
//! Tokens go into the configured [`SecretStore`] under
//! [`secret_key`]`(host)`. The token value is never printed, not even in
//! part.

use std::io::{self, Write};

use anyhow::{bail, Context as _, Result};

use crate::auth::{secret_key, DEFAULT_TOKEN_ENV};
use crate::cli::args::AuthAction;
use crate::cli::Context;
use crate::secrets::{self, SecretStore};

/// Run an auth subcommand.
pub fn auth(ctx: &Context, action: AuthAction) -> Result<()> {
    let config = ctx.load_config()?;
    let store = secrets::create_store(config.secrets_provider())
        .context("Failed to initialize secret store")?;

    match action {
        AuthAction::Login { token, host } => login(ctx, store.as_ref(), token.as_deref(), &host),
        AuthAction::Logout { host } => logout(ctx, store.as_ref(), &host),
        AuthAction::Status { host } => status(ctx, store.as_ref(), &host),
    }
}

fn login(ctx: &Context, store: &dyn SecretStore, token: Option<&str>, host: &str) -> Result<()> {
    let token = read_token(ctx, token)?;
    validate_token(&token)?;

    store
        .set(&secret_key(host), &token)
        .context("Failed to store token")?;

    if !ctx.quiet {
        println!("Token stored for {}.", host);
    }
    Ok(())
}

fn logout(ctx: &Context, store: &dyn SecretStore, host: &str) -> Result<()> {
    store
        .delete(&secret_key(host))
        .context("Failed to remove stored token")?;

    if !ctx.quiet {
        println!("Removed stored token for {}.", host);
    }
    Ok(())
}

fn status(ctx: &Context, store: &dyn SecretStore, host: &str) -> Result<()> {
    let stored = store.exists(&secret_key(host))?;
    let from_env = std::env::var(DEFAULT_TOKEN_ENV).is_ok_and(|t| !t.trim().is_empty());

    if ctx.quiet {
        // Machine-readable output
        if stored || from_env {
            println!("authenticated");
        } else {
            println!("not_authenticated");
        }
    } else if from_env {
        println!("Using token from {} for {}.", DEFAULT_TOKEN_ENV, host);
    } else if stored {
        println!("Token stored for {}.", host);
    } else {
        println!("No token for {}.", host);
        println!("Run 'modpublish auth login' or set {}.", DEFAULT_TOKEN_ENV);
    }
    Ok(())
}

/// Token from the flag, or a hidden prompt when interactive.
fn read_token(ctx: &Context, token_arg: Option<&str>) -> Result<String> {
    if let Some(t) = token_arg {
        return Ok(t.trim().to_string());
    }

    if !ctx.interactive {
        bail!("Token required. Use --token <TOKEN> or run interactively.");
    }

    print!("GitHub Personal Access Token: ");
    io::stdout().flush()?;
    let token = rpassword::read_password().context("Failed to read token")?;
    Ok(token.trim().to_string())
}

/// Basic format checks; the token is not checked against the API here.
pub fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        bail!("Token cannot be empty.");
    }
    if token.len() < 10 {
        bail!("Token appears to be too short.");
    }
    if token.chars().any(char::is_whitespace) {
        bail!("Token should not contain whitespace.");
    }
    Ok(())
}
