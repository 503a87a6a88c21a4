//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file instead of searching
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::types::RepoId;

/// modpublish - publish mod metadata to a community catalog via pull request
#[derive(Parser, Debug)]
#[command(name = "modpublish")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this config file instead of the standard locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies no prompts
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Never prompt for input
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Prompts are allowed unless `--quiet` or `--no-interactive` is set.
    pub fn interactive(&self) -> bool {
        !(self.no_interactive || self.quiet)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Publish a mod release to the catalog
    #[command(
        name = "publish",
        long_about = "Publish a mod release to the catalog.\n\n\
            Reads the manifest from an unpacked package, forks the catalog \
            repository if needed, rebuilds the release branch on the fork, \
            writes the catalog entry and opens a pull request. Running it again \
            for the same release updates the branch and comments on the open \
            pull request instead of opening a second one.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Publish from an unpacked package
    modpublish publish ./example-mod \\
        --download-url https://example.com/example-mod-1.0.0.zip \\
        --source https://github.com/alice/example-mod

    # See what would be written without touching GitHub
    modpublish publish ./example-mod --download-url https://... --dry-run

    # Record the package's SHA-256 in the entry
    modpublish publish ./example-mod --download-url https://... --hash"
    )]
    Publish(PublishArgs),

    /// Manage the stored GitHub token
    #[command(
        name = "auth",
        long_about = "Manage the stored GitHub token.\n\n\
            modpublish authenticates with a personal access token. The token is \
            read from GITHUB_TOKEN when set, otherwise from the secret store \
            written by 'modpublish auth login'.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Store a token (prompts with hidden input)
    modpublish auth login

    # Non-interactive
    modpublish auth login --token ghp_xxxx

    # Check whether a token is available
    modpublish auth status"
    )]
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    modpublish completion bash >> ~/.bashrc

    # Zsh
    modpublish completion zsh > ~/.zfunc/_modpublish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for `publish`.
#[derive(Args, Clone)]
pub struct PublishArgs {
    /// Unpacked package directory (or the manifest file itself)
    #[arg(value_name = "PACKAGE")]
    pub package: PathBuf,

    /// Where the package can be downloaded
    #[arg(long, value_name = "URL")]
    pub download_url: String,

    /// Source repository URL
    #[arg(long, value_name = "URL")]
    pub source: Option<String>,

    /// Funding link
    #[arg(long, value_name = "URL")]
    pub funding: Option<String>,

    /// Project website
    #[arg(long, value_name = "URL")]
    pub website: Option<String>,

    /// Catalog repository (overrides [upstream] in config)
    #[arg(long, value_name = "OWNER/REPO")]
    pub upstream: Option<RepoId>,

    /// Fork into this organization instead of your account
    #[arg(long, value_name = "ORG")]
    pub fork_org: Option<String>,

    /// Token to use for this run instead of GITHUB_TOKEN or the stored one
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Download the package and record its SHA-256
    #[arg(long)]
    pub hash: bool,

    /// Print what would be written without calling GitHub
    #[arg(long)]
    pub dry_run: bool,

    /// Open the pull request in a browser afterwards
    #[arg(long)]
    pub open: bool,
}

impl std::fmt::Debug for PublishArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishArgs")
            .field("package", &self.package)
            .field("download_url", &self.download_url)
            .field("source", &self.source)
            .field("upstream", &self.upstream)
            .field("fork_org", &self.fork_org)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("hash", &self.hash)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

/// Auth subcommands
#[derive(Subcommand, Clone)]
pub enum AuthAction {
    /// Store a personal access token
    Login {
        /// Token value; prompted for when omitted
        #[arg(long)]
        token: Option<String>,

        /// GitHub host the token is for
        #[arg(long, default_value = "github.com")]
        host: String,
    },
    /// Remove the stored token
    Logout {
        #[arg(long, default_value = "github.com")]
        host: String,
    },
    /// Show whether a token is available
    Status {
        #[arg(long, default_value = "github.com")]
        host: String,
    },
}

impl std::fmt::Debug for AuthAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthAction::Login { token, host } => f
                .debug_struct("Login")
                .field("token", &token.as_ref().map(|_| "[REDACTED]"))
                .field("host", host)
                .finish(),
            AuthAction::Logout { host } => f.debug_struct("Logout").field("host", host).finish(),
            AuthAction::Status { host } => f.debug_struct("Status").field("host", host).finish(),
        }
    }
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the path of the config file in use
    Path,
    /// Print the effective configuration
    Show,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
