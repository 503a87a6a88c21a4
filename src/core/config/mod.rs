//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Locations
//!
//! Searched in order:
//! 1. `$MODPUBLISH_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/modpublish/config.toml`
//! 3. `~/.modpublish/config.toml` (canonical location)
//!
//! A missing file is not an error; defaults apply.
//!
//! # Example
//!
//! ```no_run
//! use modpublish::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("API: {}", config.api_base());
//! println!("catalog entries under: {}", config.mods_dir());
//! ```

pub mod schema;

pub use schema::FileConfig;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::types::RepoId;
use crate::forge::github::DEFAULT_API_BASE;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "MODPUBLISH_CONFIG";

/// Default directory for catalog entries.
pub const DEFAULT_MODS_DIR: &str = "mods";

/// Default contributor list file.
pub const DEFAULT_BLACKLIST_PATH: &str = "blacklist.txt";

/// Default manifest file name inside a package.
pub const DEFAULT_MANIFEST_NAME: &str = "mod.json";

/// Default number of fork lookups after requesting a fork.
pub const DEFAULT_FORK_POLL_ATTEMPTS: u32 = 10;

/// Default delay between fork lookups.
pub const DEFAULT_FORK_POLL_DELAY_MS: u64 = 2000;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration with defaults applied through accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Raw file contents
    pub file: FileConfig,
    /// Path the file was loaded from, if any
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated. Missing files are not an error.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate a specific config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// First existing file in the search order.
    fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("modpublish/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".modpublish/config.toml"))
            .filter(|path| path.exists())
    }

    /// Get the canonical config path, `~/.modpublish/config.toml`.
    pub fn canonical_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".modpublish/config.toml"))
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Hosting API base URL.
    pub fn api_base(&self) -> &str {
        self.file.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Upstream catalog repository, if configured.
    pub fn upstream(&self) -> Option<RepoId> {
        self.file.upstream.as_ref().and_then(|u| u.repo_id().ok())
    }

    /// Organization to fork into. `None` means the acting identity.
    pub fn fork_organization(&self) -> Option<&str> {
        self.file.fork.as_ref().and_then(|f| f.owner.as_deref())
    }

    /// Fork repository name. `None` means the upstream name.
    pub fn fork_name(&self) -> Option<&str> {
        self.file.fork.as_ref().and_then(|f| f.name.as_deref())
    }

    pub fn mods_dir(&self) -> &str {
        self.file
            .catalog
            .as_ref()
            .and_then(|c| c.mods_dir.as_deref())
            .unwrap_or(DEFAULT_MODS_DIR)
    }

    pub fn blacklist_path(&self) -> &str {
        self.file
            .catalog
            .as_ref()
            .and_then(|c| c.blacklist_path.as_deref())
            .unwrap_or(DEFAULT_BLACKLIST_PATH)
    }

    pub fn manifest_name(&self) -> &str {
        self.file
            .catalog
            .as_ref()
            .and_then(|c| c.manifest_name.as_deref())
            .unwrap_or(DEFAULT_MANIFEST_NAME)
    }

    /// Fork lookups after requesting a fork.
    pub fn fork_poll_attempts(&self) -> u32 {
        self.file
            .fork_poll
            .as_ref()
            .and_then(|p| p.attempts)
            .unwrap_or(DEFAULT_FORK_POLL_ATTEMPTS)
    }

    /// Delay between fork lookups.
    pub fn fork_poll_delay(&self) -> Duration {
        Duration::from_millis(
            self.file
                .fork_poll
                .as_ref()
                .and_then(|p| p.delay_ms)
                .unwrap_or(DEFAULT_FORK_POLL_DELAY_MS),
        )
    }

    /// Get the secrets provider.
    ///
    /// Defaults to "file" if not configured.
    pub fn secrets_provider(&self) -> &str {
        self.file
            .secrets
            .as_ref()
            .and_then(|s| s.provider.as_deref())
            .unwrap_or(crate::secrets::DEFAULT_PROVIDER)
    }

    /// Path the configuration was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
