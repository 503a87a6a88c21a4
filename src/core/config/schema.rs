//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order:
//! 1. `$MODPUBLISH_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/modpublish/config.toml`
//! 3. `~/.modpublish/config.toml`
//!
//! # Validation
//!
//! Values are validated after parsing: repository coordinates must be
//! `owner/name` shaped, paths must be relative, and the poll budget must be
//! non-zero.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::RepoId;
use crate::secrets::VALID_PROVIDERS;

/// Configuration file contents.
///
/// # Example
///
/// ```toml
/// api_base = "https://api.github.com"
///
/// [upstream]
/// owner = "mod-catalog"
/// repo = "catalog"
///
/// [fork]
/// owner = "my-org"
///
/// [catalog]
/// mods_dir = "mods"
/// blacklist_path = "blacklist.txt"
/// manifest_name = "mod.json"
///
/// [fork_poll]
/// attempts = 10
/// delay_ms = 2000
///
/// [secrets]
/// provider = "file"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Hosting API base URL
    pub api_base: Option<String>,

    /// Catalog repository receiving pull requests
    pub upstream: Option<UpstreamConfig>,

    /// Where the fork lives
    pub fork: Option<ForkConfig>,

    /// Layout of the catalog repository
    pub catalog: Option<CatalogConfig>,

    /// Fork provisioning poll budget
    pub fork_poll: Option<ForkPollConfig>,

    /// Secret storage settings
    pub secrets: Option<SecretsConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = &self.api_base {
            if !(base.starts_with("https://") || base.starts_with("http://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "api_base must be an http(s) URL, got '{}'",
                    base
                )));
            }
        }
        if let Some(upstream) = &self.upstream {
            upstream.repo_id()?;
        }
        if let Some(fork) = &self.fork {
            fork.validate()?;
        }
        if let Some(catalog) = &self.catalog {
            catalog.validate()?;
        }
        if let Some(poll) = &self.fork_poll {
            poll.validate()?;
        }
        if let Some(secrets) = &self.secrets {
            secrets.validate()?;
        }
        Ok(())
    }
}

/// Upstream catalog repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UpstreamConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
}

impl UpstreamConfig {
    /// Both halves as a validated repository id.
    pub fn repo_id(&self) -> Result<RepoId, ConfigError> {
        match (&self.owner, &self.repo) {
            (Some(owner), Some(repo)) => RepoId::new(owner.as_str(), repo.as_str())
                .map_err(|e| ConfigError::InvalidValue(format!("[upstream]: {}", e))),
            _ => Err(ConfigError::InvalidValue(
                "[upstream] needs both 'owner' and 'repo'".to_string(),
            )),
        }
    }
}

/// Fork location. Both fields default to the acting identity and the
/// upstream repository name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ForkConfig {
    /// Organization to fork into
    pub owner: Option<String>,

    /// Fork repository name
    pub name: Option<String>,
}

impl ForkConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("owner", &self.owner), ("name", &self.name)] {
            if let Some(v) = value {
                if v.is_empty() || v.contains('/') || v.chars().any(char::is_whitespace) {
                    return Err(ConfigError::InvalidValue(format!(
                        "[fork] {} '{}' is not a valid name",
                        key, v
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Catalog repository layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Directory holding catalog entries (default: "mods")
    pub mods_dir: Option<String>,

    /// Contributor list file (default: "blacklist.txt")
    pub blacklist_path: Option<String>,

    /// Manifest file name inside a package (default: "mod.json")
    pub manifest_name: Option<String>,
}

impl CatalogConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("mods_dir", &self.mods_dir),
            ("blacklist_path", &self.blacklist_path),
            ("manifest_name", &self.manifest_name),
        ] {
            if let Some(v) = value {
                if v.trim().is_empty() || v.starts_with('/') || v.split('/').any(|s| s == "..") {
                    return Err(ConfigError::InvalidValue(format!(
                        "[catalog] {} must be a relative path, got '{}'",
                        key, v
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Fork provisioning poll budget.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ForkPollConfig {
    /// Maximum lookups after requesting the fork
    pub attempts: Option<u32>,

    /// Delay between lookups in milliseconds
    pub delay_ms: Option<u64>,
}

impl ForkPollConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.attempts == Some(0) {
            return Err(ConfigError::InvalidValue(
                "[fork_poll] attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Secrets configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsConfig {
    /// Provider to use
    pub provider: Option<String>,
}

impl SecretsConfig {
    /// Validate the secrets configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(provider) = &self.provider {
            if !VALID_PROVIDERS.contains(&provider.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid secrets provider '{}', must be one of: {}",
                    provider,
                    VALID_PROVIDERS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_valid() {
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn parse_full_file() {
        let config: FileConfig = toml::from_str(
            r#"
            api_base = "https://ghe.example.com/api/v3"

            [upstream]
            owner = "mod-catalog"
            repo = "catalog"

            [fork]
            owner = "my-org"

            [catalog]
            mods_dir = "entries"

            [fork_poll]
            attempts = 3
            delay_ms = 50
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(
            config.upstream.unwrap().repo_id().unwrap().to_string(),
            "mod-catalog/catalog"
        );
        assert_eq!(config.fork.unwrap().owner.as_deref(), Some("my-org"));
        assert_eq!(config.fork_poll.unwrap().delay_ms, Some(50));
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("trunk = \"main\"");
        assert!(result.is_err());

        let nested: Result<FileConfig, _> = toml::from_str("[catalog]\nmods = \"x\"");
        assert!(nested.is_err());
    }

    #[test]
    fn half_upstream_is_invalid() {
        let config = FileConfig {
            upstream: Some(UpstreamConfig {
                owner: Some("mod-catalog".into()),
                repo: None,
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn absolute_catalog_path_is_invalid() {
        let config = FileConfig {
            catalog: Some(CatalogConfig {
                blacklist_path: Some("/etc/passwd".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_attempts_is_invalid() {
        let config = FileConfig {
            fork_poll: Some(ForkPollConfig {
                attempts: Some(0),
                delay_ms: None,
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_api_base_is_invalid() {
        let config = FileConfig {
            api_base: Some("ftp://example.com".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_secrets_provider_is_invalid() {
        let config = FileConfig {
            secrets: Some(SecretsConfig {
                provider: Some("keychain".into()),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
