//! auth::provider
//!
//! [`TokenProvider`] implementations.
//!
//! # Resolution order
//!
//! [`StoredTokenProvider`] resolves a token for a host as follows:
//!
//! 1. The configured environment variable (default `GITHUB_TOKEN`), if set and non-empty
//! 2. The secret store entry `"{host}.token"`
//!
//! The token is never cached beyond a single call and never logged.

use std::sync::Arc;

use async_trait::async_trait;

use super::errors::AuthError;
use super::TokenProvider;
use crate::secrets::SecretStore;

/// Default environment variable consulted before the secret store.
pub const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Secret store key for a host's token.
pub fn secret_key(host: &str) -> String {
    format!("{}.token", host)
}

/// Token provider backed by an environment variable and a [`SecretStore`].
pub struct StoredTokenProvider {
    host: String,
    store: Arc<dyn SecretStore>,
    env_var: Option<String>,
}

impl std::fmt::Debug for StoredTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredTokenProvider")
            .field("host", &self.host)
            .field("env_var", &self.env_var)
            .finish()
    }
}

impl StoredTokenProvider {
    /// Create a provider for `host` that checks [`DEFAULT_TOKEN_ENV`] first.
    pub fn new(host: impl Into<String>, store: Arc<dyn SecretStore>) -> Self {
        Self {
            host: host.into(),
            store,
            env_var: Some(DEFAULT_TOKEN_ENV.to_string()),
        }
    }

    /// Use a different environment variable, or none at all.
    pub fn with_env_var(mut self, env_var: Option<String>) -> Self {
        self.env_var = env_var;
        self
    }

    fn from_env(&self) -> Option<String> {
        let var = self.env_var.as_deref()?;
        std::env::var(var)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    fn resolve(&self) -> Result<String, AuthError> {
        if let Some(token) = self.from_env() {
            return Ok(token);
        }
        match self.store.get(&secret_key(&self.host))? {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(AuthError::NotAuthenticated(self.host.clone())),
        }
    }
}

#[async_trait]
impl TokenProvider for StoredTokenProvider {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        self.resolve()
    }

    fn is_authenticated(&self) -> bool {
        self.resolve().is_ok()
    }

    fn host(&self) -> &str {
        &self.host
    }
}

/// Token provider holding a fixed token, e.g. one passed on the command line.
pub struct StaticTokenProvider {
    host: String,
    token: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("host", &self.host)
            .finish()
    }
}

impl StaticTokenProvider {
    /// Wrap a token for `host`.
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        if self.token.trim().is_empty() {
            return Err(AuthError::InvalidToken("token is empty".into()));
        }
        Ok(self.token.clone())
    }

    fn is_authenticated(&self) -> bool {
        !self.token.trim().is_empty()
    }

    fn host(&self) -> &str {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::FileSecretStore;
    use tempfile::TempDir;

    fn store() -> (TempDir, Arc<dyn SecretStore>) {
        let temp = TempDir::new().expect("create temp dir");
        let store = FileSecretStore::with_path(temp.path().join("secrets.toml"));
        (temp, Arc::new(store))
    }

    #[tokio::test]
    async fn reads_token_from_store() {
        let (_temp, store) = store();
        store.set("github.com.token", "ghp_stored").unwrap();

        let provider = StoredTokenProvider::new("github.com", store).with_env_var(None);

        assert!(provider.is_authenticated());
        assert_eq!(provider.bearer_token().await.unwrap(), "ghp_stored");
        assert_eq!(provider.host(), "github.com");
    }

    #[tokio::test]
    async fn missing_token_is_not_authenticated() {
        let (_temp, store) = store();
        let provider = StoredTokenProvider::new("github.com", store).with_env_var(None);

        assert!(!provider.is_authenticated());
        let err = provider.bearer_token().await.unwrap_err();
        assert!(matches!(err, AuthError::NotAuthenticated(ref h) if h == "github.com"));
    }

    #[tokio::test]
    async fn env_var_takes_precedence() {
        let (_temp, store) = store();
        store.set("github.com.token", "ghp_stored").unwrap();

        let var = "MODPUBLISH_TEST_TOKEN_PRECEDENCE";
        std::env::set_var(var, "ghp_env");
        let provider =
            StoredTokenProvider::new("github.com", store).with_env_var(Some(var.to_string()));
        let token = provider.bearer_token().await.unwrap();
        std::env::remove_var(var);

        assert_eq!(token, "ghp_env");
    }

    #[tokio::test]
    async fn static_provider_rejects_empty_token() {
        let provider = StaticTokenProvider::new("github.com", "  ");
        assert!(!provider.is_authenticated());
        assert!(provider.bearer_token().await.is_err());
    }

    #[test]
    fn debug_does_not_expose_token() {
        let provider = StaticTokenProvider::new("github.com", "ghp_secret_value");
        let output = format!("{:?}", provider);
        assert!(!output.contains("ghp_secret_value"));
        assert!(output.contains("github.com"));
    }
}
