//! secrets
//!
//! Secret storage for hosting API tokens.
//!
//! Secrets are stored through the [`SecretStore`] trait. The only shipped
//! provider is [`FileSecretStore`] (`~/.modpublish/secrets.toml`).
//!
//! # Security
//!
//! - Secrets are **never** logged or included in error messages
//! - The file store uses 0600 permissions on Unix
//! - All writes are atomic (temp file + rename)
//!
//! # Example
//!
//! ```ignore
//! use modpublish::secrets::{create_store, DEFAULT_PROVIDER};
//!
//! let store = create_store(DEFAULT_PROVIDER)?;
//! store.set("github.com.token", "ghp_xxxx...")?;
//! ```

mod file_store;

use std::sync::Arc;

use thiserror::Error;

pub use file_store::FileSecretStore;

/// Errors from secret storage operations.
///
/// Messages never include secret values.
#[derive(Debug, Error)]
pub enum SecretError {
    /// Failed to read from secret storage.
    #[error("failed to read secret: {0}")]
    ReadError(String),

    /// Failed to write to secret storage.
    #[error("failed to write secret: {0}")]
    WriteError(String),

    /// Provider not available or not configured.
    #[error("secret provider not available: {0}")]
    ProviderNotAvailable(String),
}

/// Key-value storage for secrets.
///
/// Keys are namespaced strings like `"github.com.token"`. Implementations
/// must be thread-safe and must never log or print values.
pub trait SecretStore: Send + Sync {
    /// Get a secret by key. `Ok(None)` if it does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;

    /// Set a secret, overwriting any existing value.
    fn set(&self, key: &str, value: &str) -> Result<(), SecretError>;

    /// Delete a secret. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), SecretError>;

    /// Check if a secret exists.
    fn exists(&self, key: &str) -> Result<bool, SecretError> {
        Ok(self.get(key)?.is_some())
    }
}

/// The default secret store provider name.
pub const DEFAULT_PROVIDER: &str = "file";

/// Valid provider names.
pub const VALID_PROVIDERS: &[&str] = &["file"];

/// Create a secret store by provider name.
///
/// # Errors
///
/// - Unknown provider name
/// - Initialization errors from the store (e.g. no home directory)
pub fn create_store(provider: &str) -> Result<Arc<dyn SecretStore>, SecretError> {
    match provider {
        "file" => Ok(Arc::new(FileSecretStore::new()?)),
        other => Err(SecretError::ProviderNotAvailable(format!(
            "unknown secret provider: '{}' (valid: {})",
            other,
            VALID_PROVIDERS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_unknown_provider() {
        match create_store("keychain") {
            Err(SecretError::ProviderNotAvailable(msg)) => {
                assert!(msg.contains("keychain"));
                assert!(msg.contains("file"));
            }
            Err(e) => panic!("unexpected error type: {:?}", e),
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn error_messages_name_the_operation() {
        assert!(SecretError::ReadError("disk".into())
            .to_string()
            .contains("read"));
        assert!(SecretError::WriteError("disk".into())
            .to_string()
            .contains("write"));
    }
}
