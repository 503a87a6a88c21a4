//! auth::errors
//!
//! Authentication error types.
//!
//! # Design
//!
//! Error messages MUST NOT contain tokens. All error variants carry
//! context (host names, store failures) without exposing secrets.
//!
//! # Example
//!
//! ```
//! use modpublish::auth::AuthError;
//!
//! let err = AuthError::NotAuthenticated("github.com".to_string());
//! assert!(err.to_string().contains("github.com"));
//! ```

use thiserror::Error;

/// Errors from authentication operations.
///
/// Error messages intentionally do not include token values.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token is available for the specified host.
    #[error("not authenticated for host '{0}'. Run 'modpublish auth login' or set GITHUB_TOKEN.")]
    NotAuthenticated(String),

    /// A token was supplied but cannot be used.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Error from secret storage.
    #[error("secret store error: {0}")]
    SecretStore(String),
}

impl AuthError {
    /// Check if this error can be resolved by running `modpublish auth login`.
    pub fn needs_login(&self) -> bool {
        matches!(
            self,
            AuthError::NotAuthenticated(_) | AuthError::InvalidToken(_)
        )
    }
}

impl From<crate::secrets::SecretError> for AuthError {
    fn from(err: crate::secrets::SecretError) -> Self {
        AuthError::SecretStore(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = AuthError::NotAuthenticated("github.com".to_string());
        let msg = err.to_string();
        assert!(msg.contains("github.com"));
        assert!(msg.contains("modpublish auth login"));

        let err = AuthError::InvalidToken("empty".into());
        assert!(err.to_string().contains("invalid token"));
    }

    #[test]
    fn needs_login() {
        assert!(AuthError::NotAuthenticated("h".into()).needs_login());
        assert!(AuthError::InvalidToken("x".into()).needs_login());
        assert!(!AuthError::SecretStore("io".into()).needs_login());
    }

    #[test]
    fn from_secret_error() {
        let err: AuthError = crate::secrets::SecretError::ReadError("disk".into()).into();
        assert!(matches!(err, AuthError::SecretStore(_)));
    }
}
