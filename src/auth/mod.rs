//! auth - bearer tokens for the hosting API
//!
//! # Architecture
//!
//! Forge adapters never read credentials directly. They ask a
//! [`TokenProvider`] for a bearer token on every request, which keeps
//! credential lookup out of the publish stages and lets tests inject
//! fixed tokens.
//!
//! # Components
//!
//! - [`TokenProvider`] - Trait for providing bearer tokens to forge adapters
//! - [`StoredTokenProvider`] - Environment variable, then secret store
//! - [`StaticTokenProvider`] - A fixed token (e.g. from `--token`)
//!
//! # Security
//!
//! Tokens MUST never appear in logs (including `--debug`), error messages,
//! or debug output. All types in this module implement custom Debug to
//! redact token values.

mod errors;
mod provider;

pub use errors::AuthError;
pub use provider::{secret_key, StaticTokenProvider, StoredTokenProvider, DEFAULT_TOKEN_ENV};

/// Trait for providing bearer tokens to forge adapters.
///
/// # Implementation Notes
///
/// Implementors must never log or expose token values.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a bearer token for the host.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotAuthenticated`] if no token exists
    /// - [`AuthError::InvalidToken`] if the token cannot be used
    /// - [`AuthError::SecretStore`] if the backing store fails
    async fn bearer_token(&self) -> Result<String, AuthError>;

    /// Check if a token is available without returning it.
    fn is_authenticated(&self) -> bool;

    /// Get the host this provider authenticates for.
    fn host(&self) -> &str;
}
