//! publish::errors
//!
//! Error types for the publish stages.
//!
//! Not-found results from the hosting API are branch points inside the
//! stages and never surface here on their own. Everything below stops the
//! run.

use thiserror::Error;

use crate::core::types::RepoId;
use crate::forge::ForgeError;
use crate::manifest::ManifestError;
use crate::package::PackageError;

/// Errors from a publish run.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The fork never became visible after requesting it.
    #[error(
        "fork {fork} was not visible after {attempts} attempts; \
         the hosting service may still be provisioning it, try again shortly"
    )]
    ForkTimeout { fork: RepoId, attempts: u32 },

    /// Something already lives at the fork coordinate and it is not a fork.
    #[error(
        "repository {fork} exists but is not a fork; \
         it is an unrelated repository, not a provisioning failure"
    )]
    NotAFork { fork: RepoId },

    /// The fork exists but was forked from somewhere else.
    #[error("repository {fork} is a fork of {actual}, expected a fork of {expected}")]
    ForkParentMismatch {
        fork: RepoId,
        expected: RepoId,
        actual: String,
    },

    /// The hosting service refused to move the integration branch.
    #[error(
        "could not reset branch '{branch}' on {repo}: {message}; \
         a manual merge may be required"
    )]
    RefRejected {
        repo: RepoId,
        branch: String,
        message: String,
    },

    /// A precondition-checked file write was refused.
    #[error(
        "write to '{path}' on branch '{branch}' was rejected: {message}; \
         the branch may have changed concurrently, manual intervention may be required"
    )]
    WriteRejected {
        path: String,
        branch: String,
        message: String,
    },

    /// The fork coordinate cannot be formed from the configured names.
    #[error("invalid fork target: {0}")]
    InvalidTarget(String),

    /// Any other hosting API failure, with what was being attempted.
    #[error("{context}: {error}")]
    Forge { context: String, error: ForgeError },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Package(#[from] PackageError),
}

impl PublishError {
    /// Wrap a forge error with what was being attempted.
    pub fn forge(context: impl Into<String>) -> impl FnOnce(ForgeError) -> PublishError {
        let context = context.into();
        move |error| PublishError::Forge { context, error }
    }
}
