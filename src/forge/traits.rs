//! forge::traits
//!
//! Forge trait definition for interacting with remote hosting services.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network I/O.
//! All methods return `Result` to handle API errors gracefully.
//!
//! Unlike a single-repository client, every repository-scoped operation takes
//! the [`RepoId`] it acts on: a publish run talks to both the upstream catalog
//! and the acting identity's fork through the same forge.
//!
//! # Example
//!
//! ```ignore
//! use modpublish::forge::{Forge, ForgeError};
//! use modpublish::core::types::RepoId;
//!
//! async fn show_default_branch(forge: &dyn Forge) -> Result<(), ForgeError> {
//!     let repo = RepoId::new("catalog-org", "catalog").unwrap();
//!     let info = forge.get_repo(&repo).await?;
//!     println!("{} tracks {}", info.id, info.default_branch);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::types::RepoId;

/// Errors from forge operations.
///
/// These error types map to common failure modes when interacting
/// with remote hosting services like GitHub.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required. Run 'modpublish auth login' or set GITHUB_TOKEN.")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write precondition no longer holds (stale revision token).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ForgeError {
    /// Whether this error means "the thing is not there".
    ///
    /// Not-found is a branch point for the publish stages, not a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ForgeError::NotFound(_))
    }
}

/// A hosted repository as reported by the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Owner and name
    pub id: RepoId,
    /// Default branch name
    pub default_branch: String,
    /// Whether the forge flags this repository as a fork
    pub is_fork: bool,
    /// The repository this one was forked from (one level only)
    pub parent: Option<Box<Repository>>,
    /// Web URL
    pub url: String,
}

/// A branch ref and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// Branch name (without `refs/heads/`)
    pub name: String,
    /// Commit SHA the branch points at
    pub sha: String,
}

/// Request to fork a repository.
#[derive(Debug, Clone, Default)]
pub struct CreateForkRequest {
    /// Organization to fork into (`None` forks into the acting user)
    pub organization: Option<String>,
    /// Name for the fork (`None` keeps the upstream name)
    pub name: Option<String>,
}

/// A file read from a branch, with its revision token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Path within the repository
    pub path: String,
    /// Decoded file content
    pub content: Vec<u8>,
    /// Revision token (blob SHA) identifying this version of the file
    pub sha: String,
}

impl RemoteFile {
    /// File content as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Concurrency precondition attached to a file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WritePrecondition {
    /// The file is expected not to exist; the write creates it.
    Create,
    /// The file must still be at this revision; the write replaces it.
    UpdateIfUnchanged(String),
}

impl WritePrecondition {
    /// The revision token this write is conditioned on, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            WritePrecondition::Create => None,
            WritePrecondition::UpdateIfUnchanged(sha) => Some(sha),
        }
    }
}

/// Request to create or update a file on a branch (one commit).
#[derive(Debug, Clone)]
pub struct PutFileRequest {
    /// Path within the repository
    pub path: String,
    /// New file content
    pub content: Vec<u8>,
    /// Commit message
    pub message: String,
    /// Branch to commit to
    pub branch: String,
    /// Create or update-if-unchanged
    pub precondition: WritePrecondition,
}

/// Result of a file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommit {
    /// Revision token of the file after the write
    pub content_sha: String,
    /// SHA of the commit the write produced
    pub commit_sha: String,
}

/// Filter for listing open pull requests.
#[derive(Debug, Clone)]
pub struct OpenPullsQuery {
    /// Head in `owner:branch` form
    pub head: String,
    /// Base branch name (if filtering by base)
    pub base: Option<String>,
}

/// Request to create a pull request.
#[derive(Debug, Clone)]
pub struct CreatePrRequest {
    /// Head in `owner:branch` form (cross-repository)
    pub head: String,
    /// Base branch name (the branch to merge into)
    pub base: String,
    /// PR title
    pub title: String,
    /// PR body/description
    pub body: Option<String>,
    /// Allow upstream maintainers to push to the head branch
    pub maintainer_can_modify: bool,
}

/// Pull request information returned from the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR URL (web URL for viewing)
    pub url: String,
    /// PR state (open, closed, merged)
    pub state: PrState,
    /// Head branch name
    pub head: String,
    /// Owner of the head repository (`None` when the fork was deleted)
    pub head_owner: Option<String>,
    /// Base branch name
    pub base: String,
    /// PR title
    pub title: String,
    /// PR body
    pub body: Option<String>,
    /// Login of the account that opened the PR
    pub author: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// PR state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    /// PR is open and awaiting review/merge
    Open,
    /// PR is closed without being merged
    Closed,
    /// PR has been merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrState::Open => write!(f, "open"),
            PrState::Closed => write!(f, "closed"),
            PrState::Merged => write!(f, "merged"),
        }
    }
}

/// A comment posted on a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment id
    pub id: u64,
    /// Web URL of the comment
    pub url: String,
}

/// A user account on the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Login name
    pub login: String,
    /// Avatar image URL
    pub avatar_url: Option<String>,
}

/// The Forge trait for interacting with remote hosting services.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`. Callers should handle:
/// - `NotFound`: Resource doesn't exist (often a branch point, not a failure)
/// - `Conflict`: A revision precondition failed
/// - `AuthRequired` / `AuthFailed`: Prompt user to authenticate
/// - `RateLimited`: Back off and retry
/// - `ApiError`: Display error message to user
/// - `NetworkError`: Check connectivity
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Fetch a repository.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no repository exists at the coordinate
    async fn get_repo(&self, repo: &RepoId) -> Result<Repository, ForgeError>;

    /// Request a fork of `upstream`.
    ///
    /// Forking is asynchronous on the hosting side: the fork may not be
    /// visible through [`Forge::get_repo`] for some time after this returns.
    async fn create_fork(
        &self,
        upstream: &RepoId,
        request: CreateForkRequest,
    ) -> Result<(), ForgeError>;

    /// Read a branch ref.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the branch does not exist
    async fn get_ref(&self, repo: &RepoId, branch: &str) -> Result<BranchRef, ForgeError>;

    /// Create a branch pointing at `sha`.
    async fn create_ref(
        &self,
        repo: &RepoId,
        branch: &str,
        sha: &str,
    ) -> Result<BranchRef, ForgeError>;

    /// Move a branch to `sha`. With `force`, history need not be preserved.
    ///
    /// # Errors
    ///
    /// - `ApiError` with status 422 if the update is rejected (protected branch,
    ///   non-fast-forward without force)
    async fn update_ref(
        &self,
        repo: &RepoId,
        branch: &str,
        sha: &str,
        force: bool,
    ) -> Result<BranchRef, ForgeError>;

    /// Read a file and its revision token at `reference` (branch name or SHA).
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file does not exist at that reference
    async fn get_file(
        &self,
        repo: &RepoId,
        path: &str,
        reference: &str,
    ) -> Result<RemoteFile, ForgeError>;

    /// Create or update a file as a single commit on a branch.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the precondition token is stale
    /// - `ApiError` with status 422 if a create hits an existing file
    async fn put_file(
        &self,
        repo: &RepoId,
        request: PutFileRequest,
    ) -> Result<FileCommit, ForgeError>;

    /// List open pull requests on `repo` matching the query.
    async fn list_open_pulls(
        &self,
        repo: &RepoId,
        query: OpenPullsQuery,
    ) -> Result<Vec<PullRequest>, ForgeError>;

    /// Open a pull request on `repo`.
    async fn create_pr(
        &self,
        repo: &RepoId,
        request: CreatePrRequest,
    ) -> Result<PullRequest, ForgeError>;

    /// Post a comment on a pull request.
    async fn create_comment(
        &self,
        repo: &RepoId,
        number: u64,
        body: &str,
    ) -> Result<Comment, ForgeError>;

    /// The account the forge is authenticated as.
    async fn current_user(&self) -> Result<User, ForgeError>;

    /// Look up a user by login.
    async fn get_user(&self, login: &str) -> Result<User, ForgeError>;
}
