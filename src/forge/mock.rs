//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock keeps a small in-memory model of a hosting service:
//!
//! - repositories, each with branches pointing at commits
//! - a shared commit store (forks share commits with their upstream)
//! - file trees per commit, with blob SHAs derived from content
//! - pull requests and comments
//! - fork provisioning latency (a fork stays invisible for N lookups)
//!
//! Every trait call is recorded as a [`MockOperation`], and any single
//! operation can be configured to fail via [`FailOn`].
//!
//! # Example
//!
//! ```
//! use modpublish::core::types::RepoId;
//! use modpublish::forge::mock::MockForge;
//! use modpublish::forge::Forge;
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new("alice");
//! let upstream = RepoId::new("catalog-org", "catalog").unwrap();
//! forge.add_repo(&upstream, "main", &[("README.md", "catalog")]);
//!
//! let repo = forge.get_repo(&upstream).await.unwrap();
//! assert_eq!(repo.default_branch, "main");
//! assert!(!repo.is_fork);
//! # });
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::traits::{
    BranchRef, Comment, CreateForkRequest, CreatePrRequest, FileCommit, Forge, ForgeError,
    OpenPullsQuery, PrState, PullRequest, PutFileRequest, RemoteFile, Repository, User,
    WritePrecondition,
};
use crate::core::types::RepoId;

/// Seconds since the epoch used as the first mock PR timestamp.
const BASE_TIMESTAMP: i64 = 1_700_000_000;

type Tree = BTreeMap<String, Vec<u8>>;

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockForge {
    inner: Arc<Mutex<MockForgeInner>>,
}

#[derive(Debug)]
struct MockRepo {
    repo: Repository,
    branches: BTreeMap<String, String>,
    /// Remaining `get_repo` lookups that report NotFound (fork provisioning)
    hidden_for: u32,
}

#[derive(Debug)]
struct MockForgeInner {
    acting_login: String,
    users: HashMap<String, User>,
    repos: HashMap<String, MockRepo>,
    commits: HashMap<String, Tree>,
    next_commit: u64,
    prs: Vec<(RepoId, PullRequest)>,
    next_pr_number: u64,
    comments: Vec<RecordedComment>,
    fork_delay: u32,
    fail_on: Option<FailOn>,
    operations: Vec<MockOperation>,
}

/// A comment posted through the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedComment {
    /// Repository the PR lives in
    pub repo: RepoId,
    /// PR number
    pub number: u64,
    /// Comment text
    pub body: String,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    GetRepo(ForgeError),
    CreateFork(ForgeError),
    GetRef(ForgeError),
    CreateRef(ForgeError),
    UpdateRef(ForgeError),
    GetFile(ForgeError),
    PutFile(ForgeError),
    ListOpenPulls(ForgeError),
    CreatePr(ForgeError),
    CreateComment(ForgeError),
    CurrentUser(ForgeError),
    GetUser(ForgeError),
}

impl FailOn {
    fn matches(&self, op: &MockOperation) -> Option<&ForgeError> {
        match (self, op) {
            (FailOn::GetRepo(e), MockOperation::GetRepo { .. })
            | (FailOn::CreateFork(e), MockOperation::CreateFork { .. })
            | (FailOn::GetRef(e), MockOperation::GetRef { .. })
            | (FailOn::CreateRef(e), MockOperation::CreateRef { .. })
            | (FailOn::UpdateRef(e), MockOperation::UpdateRef { .. })
            | (FailOn::GetFile(e), MockOperation::GetFile { .. })
            | (FailOn::PutFile(e), MockOperation::PutFile { .. })
            | (FailOn::ListOpenPulls(e), MockOperation::ListOpenPulls { .. })
            | (FailOn::CreatePr(e), MockOperation::CreatePr { .. })
            | (FailOn::CreateComment(e), MockOperation::CreateComment { .. })
            | (FailOn::CurrentUser(e), MockOperation::CurrentUser)
            | (FailOn::GetUser(e), MockOperation::GetUser { .. }) => Some(e),
            _ => None,
        }
    }
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    GetRepo {
        repo: String,
    },
    CreateFork {
        upstream: String,
        organization: Option<String>,
    },
    GetRef {
        repo: String,
        branch: String,
    },
    CreateRef {
        repo: String,
        branch: String,
        sha: String,
    },
    UpdateRef {
        repo: String,
        branch: String,
        sha: String,
        force: bool,
    },
    GetFile {
        repo: String,
        path: String,
        reference: String,
    },
    PutFile {
        repo: String,
        path: String,
        branch: String,
        precondition: WritePrecondition,
    },
    ListOpenPulls {
        repo: String,
        head: String,
    },
    CreatePr {
        repo: String,
        head: String,
        base: String,
        title: String,
    },
    CreateComment {
        repo: String,
        number: u64,
    },
    CurrentUser,
    GetUser {
        login: String,
    },
}

fn key(repo: &RepoId) -> String {
    repo.to_string().to_lowercase()
}

/// Blob SHA for content: identical content always yields the same token.
pub fn blob_sha(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    hex::encode(digest)[..40].to_string()
}

impl MockForge {
    /// Create an empty mock forge authenticated as `acting_login`.
    pub fn new(acting_login: &str) -> Self {
        let mut users = HashMap::new();
        users.insert(
            acting_login.to_lowercase(),
            User {
                login: acting_login.to_string(),
                avatar_url: Some(format!("https://avatars.example.com/{}", acting_login)),
            },
        );
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner {
                acting_login: acting_login.to_string(),
                users,
                repos: HashMap::new(),
                commits: HashMap::new(),
                next_commit: 1,
                prs: Vec::new(),
                next_pr_number: 1,
                comments: Vec::new(),
                fork_delay: 0,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockForgeInner> {
        self.inner.lock().unwrap()
    }

    /// Configure the mock to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// Forks created from now on stay invisible for `lookups` calls to `get_repo`.
    pub fn set_fork_delay(&self, lookups: u32) {
        self.lock().fork_delay = lookups;
    }

    /// Register a user (for avatar lookups).
    pub fn add_user(&self, login: &str, avatar_url: Option<&str>) {
        self.lock().users.insert(
            login.to_lowercase(),
            User {
                login: login.to_string(),
                avatar_url: avatar_url.map(str::to_string),
            },
        );
    }

    /// Add a non-fork repository whose default branch holds `files`.
    ///
    /// Returns the SHA of the initial commit.
    pub fn add_repo(&self, id: &RepoId, default_branch: &str, files: &[(&str, &str)]) -> String {
        let mut inner = self.lock();
        let tree: Tree = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.as_bytes().to_vec()))
            .collect();
        let sha = inner.new_commit(tree);
        let mut branches = BTreeMap::new();
        branches.insert(default_branch.to_string(), sha.clone());
        inner.repos.insert(
            key(id),
            MockRepo {
                repo: Repository {
                    id: id.clone(),
                    default_branch: default_branch.to_string(),
                    is_fork: false,
                    parent: None,
                    url: format!("https://github.com/{}", id),
                },
                branches,
                hidden_for: 0,
            },
        );
        sha
    }

    /// Add an already-provisioned fork of `upstream` at `fork`.
    ///
    /// # Panics
    ///
    /// Panics if `upstream` does not exist.
    pub fn add_fork(&self, upstream: &RepoId, fork: &RepoId) {
        let mut inner = self.lock();
        inner
            .provision_fork(upstream, fork, 0)
            .expect("upstream repository must exist");
    }

    /// Commit `content` at `path` directly onto a branch, bypassing preconditions.
    ///
    /// Returns the new commit SHA.
    pub fn commit_file(&self, repo: &RepoId, branch: &str, path: &str, content: &str) -> String {
        let mut inner = self.lock();
        let head = inner
            .branch_sha(repo, branch)
            .expect("branch must exist");
        let mut tree = inner.commits.get(&head).cloned().unwrap_or_default();
        tree.insert(path.to_string(), content.as_bytes().to_vec());
        let sha = inner.new_commit(tree);
        if let Some(r) = inner.repos.get_mut(&key(repo)) {
            r.branches.insert(branch.to_string(), sha.clone());
        }
        sha
    }

    /// Add a pull request as if it had been opened earlier.
    pub fn add_pr(&self, repo: &RepoId, pr: PullRequest) {
        let mut inner = self.lock();
        inner.next_pr_number = inner.next_pr_number.max(pr.number + 1);
        inner.prs.push((repo.clone(), pr));
    }

    /// Current SHA of a branch, if it exists.
    pub fn branch_sha(&self, repo: &RepoId, branch: &str) -> Option<String> {
        self.lock().branch_sha(repo, branch)
    }

    /// File content on a branch, if both exist.
    pub fn file_text(&self, repo: &RepoId, branch: &str, path: &str) -> Option<String> {
        let inner = self.lock();
        let sha = inner.branch_sha(repo, branch)?;
        inner
            .commits
            .get(&sha)?
            .get(path)
            .map(|c| String::from_utf8_lossy(c).into_owned())
    }

    /// Whether a repository is registered (visible or still provisioning).
    pub fn has_repo(&self, repo: &RepoId) -> bool {
        self.lock().repos.contains_key(&key(repo))
    }

    /// All pull requests on a repository.
    pub fn prs(&self, repo: &RepoId) -> Vec<PullRequest> {
        self.lock()
            .prs
            .iter()
            .filter(|(r, _)| r.same_as(repo))
            .map(|(_, pr)| pr.clone())
            .collect()
    }

    /// All comments posted through the mock.
    pub fn comments(&self) -> Vec<RecordedComment> {
        self.lock().comments.clone()
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.lock().operations.clear();
    }

    /// Record an operation, returning the configured failure for it, if any.
    fn record(&self, op: MockOperation) -> Result<(), ForgeError> {
        let mut inner = self.lock();
        let failure = inner
            .fail_on
            .as_ref()
            .and_then(|f| f.matches(&op))
            .cloned();
        inner.operations.push(op);
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl MockForgeInner {
    fn new_commit(&mut self, tree: Tree) -> String {
        let sha = format!("{:040x}", self.next_commit);
        self.next_commit += 1;
        self.commits.insert(sha.clone(), tree);
        sha
    }

    fn repo(&self, id: &RepoId) -> Result<&MockRepo, ForgeError> {
        self.repos
            .get(&key(id))
            .ok_or_else(|| ForgeError::NotFound(format!("repository {}", id)))
    }

    fn branch_sha(&self, id: &RepoId, branch: &str) -> Option<String> {
        self.repos.get(&key(id))?.branches.get(branch).cloned()
    }

    fn resolve_tree(&self, id: &RepoId, reference: &str) -> Result<&Tree, ForgeError> {
        let repo = self.repo(id)?;
        let sha = repo
            .branches
            .get(reference)
            .map(String::as_str)
            .unwrap_or(reference);
        self.commits
            .get(sha)
            .ok_or_else(|| ForgeError::NotFound(format!("ref {} in {}", reference, id)))
    }

    fn provision_fork(
        &mut self,
        upstream: &RepoId,
        fork: &RepoId,
        hidden_for: u32,
    ) -> Result<(), ForgeError> {
        let source = self.repo(upstream)?;
        let parent = Repository {
            parent: None,
            ..source.repo.clone()
        };
        let branches = source.branches.clone();
        self.repos.insert(
            key(fork),
            MockRepo {
                repo: Repository {
                    id: fork.clone(),
                    default_branch: parent.default_branch.clone(),
                    is_fork: true,
                    parent: Some(Box::new(parent)),
                    url: format!("https://github.com/{}", fork),
                },
                branches,
                hidden_for,
            },
        );
        Ok(())
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_repo(&self, repo: &RepoId) -> Result<Repository, ForgeError> {
        self.record(MockOperation::GetRepo {
            repo: repo.to_string(),
        })?;

        let mut inner = self.lock();
        let entry = inner
            .repos
            .get_mut(&key(repo))
            .ok_or_else(|| ForgeError::NotFound(format!("repository {}", repo)))?;
        if entry.hidden_for > 0 {
            entry.hidden_for -= 1;
            return Err(ForgeError::NotFound(format!("repository {}", repo)));
        }
        Ok(entry.repo.clone())
    }

    async fn create_fork(
        &self,
        upstream: &RepoId,
        request: CreateForkRequest,
    ) -> Result<(), ForgeError> {
        self.record(MockOperation::CreateFork {
            upstream: upstream.to_string(),
            organization: request.organization.clone(),
        })?;

        let mut inner = self.lock();
        let owner = request
            .organization
            .clone()
            .unwrap_or_else(|| inner.acting_login.clone());
        let name = request
            .name
            .clone()
            .unwrap_or_else(|| upstream.name().to_string());
        let fork = RepoId::new(owner, name).map_err(|e| ForgeError::ApiError {
            status: 422,
            message: e.to_string(),
        })?;

        if inner.repos.contains_key(&key(&fork)) {
            return Ok(());
        }
        let delay = inner.fork_delay;
        inner.provision_fork(upstream, &fork, delay)
    }

    async fn get_ref(&self, repo: &RepoId, branch: &str) -> Result<BranchRef, ForgeError> {
        self.record(MockOperation::GetRef {
            repo: repo.to_string(),
            branch: branch.to_string(),
        })?;

        let inner = self.lock();
        inner.repo(repo)?;
        inner
            .branch_sha(repo, branch)
            .map(|sha| BranchRef {
                name: branch.to_string(),
                sha,
            })
            .ok_or_else(|| ForgeError::NotFound(format!("branch {} in {}", branch, repo)))
    }

    async fn create_ref(
        &self,
        repo: &RepoId,
        branch: &str,
        sha: &str,
    ) -> Result<BranchRef, ForgeError> {
        self.record(MockOperation::CreateRef {
            repo: repo.to_string(),
            branch: branch.to_string(),
            sha: sha.to_string(),
        })?;

        let mut inner = self.lock();
        if !inner.commits.contains_key(sha) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Object does not exist".into(),
            });
        }
        let entry = inner
            .repos
            .get_mut(&key(repo))
            .ok_or_else(|| ForgeError::NotFound(format!("repository {}", repo)))?;
        if entry.branches.contains_key(branch) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Reference already exists".into(),
            });
        }
        entry.branches.insert(branch.to_string(), sha.to_string());
        Ok(BranchRef {
            name: branch.to_string(),
            sha: sha.to_string(),
        })
    }

    async fn update_ref(
        &self,
        repo: &RepoId,
        branch: &str,
        sha: &str,
        force: bool,
    ) -> Result<BranchRef, ForgeError> {
        self.record(MockOperation::UpdateRef {
            repo: repo.to_string(),
            branch: branch.to_string(),
            sha: sha.to_string(),
            force,
        })?;

        let mut inner = self.lock();
        if !inner.commits.contains_key(sha) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Object does not exist".into(),
            });
        }
        let entry = inner
            .repos
            .get_mut(&key(repo))
            .ok_or_else(|| ForgeError::NotFound(format!("repository {}", repo)))?;
        match entry.branches.get_mut(branch) {
            Some(current) => {
                // Without ancestry tracking every non-forced move counts as non-fast-forward.
                if !force && current != sha {
                    return Err(ForgeError::ApiError {
                        status: 422,
                        message: "Update is not a fast forward".into(),
                    });
                }
                *current = sha.to_string();
                Ok(BranchRef {
                    name: branch.to_string(),
                    sha: sha.to_string(),
                })
            }
            None => Err(ForgeError::ApiError {
                status: 422,
                message: "Reference does not exist".into(),
            }),
        }
    }

    async fn get_file(
        &self,
        repo: &RepoId,
        path: &str,
        reference: &str,
    ) -> Result<RemoteFile, ForgeError> {
        self.record(MockOperation::GetFile {
            repo: repo.to_string(),
            path: path.to_string(),
            reference: reference.to_string(),
        })?;

        let inner = self.lock();
        let tree = inner.resolve_tree(repo, reference)?;
        let content = tree
            .get(path)
            .ok_or_else(|| ForgeError::NotFound(format!("{} at {}", path, reference)))?;
        Ok(RemoteFile {
            path: path.to_string(),
            sha: blob_sha(content),
            content: content.clone(),
        })
    }

    async fn put_file(
        &self,
        repo: &RepoId,
        request: PutFileRequest,
    ) -> Result<FileCommit, ForgeError> {
        self.record(MockOperation::PutFile {
            repo: repo.to_string(),
            path: request.path.clone(),
            branch: request.branch.clone(),
            precondition: request.precondition.clone(),
        })?;

        let mut inner = self.lock();
        let mut tree = inner.resolve_tree(repo, &request.branch)?.clone();
        let current = tree.get(&request.path).map(|c| blob_sha(c));

        match (&request.precondition, current.as_deref()) {
            (WritePrecondition::Create, Some(_)) => {
                return Err(ForgeError::ApiError {
                    status: 422,
                    message: "Invalid request. \"sha\" wasn't supplied.".into(),
                })
            }
            (WritePrecondition::UpdateIfUnchanged(token), Some(existing)) if token != existing => {
                return Err(ForgeError::Conflict(format!(
                    "{} does not match {}",
                    request.path, token
                )))
            }
            (WritePrecondition::UpdateIfUnchanged(_), None) => {
                return Err(ForgeError::Conflict(format!(
                    "{} no longer exists",
                    request.path
                )))
            }
            _ => {}
        }

        let content_sha = blob_sha(&request.content);
        tree.insert(request.path.clone(), request.content);
        let commit_sha = inner.new_commit(tree);
        if let Some(entry) = inner.repos.get_mut(&key(repo)) {
            entry.branches.insert(request.branch, commit_sha.clone());
        }
        Ok(FileCommit {
            content_sha,
            commit_sha,
        })
    }

    async fn list_open_pulls(
        &self,
        repo: &RepoId,
        query: OpenPullsQuery,
    ) -> Result<Vec<PullRequest>, ForgeError> {
        self.record(MockOperation::ListOpenPulls {
            repo: repo.to_string(),
            head: query.head.clone(),
        })?;

        let inner = self.lock();
        inner.repo(repo)?;
        let (head_owner, head_branch) = query
            .head
            .split_once(':')
            .unwrap_or(("", query.head.as_str()));

        Ok(inner
            .prs
            .iter()
            .filter(|(r, _)| r.same_as(repo))
            .map(|(_, pr)| pr)
            .filter(|pr| pr.state == PrState::Open && pr.head == head_branch)
            .filter(|pr| {
                pr.head_owner
                    .as_deref()
                    .is_some_and(|o| o.eq_ignore_ascii_case(head_owner))
            })
            .filter(|pr| query.base.as_deref().map_or(true, |b| pr.base == b))
            .cloned()
            .collect())
    }

    async fn create_pr(
        &self,
        repo: &RepoId,
        request: CreatePrRequest,
    ) -> Result<PullRequest, ForgeError> {
        self.record(MockOperation::CreatePr {
            repo: repo.to_string(),
            head: request.head.clone(),
            base: request.base.clone(),
            title: request.title.clone(),
        })?;

        let mut inner = self.lock();
        inner.repo(repo)?;
        let (head_owner, head_branch) = request
            .head
            .split_once(':')
            .map(|(o, b)| (o.to_string(), b.to_string()))
            .unwrap_or_else(|| (repo.owner().to_string(), request.head.clone()));

        let duplicate = inner.prs.iter().any(|(r, pr)| {
            r.same_as(repo)
                && pr.state == PrState::Open
                && pr.head == head_branch
                && pr.base == request.base
                && pr
                    .head_owner
                    .as_deref()
                    .is_some_and(|o| o.eq_ignore_ascii_case(&head_owner))
        });
        if duplicate {
            return Err(ForgeError::ApiError {
                status: 422,
                message: format!("A pull request already exists for {}", request.head),
            });
        }

        let number = inner.next_pr_number;
        inner.next_pr_number += 1;
        let created_at = DateTime::<Utc>::from_timestamp(BASE_TIMESTAMP + number as i64 * 60, 0)
            .unwrap_or_default();

        let pr = PullRequest {
            number,
            url: format!("https://github.com/{}/pull/{}", repo, number),
            state: PrState::Open,
            head: head_branch,
            head_owner: Some(head_owner),
            base: request.base,
            title: request.title,
            body: request.body,
            author: inner.acting_login.clone(),
            created_at,
        };
        inner.prs.push((repo.clone(), pr.clone()));
        Ok(pr)
    }

    async fn create_comment(
        &self,
        repo: &RepoId,
        number: u64,
        body: &str,
    ) -> Result<Comment, ForgeError> {
        self.record(MockOperation::CreateComment {
            repo: repo.to_string(),
            number,
        })?;

        let mut inner = self.lock();
        let exists = inner
            .prs
            .iter()
            .any(|(r, pr)| r.same_as(repo) && pr.number == number);
        if !exists {
            return Err(ForgeError::NotFound(format!("PR #{}", number)));
        }
        inner.comments.push(RecordedComment {
            repo: repo.clone(),
            number,
            body: body.to_string(),
        });
        let id = inner.comments.len() as u64;
        Ok(Comment {
            id,
            url: format!(
                "https://github.com/{}/pull/{}#issuecomment-{}",
                repo, number, id
            ),
        })
    }

    async fn current_user(&self) -> Result<User, ForgeError> {
        self.record(MockOperation::CurrentUser)?;

        let inner = self.lock();
        let login = inner.acting_login.to_lowercase();
        inner
            .users
            .get(&login)
            .cloned()
            .ok_or_else(|| ForgeError::AuthFailed("no acting user".into()))
    }

    async fn get_user(&self, login: &str) -> Result<User, ForgeError> {
        self.record(MockOperation::GetUser {
            login: login.to_string(),
        })?;

        self.lock()
            .users
            .get(&login.to_lowercase())
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("user {}", login)))
    }
}
