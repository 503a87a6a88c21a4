//! forge::github
//!
//! GitHub forge implementation using the REST API.
//!
//! # Design
//!
//! This module implements the `Forge` trait for GitHub. Every call is a single
//! REST request; there is no client-side caching, so each publish stage sees
//! the current remote state.
//!
//! File contents travel base64-encoded in both directions (contents API).
//!
//! # Authentication
//!
//! A [`TokenProvider`] is asked for a bearer token on every request. Tokens
//! never appear in `Debug` output or error messages.
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This implementation:
//! - Returns `ForgeError::RateLimited` when limits are hit
//! - Does not implement automatic retry for rate limits (caller's responsibility)
//!
//! # Example
//!
//! ```ignore
//! use modpublish::forge::github::GitHubForge;
//! use modpublish::auth::StaticTokenProvider;
//! use std::sync::Arc;
//!
//! let forge = GitHubForge::new(Arc::new(StaticTokenProvider::new("github.com", token)));
//! let me = forge.current_user().await?;
//! ```
//!
//! [`TokenProvider`]: crate::auth::TokenProvider

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use super::traits::{
    BranchRef, Comment, CreateForkRequest, CreatePrRequest, FileCommit, Forge, ForgeError,
    OpenPullsQuery, PrState, PullRequest, PutFileRequest, RemoteFile, Repository, User,
};
use crate::auth::TokenProvider;
use crate::core::types::RepoId;

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "modpublish";

/// GitHub forge implementation.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Source of bearer tokens
    token_provider: Arc<dyn TokenProvider>,
    /// API base URL (configurable for GitHub Enterprise and tests)
    api_base: String,
}

// Custom Debug to avoid touching the token provider
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("host", &self.token_provider.host())
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubForge {
    /// Create a GitHub forge against `api.github.com`.
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self::with_api_base(provider, DEFAULT_API_BASE)
    }

    /// Create a GitHub forge with a custom API base URL.
    ///
    /// Use this for GitHub Enterprise (`https://github.example.com/api/v3`)
    /// or a local test server.
    pub fn with_api_base(provider: Arc<dyn TokenProvider>, api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            client: Client::new(),
            token_provider: provider,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// The API base URL in use.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let token = self
            .token_provider
            .bearer_token()
            .await
            .map_err(|e| {
                if e.needs_login() {
                    ForgeError::AuthRequired
                } else {
                    ForgeError::AuthFailed(e.to_string())
                }
            })?;

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, repo: &RepoId, path: &str) -> String {
        if path.is_empty() {
            format!("{}/repos/{}/{}", self.api_base, repo.owner(), repo.name())
        } else {
            format!(
                "{}/repos/{}/{}/{}",
                self.api_base,
                repo.owner(),
                repo.name(),
                path
            )
        }
    }

    fn parse_url(url: &str, params: &[(&str, &str)]) -> Result<Url, ForgeError> {
        Url::parse_with_params(url, params).map_err(|e| ForgeError::ApiError {
            status: 0,
            message: format!("invalid request URL '{}': {}", url, e),
        })
    }

    /// Send a request and decode the JSON response.
    async fn send<B, T>(&self, method: Method, url: &str, body: Option<&B>) -> Result<T, ForgeError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .client
            .request(method, url)
            .headers(self.headers().await?);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;
        self.handle_response(response).await
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ForgeError> {
        self.send::<(), T>(Method::GET, url, None).await
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            Err(Self::error_for(response, status).await)
        }
    }

    async fn error_for(response: Response, status: StatusCode) -> ForgeError {
        let required_permissions = response
            .headers()
            .get("X-Accepted-GitHub-Permissions")
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN if message.to_lowercase().contains("rate limit") => {
                ForgeError::RateLimited
            }
            StatusCode::FORBIDDEN => {
                let mut err_msg = format!("Permission denied: {}", message);
                if let Some(perms) = required_permissions {
                    err_msg.push_str(&format!(" [required: {}]", perms));
                }
                ForgeError::AuthFailed(err_msg)
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::CONFLICT => ForgeError::Conflict(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn get_repo(&self, repo: &RepoId) -> Result<Repository, ForgeError> {
        let gh: GitHubRepository = self.get(&self.repo_url(repo, "")).await?;
        gh.try_into()
    }

    async fn create_fork(
        &self,
        upstream: &RepoId,
        request: CreateForkRequest,
    ) -> Result<(), ForgeError> {
        let body = CreateForkBody {
            organization: request.organization.as_deref(),
            name: request.name.as_deref(),
        };
        // 202 Accepted: GitHub provisions the fork in the background.
        let _: IgnoredAny = self
            .send(Method::POST, &self.repo_url(upstream, "forks"), Some(&body))
            .await?;
        Ok(())
    }

    async fn get_ref(&self, repo: &RepoId, branch: &str) -> Result<BranchRef, ForgeError> {
        let url = self.repo_url(repo, &format!("git/ref/heads/{}", branch));
        let gh: GitHubGitRef = self.get(&url).await?;
        Ok(gh.into())
    }

    async fn create_ref(
        &self,
        repo: &RepoId,
        branch: &str,
        sha: &str,
    ) -> Result<BranchRef, ForgeError> {
        let full_ref = format!("refs/heads/{}", branch);
        let body = CreateRefBody {
            ref_name: &full_ref,
            sha,
        };
        let gh: GitHubGitRef = self
            .send(Method::POST, &self.repo_url(repo, "git/refs"), Some(&body))
            .await?;
        Ok(gh.into())
    }

    async fn update_ref(
        &self,
        repo: &RepoId,
        branch: &str,
        sha: &str,
        force: bool,
    ) -> Result<BranchRef, ForgeError> {
        let url = self.repo_url(repo, &format!("git/refs/heads/{}", branch));
        let body = UpdateRefBody { sha, force };
        let gh: GitHubGitRef = self.send(Method::PATCH, &url, Some(&body)).await?;
        Ok(gh.into())
    }

    async fn get_file(
        &self,
        repo: &RepoId,
        path: &str,
        reference: &str,
    ) -> Result<RemoteFile, ForgeError> {
        let url = Self::parse_url(
            &self.repo_url(repo, &format!("contents/{}", path)),
            &[("ref", reference)],
        )?;
        let gh: GitHubContent = self.get(url.as_str()).await?;
        gh.try_into()
    }

    async fn put_file(
        &self,
        repo: &RepoId,
        request: PutFileRequest,
    ) -> Result<FileCommit, ForgeError> {
        let url = self.repo_url(repo, &format!("contents/{}", request.path));
        let encoded = STANDARD.encode(&request.content);
        let body = PutContentBody {
            message: &request.message,
            content: &encoded,
            branch: &request.branch,
            sha: request.precondition.token(),
        };
        let gh: GitHubPutContentResponse = self.send(Method::PUT, &url, Some(&body)).await?;
        Ok(FileCommit {
            content_sha: gh.content.sha,
            commit_sha: gh.commit.sha,
        })
    }

    async fn list_open_pulls(
        &self,
        repo: &RepoId,
        query: OpenPullsQuery,
    ) -> Result<Vec<PullRequest>, ForgeError> {
        let mut params = vec![
            ("state", "open"),
            ("head", query.head.as_str()),
            ("per_page", "100"),
        ];
        if let Some(base) = query.base.as_deref() {
            params.push(("base", base));
        }
        let url = Self::parse_url(&self.repo_url(repo, "pulls"), &params)?;
        let prs: Vec<GitHubPullRequest> = self.get(url.as_str()).await?;
        Ok(prs.into_iter().map(Into::into).collect())
    }

    async fn create_pr(
        &self,
        repo: &RepoId,
        request: CreatePrRequest,
    ) -> Result<PullRequest, ForgeError> {
        let body = CreatePrBody {
            head: &request.head,
            base: &request.base,
            title: &request.title,
            body: request.body.as_deref(),
            maintainer_can_modify: request.maintainer_can_modify,
        };
        let pr: GitHubPullRequest = self
            .send(Method::POST, &self.repo_url(repo, "pulls"), Some(&body))
            .await?;
        Ok(pr.into())
    }

    async fn create_comment(
        &self,
        repo: &RepoId,
        number: u64,
        body: &str,
    ) -> Result<Comment, ForgeError> {
        let url = self.repo_url(repo, &format!("issues/{}/comments", number));
        let gh: GitHubComment = self
            .send(Method::POST, &url, Some(&CommentBody { body }))
            .await?;
        Ok(Comment {
            id: gh.id,
            url: gh.html_url,
        })
    }

    async fn current_user(&self) -> Result<User, ForgeError> {
        let gh: GitHubUser = self.get(&format!("{}/user", self.api_base)).await?;
        Ok(gh.into())
    }

    async fn get_user(&self, login: &str) -> Result<User, ForgeError> {
        let gh: GitHubUser = self
            .get(&format!("{}/users/{}", self.api_base, login))
            .await?;
        Ok(gh.into())
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

#[derive(Serialize)]
struct CreateForkBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    ref_name: &'a str,
    sha: &'a str,
}

#[derive(Serialize)]
struct UpdateRefBody<'a> {
    sha: &'a str,
    force: bool,
}

#[derive(Serialize)]
struct PutContentBody<'a> {
    message: &'a str,
    content: &'a str,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Serialize)]
struct CreatePrBody<'a> {
    head: &'a str,
    base: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    maintainer_can_modify: bool,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

#[derive(Deserialize)]
struct GitHubOwner {
    login: String,
}

/// GitHub repository response (the `parent` is present only for forks).
#[derive(Deserialize)]
struct GitHubRepository {
    name: String,
    owner: GitHubOwner,
    default_branch: String,
    #[serde(default)]
    fork: bool,
    html_url: String,
    parent: Option<Box<GitHubRepository>>,
}

impl TryFrom<GitHubRepository> for Repository {
    type Error = ForgeError;

    fn try_from(gh: GitHubRepository) -> Result<Self, Self::Error> {
        let id = RepoId::new(gh.owner.login, gh.name).map_err(|e| ForgeError::ApiError {
            status: 200,
            message: e.to_string(),
        })?;
        let parent = match gh.parent {
            // GitHub reports one level of parentage; anything deeper is dropped.
            Some(parent) => Some(Box::new(Repository::try_from(GitHubRepository {
                parent: None,
                ..*parent
            })?)),
            None => None,
        };
        Ok(Repository {
            id,
            default_branch: gh.default_branch,
            is_fork: gh.fork,
            parent,
            url: gh.html_url,
        })
    }
}

#[derive(Deserialize)]
struct GitHubGitRef {
    #[serde(rename = "ref")]
    ref_name: String,
    object: GitHubGitObject,
}

#[derive(Deserialize)]
struct GitHubGitObject {
    sha: String,
}

impl From<GitHubGitRef> for BranchRef {
    fn from(gh: GitHubGitRef) -> Self {
        let name = gh
            .ref_name
            .strip_prefix("refs/heads/")
            .unwrap_or(&gh.ref_name)
            .to_string();
        BranchRef {
            name,
            sha: gh.object.sha,
        }
    }
}

#[derive(Deserialize)]
struct GitHubContent {
    path: String,
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

impl TryFrom<GitHubContent> for RemoteFile {
    type Error = ForgeError;

    fn try_from(gh: GitHubContent) -> Result<Self, Self::Error> {
        if let Some(encoding) = gh.encoding.as_deref() {
            if encoding != "base64" {
                return Err(ForgeError::ApiError {
                    status: 200,
                    message: format!("unsupported content encoding '{}' for {}", encoding, gh.path),
                });
            }
        }
        // GitHub wraps base64 content at 60 columns.
        let compact: String = gh.content.split_whitespace().collect();
        let content = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ForgeError::ApiError {
                status: 200,
                message: format!("invalid base64 content for {}: {}", gh.path, e),
            })?;
        Ok(RemoteFile {
            path: gh.path,
            content,
            sha: gh.sha,
        })
    }
}

#[derive(Deserialize)]
struct GitHubPutContentResponse {
    content: GitHubContentRef,
    commit: GitHubGitObject,
}

#[derive(Deserialize)]
struct GitHubContentRef {
    sha: String,
}

/// GitHub PR response format.
#[derive(Deserialize)]
struct GitHubPullRequest {
    number: u64,
    html_url: String,
    state: String,
    head: GitHubHeadRef,
    base: GitHubBaseRef,
    title: String,
    body: Option<String>,
    user: GitHubOwner,
    created_at: DateTime<Utc>,
    #[serde(default)]
    merged_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct GitHubHeadRef {
    #[serde(rename = "ref")]
    ref_name: String,
    /// Repository info (None for deleted forks)
    repo: Option<GitHubHeadRepo>,
}

#[derive(Deserialize)]
struct GitHubHeadRepo {
    owner: GitHubOwner,
}

#[derive(Deserialize)]
struct GitHubBaseRef {
    #[serde(rename = "ref")]
    ref_name: String,
}

impl From<GitHubPullRequest> for PullRequest {
    fn from(pr: GitHubPullRequest) -> Self {
        let state = if pr.merged_at.is_some() {
            PrState::Merged
        } else if pr.state == "closed" {
            PrState::Closed
        } else {
            PrState::Open
        };

        PullRequest {
            number: pr.number,
            url: pr.html_url,
            state,
            head: pr.head.ref_name,
            head_owner: pr.head.repo.map(|r| r.owner.login),
            base: pr.base.ref_name,
            title: pr.title,
            body: pr.body,
            author: pr.user.login,
            created_at: pr.created_at,
        }
    }
}

#[derive(Deserialize)]
struct GitHubComment {
    id: u64,
    html_url: String,
}

#[derive(Deserialize)]
struct GitHubUser {
    login: String,
    avatar_url: Option<String>,
}

impl From<GitHubUser> for User {
    fn from(gh: GitHubUser) -> Self {
        User {
            login: gh.login,
            avatar_url: gh.avatar_url.filter(|u| !u.is_empty()),
        }
    }
}

// --------------------------------------------------------------------------
// URL Parsing
// --------------------------------------------------------------------------

/// Credential host for an API base URL.
///
/// `https://api.github.com` maps to `github.com`; any other base (GitHub
/// Enterprise) maps to its own host name.
pub fn host_for_api_base(api_base: &str) -> String {
    if api_base.trim_end_matches('/') == DEFAULT_API_BASE {
        return "github.com".to_string();
    }
    Url::parse(api_base)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "github.com".to_string())
}

/// Parse a GitHub repository URL to extract owner and repo.
///
/// Supports both SSH and HTTPS formats, with or without `.git`, and ignores
/// anything after the repository segment (`/tree/main`, `/releases`, ...):
/// - `git@github.com:owner/repo.git`
/// - `https://github.com/owner/repo`
/// - `https://github.com/owner/repo/releases/tag/v1.0.0`
///
/// # Example
///
/// ```
/// use modpublish::forge::github::parse_github_url;
///
/// let repo = parse_github_url("https://github.com/octocat/hello-world/tree/main").unwrap();
/// assert_eq!(repo.owner(), "octocat");
/// assert_eq!(repo.name(), "hello-world");
/// ```
pub fn parse_github_url(url: &str) -> Option<RepoId> {
    let url = url.trim();
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"))
        .or_else(|| url.strip_prefix("https://www.github.com/"))?;

    let mut segments = rest.split('/');
    let owner = segments.next()?;
    let name = segments.next()?;
    let name = name.strip_suffix(".git").unwrap_or(name);
    RepoId::new(owner, name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;

    fn forge() -> GitHubForge {
        GitHubForge::new(Arc::new(StaticTokenProvider::new(
            "github.com",
            "secret_token_abc123",
        )))
    }

    #[test]
    fn credential_host() {
        assert_eq!(host_for_api_base("https://api.github.com"), "github.com");
        assert_eq!(host_for_api_base("https://api.github.com/"), "github.com");
        assert_eq!(
            host_for_api_base("https://ghe.example.com/api/v3"),
            "ghe.example.com"
        );
    }

    mod parse_github_url {
        use super::*;

        fn pair(url: &str) -> Option<(String, String)> {
            parse_github_url(url).map(|r| (r.owner().to_string(), r.name().to_string()))
        }

        #[test]
        fn ssh_and_https_forms() {
            let expected = Some(("octocat".to_string(), "hello-world".to_string()));
            assert_eq!(pair("git@github.com:octocat/hello-world.git"), expected);
            assert_eq!(pair("git@github.com:octocat/hello-world"), expected);
            assert_eq!(pair("https://github.com/octocat/hello-world.git"), expected);
            assert_eq!(pair("https://github.com/octocat/hello-world"), expected);
            assert_eq!(pair("http://github.com/octocat/hello-world"), expected);
        }

        #[test]
        fn ignores_trailing_path() {
            assert_eq!(
                pair("https://github.com/alice/example-mod/releases/tag/v1.0.0"),
                Some(("alice".to_string(), "example-mod".to_string()))
            );
            assert_eq!(
                pair("https://github.com/alice/example-mod/"),
                Some(("alice".to_string(), "example-mod".to_string()))
            );
        }

        #[test]
        fn rejects_other_hosts_and_garbage() {
            assert!(parse_github_url("git@gitlab.com:owner/repo.git").is_none());
            assert!(parse_github_url("https://gitlab.com/owner/repo").is_none());
            assert!(parse_github_url("not a url").is_none());
            assert!(parse_github_url("https://github.com/").is_none());
            assert!(parse_github_url("https://github.com/owner").is_none());
        }
    }

    mod github_forge {
        use super::*;

        #[test]
        fn name_and_default_base() {
            let forge = forge();
            assert_eq!(forge.name(), "github");
            assert_eq!(forge.api_base(), DEFAULT_API_BASE);
        }

        #[test]
        fn api_base_trailing_slash_is_trimmed() {
            let forge = GitHubForge::with_api_base(
                Arc::new(StaticTokenProvider::new("github.example.com", "t")),
                "https://github.example.com/api/v3/",
            );
            assert_eq!(forge.api_base(), "https://github.example.com/api/v3");
        }

        #[test]
        fn repo_url_format() {
            let forge = forge();
            let repo = RepoId::new("octocat", "hello-world").unwrap();
            assert_eq!(
                forge.repo_url(&repo, ""),
                "https://api.github.com/repos/octocat/hello-world"
            );
            assert_eq!(
                forge.repo_url(&repo, "git/refs"),
                "https://api.github.com/repos/octocat/hello-world/git/refs"
            );
        }

        #[test]
        fn debug_redacts_token() {
            let output = format!("{:?}", forge());
            assert!(!output.contains("secret_token_abc123"));
            assert!(output.contains("api_base"));
        }
    }

    mod conversions {
        use super::*;

        fn gh_repo(owner: &str, name: &str, fork: bool) -> GitHubRepository {
            GitHubRepository {
                name: name.to_string(),
                owner: GitHubOwner {
                    login: owner.to_string(),
                },
                default_branch: "main".to_string(),
                fork,
                html_url: format!("https://github.com/{}/{}", owner, name),
                parent: None,
            }
        }

        #[test]
        fn fork_with_parent() {
            let mut fork = gh_repo("alice", "catalog", true);
            let mut parent = gh_repo("catalog-org", "catalog", true);
            parent.parent = Some(Box::new(gh_repo("someone", "origin", false)));
            fork.parent = Some(Box::new(parent));

            let repo: Repository = fork.try_into().unwrap();
            assert!(repo.is_fork);
            let parent = repo.parent.expect("parent");
            assert_eq!(parent.id.to_string(), "catalog-org/catalog");
            assert!(parent.parent.is_none(), "only one level of parentage");
        }

        #[test]
        fn content_base64_with_line_breaks() {
            let gh = GitHubContent {
                path: "blacklist.txt".to_string(),
                sha: "abc".to_string(),
                content: "YWxp\nY2Uv\nbW9k\n".to_string(),
                encoding: Some("base64".to_string()),
            };
            let file: RemoteFile = gh.try_into().unwrap();
            assert_eq!(file.content, b"alice/mod");
            assert_eq!(file.sha, "abc");
        }

        #[test]
        fn content_with_unknown_encoding_fails() {
            let gh = GitHubContent {
                path: "big.bin".to_string(),
                sha: "abc".to_string(),
                content: String::new(),
                encoding: Some("none".to_string()),
            };
            assert!(RemoteFile::try_from(gh).is_err());
        }

        #[test]
        fn ref_name_strips_prefix() {
            let gh = GitHubGitRef {
                ref_name: "refs/heads/com.example.mod-1.0.0-1.29.1".to_string(),
                object: GitHubGitObject {
                    sha: "deadbeef".to_string(),
                },
            };
            let branch: BranchRef = gh.into();
            assert_eq!(branch.name, "com.example.mod-1.0.0-1.29.1");
            assert_eq!(branch.sha, "deadbeef");
        }
    }
}
