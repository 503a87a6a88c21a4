//! publish
//!
//! The fork, branch, commit and pull request workflow for one release.
//!
//! # Stages
//!
//! A run goes through four stages in order, each using what the previous
//! one resolved:
//!
//! 1. [`fork`] - find or provision the fork of the catalog repository
//! 2. [`branch`] - create or rebuild the integration branch on the fork
//! 3. [`content`] - write the catalog entry and contributor list
//! 4. [`pull_request`] - open the pull request, or comment on ours
//!
//! Nothing is kept between runs: every stage asks the hosting API for the
//! current state first. Any stage failure ends the run with a
//! [`PublishError`]; commits already pushed to the branch stay there.
//!
//! # Example
//!
//! ```ignore
//! let publisher = Publisher::new(&forge, &TokioSleeper, settings, Verbosity::Normal);
//! let report = publisher.run(&request).await?;
//! println!("{}", report.pull_request.pull_request().url);
//! ```

pub mod branch;
pub mod content;
pub mod errors;
pub mod fork;
pub mod pull_request;
pub mod retry;

pub use branch::{BranchReconciler, RebuildSource, ReconciledBranch};
pub use content::{ContentPublisher, ContributorList, ContributorUpdate, FileWrite, WrittenFile};
pub use errors::PublishError;
pub use fork::{ForkResolver, ForkTarget};
pub use pull_request::{Identity, PrContent, PrOutcome, PullRequestNegotiator};
pub use retry::{poll_until, RetryError, RetryPolicy, Sleeper, TokioSleeper};

use crate::core::config::Config;
use crate::core::types::{BranchName, RepoId};
use crate::forge::github::parse_github_url;
use crate::forge::Forge;
use crate::manifest::catalog::{self, CatalogEntry, ReleaseLinks};
use crate::manifest::ModManifest;
use crate::ui::output::{self, Verbosity};

/// Where and how to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
    /// Catalog repository receiving the pull request
    pub upstream: RepoId,
    /// Organization to fork into (default: the acting account)
    pub fork_organization: Option<String>,
    /// Fork name (default: the upstream name)
    pub fork_name: Option<String>,
    pub mods_dir: String,
    pub blacklist_path: String,
    /// Budget for waiting on a newly requested fork
    pub fork_poll: RetryPolicy,
}

impl PublishSettings {
    /// Settings with built-in defaults.
    pub fn new(upstream: RepoId) -> Self {
        Self::from_config(&Config::default(), upstream)
    }

    pub fn from_config(config: &Config, upstream: RepoId) -> Self {
        Self {
            upstream,
            fork_organization: config.fork_organization().map(str::to_string),
            fork_name: config.fork_name().map(str::to_string),
            mods_dir: config.mods_dir().to_string(),
            blacklist_path: config.blacklist_path().to_string(),
            fork_poll: RetryPolicy::new(config.fork_poll_attempts(), config.fork_poll_delay()),
        }
    }
}

/// One release to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub manifest: ModManifest,
    pub download_url: String,
    /// Source repository URL; also names the contributor
    pub source_url: Option<String>,
    pub funding: Option<String>,
    pub website: Option<String>,
    /// SHA-256 hex of the package, if computed
    pub hash: Option<String>,
}

impl PublishRequest {
    /// Source repository, when the source URL points at one.
    pub fn source_repo(&self) -> Option<RepoId> {
        self.source_url.as_deref().and_then(parse_github_url)
    }
}

/// Everything a run will write, computed without the hosting API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPlan {
    pub branch: BranchName,
    pub entry_path: String,
    pub entry_json: String,
    pub commit_message: String,
    /// Contributor list line, `owner/repo` of the source repository
    pub contributor: Option<String>,
    pub pr: PrContent,
}

impl PublishPlan {
    pub fn build(
        request: &PublishRequest,
        settings: &PublishSettings,
        author_icon: Option<String>,
    ) -> Result<Self, PublishError> {
        let manifest = &request.manifest;
        manifest.validate()?;

        let links = ReleaseLinks {
            download: request.download_url.clone(),
            source: request.source_url.clone(),
            funding: request.funding.clone(),
            website: request.website.clone(),
            author_icon,
            hash: request.hash.clone(),
        };

        Ok(Self {
            branch: catalog::branch_name(manifest)?,
            entry_path: catalog::entry_path(manifest, &settings.mods_dir),
            entry_json: CatalogEntry::new(manifest, &links).to_json()?,
            commit_message: catalog::commit_message(manifest),
            contributor: request.source_repo().map(|r| r.to_string()),
            pr: PrContent {
                title: catalog::title(manifest),
                body: catalog::pr_body(manifest),
                update_comment: catalog::update_comment(manifest),
            },
        })
    }
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub identity: Identity,
    pub fork: RepoId,
    pub branch: ReconciledBranch,
    pub entry: WrittenFile,
    pub contributor: ContributorUpdate,
    pub pull_request: PrOutcome,
}

/// Runs the publish stages against a forge.
pub struct Publisher<'a> {
    forge: &'a dyn Forge,
    sleeper: &'a dyn Sleeper,
    settings: PublishSettings,
    verbosity: Verbosity,
}

impl<'a> Publisher<'a> {
    pub fn new(
        forge: &'a dyn Forge,
        sleeper: &'a dyn Sleeper,
        settings: PublishSettings,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            forge,
            sleeper,
            settings,
            verbosity,
        }
    }

    pub fn settings(&self) -> &PublishSettings {
        &self.settings
    }

    /// Publish one release.
    pub async fn run(&self, request: &PublishRequest) -> Result<PublishReport, PublishError> {
        let user = self
            .forge
            .current_user()
            .await
            .map_err(PublishError::forge("resolving the authenticated account"))?;
        let identity = Identity::new(user.login);
        output::debug(format!("acting as {}", identity.login), self.verbosity);

        if request.source_url.is_some() && request.source_repo().is_none() {
            output::warn(
                "source URL is not a GitHub repository; contributor list and author icon skipped",
                self.verbosity,
            );
        }
        let author_icon = self.author_icon(request).await;
        let plan = PublishPlan::build(request, &self.settings, author_icon)?;

        let target = ForkTarget::new(
            self.settings.upstream.clone(),
            &identity.login,
            self.settings.fork_organization.as_deref(),
            self.settings.fork_name.as_deref(),
        )?;
        let resolver =
            ForkResolver::new(self.forge, self.sleeper, self.settings.fork_poll, self.verbosity);
        let fork = resolver.resolve(&target).await?;
        let upstream = fork
            .parent
            .as_deref()
            .cloned()
            .ok_or_else(|| PublishError::NotAFork {
                fork: fork.id.clone(),
            })?;

        let branch = BranchReconciler::new(self.forge, self.verbosity)
            .reconcile(&fork, &plan.branch)
            .await?;

        let content = ContentPublisher::new(self.forge, self.verbosity);
        let entry = content
            .publish_file(
                &fork.id,
                &plan.branch,
                FileWrite::new(
                    plan.entry_path.as_str(),
                    plan.entry_json.as_str(),
                    plan.commit_message.as_str(),
                ),
            )
            .await?;

        let contributor = match &plan.contributor {
            Some(id) => {
                content
                    .append_contributor(
                        &upstream,
                        &fork.id,
                        &plan.branch,
                        &self.settings.blacklist_path,
                        id,
                        &catalog::contributor_message(id),
                    )
                    .await?
            }
            None => ContributorUpdate::Skipped,
        };

        let pull_request = PullRequestNegotiator::new(self.forge, self.verbosity)
            .negotiate(&upstream, &fork.id, &plan.branch, &identity, &plan.pr)
            .await?;

        Ok(PublishReport {
            identity,
            fork: fork.id,
            branch,
            entry,
            contributor,
            pull_request,
        })
    }

    /// Avatar of the source repository owner. Failures leave it empty.
    async fn author_icon(&self, request: &PublishRequest) -> Option<String> {
        let source = request.source_repo()?;
        match self.forge.get_user(source.owner()).await {
            Ok(user) => user.avatar_url,
            Err(e) => {
                output::warn(
                    format!("could not look up {} for the author icon: {}", source.owner(), e),
                    self.verbosity,
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{FailOn, MockForge};
    use crate::forge::ForgeError;
    use crate::publish::retry::tests::RecordingSleeper;

    fn manifest() -> ModManifest {
        ModManifest {
            name: "Example Mod".into(),
            id: "com.example.mod".into(),
            version: "1.0.0".into(),
            author: "Alice".into(),
            description: None,
            loader: Some("fabric".into()),
            porter: None,
            cover: None,
            package_id: None,
            package_version: Some("1.29.1".into()),
        }
    }

    fn request() -> PublishRequest {
        PublishRequest {
            manifest: manifest(),
            download_url: "https://example.com/mod.zip".into(),
            source_url: Some("https://github.com/alice/example-mod".into()),
            funding: None,
            website: None,
            hash: None,
        }
    }

    fn settings() -> PublishSettings {
        PublishSettings::new("catalog-org/catalog".parse().unwrap())
    }

    #[test]
    fn plan_derives_names_and_contributor() {
        let plan = PublishPlan::build(&request(), &settings(), None).unwrap();
        assert_eq!(plan.branch.as_str(), "com.example.mod-1.0.0-1.29.1");
        assert_eq!(plan.entry_path, "mods/1.29.1/com.example.mod-1.0.0.json");
        assert_eq!(plan.contributor.as_deref(), Some("alice/example-mod"));
        assert_eq!(plan.pr.title, "Example Mod v1.0.0");
        assert!(plan.commit_message.starts_with("Example Mod v1.0.0\n\n"));
    }

    #[test]
    fn plan_without_source_has_no_contributor() {
        let mut req = request();
        req.source_url = None;
        let plan = PublishPlan::build(&req, &settings(), None).unwrap();
        assert!(plan.contributor.is_none());
    }

    #[test]
    fn settings_from_defaults() {
        let s = settings();
        assert_eq!(s.mods_dir, "mods");
        assert_eq!(s.blacklist_path, "blacklist.txt");
        assert_eq!(s.fork_poll.max_attempts, 10);
        assert_eq!(s.fork_poll.delay, std::time::Duration::from_secs(2));
    }

    #[tokio::test]
    async fn author_icon_lookup_failure_is_not_fatal() {
        let forge = MockForge::new("alice").fail_on(FailOn::GetUser(ForgeError::RateLimited));
        forge.add_repo(&settings().upstream, "main", &[]);
        let sleeper = RecordingSleeper::default();

        let report = Publisher::new(&forge, &sleeper, settings(), Verbosity::Quiet)
            .run(&request())
            .await
            .unwrap();

        let entry = forge
            .file_text(&report.fork, report.branch.name.as_str(), &report.entry.path)
            .unwrap();
        assert!(entry.contains("\"authorIcon\": \"\""));
    }

    #[tokio::test]
    async fn identity_failure_stops_before_any_write() {
        let forge = MockForge::new("alice").fail_on(FailOn::CurrentUser(ForgeError::AuthRequired));
        forge.add_repo(&settings().upstream, "main", &[]);
        let sleeper = RecordingSleeper::default();

        let err = Publisher::new(&forge, &sleeper, settings(), Verbosity::Quiet)
            .run(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Forge { .. }));
        assert_eq!(forge.operations().len(), 1);
    }
}
