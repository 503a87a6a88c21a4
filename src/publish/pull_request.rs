//! publish::pull_request
//!
//! Opens the pull request for a release, or comments on the one already open.
//!
//! Open pull requests on the upstream whose head is `{fork_owner}:{branch}`
//! and whose author is the acting [`Identity`] count as ours. If any exist,
//! one of them gets an update comment and nothing else changes. Otherwise a
//! new pull request is opened against the upstream default branch.
//!
//! When several of ours are open, the most recently created wins, with the
//! higher number breaking ties.

use crate::core::types::{BranchName, RepoId};
use crate::forge::{Comment, CreatePrRequest, Forge, OpenPullsQuery, PullRequest, Repository};
use crate::ui::output::{self, Verbosity};

use super::errors::PublishError;

/// The account a run acts as, resolved once and passed down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub login: String,
}

impl Identity {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }

    /// Logins compare case-insensitively.
    pub fn is(&self, login: &str) -> bool {
        self.login.eq_ignore_ascii_case(login)
    }
}

/// Title and body for a new pull request, plus the comment for an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrContent {
    pub title: String,
    pub body: String,
    pub update_comment: String,
}

/// What the negotiator did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrOutcome {
    Created(PullRequest),
    Commented {
        pull_request: PullRequest,
        comment: Comment,
    },
}

impl PrOutcome {
    pub fn pull_request(&self) -> &PullRequest {
        match self {
            PrOutcome::Created(pr) => pr,
            PrOutcome::Commented { pull_request, .. } => pull_request,
        }
    }
}

/// Pick our existing pull request among `candidates`.
pub fn select_existing<'p>(
    candidates: &'p [PullRequest],
    identity: &Identity,
) -> Option<&'p PullRequest> {
    candidates
        .iter()
        .filter(|pr| identity.is(&pr.author))
        .max_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then(a.number.cmp(&b.number))
        })
}

pub struct PullRequestNegotiator<'a> {
    forge: &'a dyn Forge,
    verbosity: Verbosity,
}

impl<'a> PullRequestNegotiator<'a> {
    pub fn new(forge: &'a dyn Forge, verbosity: Verbosity) -> Self {
        Self { forge, verbosity }
    }

    /// Ensure exactly one open pull request from `fork:branch` into the
    /// upstream default branch, authored by `identity`.
    pub async fn negotiate(
        &self,
        upstream: &Repository,
        fork: &RepoId,
        branch: &BranchName,
        identity: &Identity,
        content: &PrContent,
    ) -> Result<PrOutcome, PublishError> {
        let head = format!("{}:{}", fork.owner(), branch);
        let open = self
            .forge
            .list_open_pulls(
                &upstream.id,
                OpenPullsQuery {
                    head: head.clone(),
                    base: Some(upstream.default_branch.clone()),
                },
            )
            .await
            .map_err(PublishError::forge(format!(
                "listing pull requests on {}",
                upstream.id
            )))?;
        output::debug(
            format!("{} open pull request(s) from {}", open.len(), head),
            self.verbosity,
        );

        if let Some(existing) = select_existing(&open, identity) {
            let comment = self
                .forge
                .create_comment(&upstream.id, existing.number, &content.update_comment)
                .await
                .map_err(PublishError::forge(format!(
                    "commenting on #{}",
                    existing.number
                )))?;
            output::stage(
                "pr",
                format!("updated #{}: {}", existing.number, existing.url),
                self.verbosity,
            );
            return Ok(PrOutcome::Commented {
                pull_request: existing.clone(),
                comment,
            });
        }

        let pr = self
            .forge
            .create_pr(
                &upstream.id,
                CreatePrRequest {
                    head,
                    base: upstream.default_branch.clone(),
                    title: content.title.clone(),
                    body: Some(content.body.clone()),
                    maintainer_can_modify: true,
                },
            )
            .await
            .map_err(PublishError::forge(format!(
                "opening pull request on {}",
                upstream.id
            )))?;
        output::stage(
            "pr",
            format!("opened #{}: {}", pr.number, pr.url),
            self.verbosity,
        );
        Ok(PrOutcome::Created(pr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{MockForge, MockOperation};
    use crate::forge::PrState;
    use chrono::{DateTime, Utc};

    fn upstream_id() -> RepoId {
        "catalog-org/catalog".parse().unwrap()
    }

    fn fork_id() -> RepoId {
        "alice/catalog".parse().unwrap()
    }

    fn branch() -> BranchName {
        BranchName::new("com.example.mod-1.0.0-1.29.1").unwrap()
    }

    fn content() -> PrContent {
        PrContent {
            title: "Example Mod v1.0.0".into(),
            body: "ID: com.example.mod".into(),
            update_comment: "Updated manifest to Example Mod v1.0.0.".into(),
        }
    }

    fn pr(number: u64, author: &str, created: i64) -> PullRequest {
        PullRequest {
            number,
            url: format!("https://github.com/catalog-org/catalog/pull/{}", number),
            state: PrState::Open,
            head: branch().to_string(),
            head_owner: Some("alice".into()),
            base: "main".into(),
            title: "t".into(),
            body: None,
            author: author.into(),
            created_at: DateTime::<Utc>::from_timestamp(created, 0).unwrap(),
        }
    }

    async fn setup() -> (MockForge, Repository) {
        let forge = MockForge::new("alice");
        forge.add_repo(&upstream_id(), "main", &[]);
        let upstream = forge.get_repo(&upstream_id()).await.unwrap();
        (forge, upstream)
    }

    #[test]
    fn select_prefers_newest_then_highest_number() {
        let me = Identity::new("Alice");
        let prs = vec![
            pr(3, "alice", 100),
            pr(7, "alice", 300),
            pr(5, "alice", 300),
            pr(9, "mallory", 900),
        ];
        assert_eq!(select_existing(&prs, &me).map(|p| p.number), Some(7));
        assert!(select_existing(&prs[3..], &me).is_none());
    }

    #[tokio::test]
    async fn opens_new_pull_request() {
        let (forge, upstream) = setup().await;
        let negotiator = PullRequestNegotiator::new(&forge, Verbosity::Quiet);

        let outcome = negotiator
            .negotiate(&upstream, &fork_id(), &branch(), &Identity::new("alice"), &content())
            .await
            .unwrap();

        let created = match outcome {
            PrOutcome::Created(pr) => pr,
            other => panic!("expected new PR, got {other:?}"),
        };
        assert_eq!(created.title, "Example Mod v1.0.0");
        assert_eq!(created.base, "main");
        assert!(forge.operations().contains(&MockOperation::CreatePr {
            repo: "catalog-org/catalog".into(),
            head: "alice:com.example.mod-1.0.0-1.29.1".into(),
            base: "main".into(),
            title: "Example Mod v1.0.0".into(),
        }));
    }

    #[tokio::test]
    async fn comments_on_existing_pull_request() {
        let (forge, upstream) = setup().await;
        forge.add_pr(&upstream_id(), pr(4, "alice", 100));
        let negotiator = PullRequestNegotiator::new(&forge, Verbosity::Quiet);

        let outcome = negotiator
            .negotiate(&upstream, &fork_id(), &branch(), &Identity::new("alice"), &content())
            .await
            .unwrap();

        assert!(matches!(outcome, PrOutcome::Commented { .. }));
        assert_eq!(outcome.pull_request().number, 4);
        assert_eq!(forge.prs(&upstream_id()).len(), 1);
        let comments = forge.comments();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].number, 4);
        assert!(comments[0].body.starts_with("Updated manifest"));
    }

    #[tokio::test]
    async fn pull_request_from_other_fork_is_ignored() {
        let (forge, upstream) = setup().await;
        let mut theirs = pr(4, "mallory", 100);
        theirs.head_owner = Some("mallory".into());
        forge.add_pr(&upstream_id(), theirs);
        let negotiator = PullRequestNegotiator::new(&forge, Verbosity::Quiet);

        let outcome = negotiator
            .negotiate(&upstream, &fork_id(), &branch(), &Identity::new("alice"), &content())
            .await
            .unwrap();

        assert!(matches!(outcome, PrOutcome::Created(_)));
        assert_eq!(outcome.pull_request().number, 5);
        assert!(forge.comments().is_empty());
    }
}
