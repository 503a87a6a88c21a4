//! publish::fork
//!
//! Finds or provisions the fork that pull requests are opened from.
//!
//! # Algorithm
//!
//! 1. Look the fork up directly. Found: verify and return (the common case).
//! 2. Not found: ask the hosting service to fork the upstream.
//! 3. Forking is asynchronous on the hosting side, so poll for the fork with
//!    the configured [`RetryPolicy`]. Running out of attempts is
//!    [`PublishError::ForkTimeout`].
//! 4. Verify the repository really is a fork of the upstream. A plain
//!    repository at the coordinate is [`PublishError::NotAFork`].

use crate::core::types::RepoId;
use crate::forge::{CreateForkRequest, Forge, ForgeError, Repository};
use crate::ui::output::{self, Verbosity};

use super::errors::PublishError;
use super::retry::{poll_until, RetryError, RetryPolicy, Sleeper};

/// Where the fork should be and what it forks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkTarget {
    pub upstream: RepoId,
    pub fork: RepoId,
    /// Organization to fork into; `None` forks into the acting account.
    pub organization: Option<String>,
}

impl ForkTarget {
    /// Fork coordinate from the acting login, an optional organization and
    /// an optional custom name.
    pub fn new(
        upstream: RepoId,
        acting_login: &str,
        organization: Option<&str>,
        name: Option<&str>,
    ) -> Result<Self, PublishError> {
        let owner = organization.unwrap_or(acting_login);
        let name = name.unwrap_or(upstream.name());
        let fork =
            RepoId::new(owner, name).map_err(|e| PublishError::InvalidTarget(e.to_string()))?;
        Ok(Self {
            upstream,
            fork,
            organization: organization.map(str::to_string),
        })
    }
}

/// Resolves [`ForkTarget`]s to verified fork repositories.
pub struct ForkResolver<'a> {
    forge: &'a dyn Forge,
    sleeper: &'a dyn Sleeper,
    policy: RetryPolicy,
    verbosity: Verbosity,
}

impl<'a> ForkResolver<'a> {
    pub fn new(
        forge: &'a dyn Forge,
        sleeper: &'a dyn Sleeper,
        policy: RetryPolicy,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            forge,
            sleeper,
            policy,
            verbosity,
        }
    }

    /// Return the fork described by `target`, creating it if needed.
    ///
    /// The returned repository carries its parent.
    pub async fn resolve(&self, target: &ForkTarget) -> Result<Repository, PublishError> {
        match self.forge.get_repo(&target.fork).await {
            Ok(repo) => {
                output::debug(format!("fork {} already exists", target.fork), self.verbosity);
                verify_fork(&repo, target)?;
                return Ok(repo);
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                return Err(PublishError::forge(format!("looking up fork {}", target.fork))(e))
            }
        }

        output::stage(
            "fork",
            format!("forking {} into {}", target.upstream, target.fork),
            self.verbosity,
        );
        let request = CreateForkRequest {
            organization: target.organization.clone(),
            name: (target.fork.name() != target.upstream.name())
                .then(|| target.fork.name().to_string()),
        };
        self.forge
            .create_fork(&target.upstream, request)
            .await
            .map_err(PublishError::forge(format!("forking {}", target.upstream)))?;

        let forge = self.forge;
        let fork = &target.fork;
        let verbosity = self.verbosity;
        let repo = poll_until(
            self.policy,
            self.sleeper,
            move |attempt| {
                output::debug(
                    format!("waiting for fork {} (attempt {})", fork, attempt),
                    verbosity,
                );
                forge.get_repo(fork)
            },
            ForgeError::is_not_found,
        )
        .await
        .map_err(|e| match e {
            RetryError::Exhausted { attempts, .. } => PublishError::ForkTimeout {
                fork: target.fork.clone(),
                attempts,
            },
            RetryError::Failed(error) => PublishError::Forge {
                context: format!("waiting for fork {}", target.fork),
                error,
            },
        })?;

        verify_fork(&repo, target)?;
        output::stage("fork", format!("created {}", repo.id), self.verbosity);
        Ok(repo)
    }
}

/// The repository must be a fork whose parent is the upstream.
pub fn verify_fork(repo: &Repository, target: &ForkTarget) -> Result<(), PublishError> {
    if !repo.is_fork {
        return Err(PublishError::NotAFork {
            fork: repo.id.clone(),
        });
    }
    match &repo.parent {
        Some(parent) if parent.id.same_as(&target.upstream) => Ok(()),
        other => Err(PublishError::ForkParentMismatch {
            fork: repo.id.clone(),
            expected: target.upstream.clone(),
            actual: other
                .as_ref()
                .map(|p| p.id.to_string())
                .unwrap_or_else(|| "an unknown parent".to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{FailOn, MockForge, MockOperation};
    use crate::publish::retry::tests::RecordingSleeper;
    use std::time::Duration;

    fn upstream() -> RepoId {
        "catalog-org/catalog".parse().unwrap()
    }

    fn target() -> ForkTarget {
        ForkTarget::new(upstream(), "alice", None, None).unwrap()
    }

    fn forge() -> MockForge {
        let forge = MockForge::new("alice");
        forge.add_repo(&upstream(), "main", &[("blacklist.txt", "")]);
        forge
    }

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_secs(2))
    }

    fn created_forks(forge: &MockForge) -> usize {
        forge
            .operations()
            .iter()
            .filter(|op| matches!(op, MockOperation::CreateFork { .. }))
            .count()
    }

    #[test]
    fn target_defaults_and_overrides() {
        assert_eq!(target().fork.to_string(), "alice/catalog");

        let org = ForkTarget::new(upstream(), "alice", Some("mods-team"), Some("cat")).unwrap();
        assert_eq!(org.fork.to_string(), "mods-team/cat");
        assert_eq!(org.organization.as_deref(), Some("mods-team"));
    }

    #[tokio::test]
    async fn existing_fork_skips_creation() {
        let forge = forge();
        forge.add_fork(&upstream(), &target().fork);
        let sleeper = RecordingSleeper::default();

        let repo = ForkResolver::new(&forge, &sleeper, policy(3), Verbosity::Quiet)
            .resolve(&target())
            .await
            .unwrap();

        assert_eq!(repo.id, target().fork);
        assert_eq!(created_forks(&forge), 0);
        assert_eq!(sleeper.count(), 0);
    }

    #[tokio::test]
    async fn waits_out_provisioning_delay() {
        let forge = forge();
        forge.set_fork_delay(2);
        let sleeper = RecordingSleeper::default();

        let repo = ForkResolver::new(&forge, &sleeper, policy(3), Verbosity::Quiet)
            .resolve(&target())
            .await
            .unwrap();

        assert!(repo.is_fork);
        assert_eq!(created_forks(&forge), 1);
        assert_eq!(sleeper.count(), 2);
    }

    #[tokio::test]
    async fn times_out_when_delay_exceeds_budget() {
        let forge = forge();
        forge.set_fork_delay(5);
        let sleeper = RecordingSleeper::default();

        let err = ForkResolver::new(&forge, &sleeper, policy(3), Verbosity::Quiet)
            .resolve(&target())
            .await
            .unwrap_err();

        match err {
            PublishError::ForkTimeout { fork, attempts } => {
                assert_eq!(fork.to_string(), "alice/catalog");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unrelated_repository_is_rejected() {
        let forge = forge();
        forge.add_repo(&target().fork, "main", &[]);
        let sleeper = RecordingSleeper::default();

        let err = ForkResolver::new(&forge, &sleeper, policy(3), Verbosity::Quiet)
            .resolve(&target())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::NotAFork { .. }));
        assert_eq!(created_forks(&forge), 0);
    }

    #[tokio::test]
    async fn fork_of_other_upstream_is_rejected() {
        let forge = forge();
        let other: RepoId = "someone/catalog".parse().unwrap();
        forge.add_repo(&other, "main", &[]);
        forge.add_fork(&other, &target().fork);
        let sleeper = RecordingSleeper::default();

        let err = ForkResolver::new(&forge, &sleeper, policy(3), Verbosity::Quiet)
            .resolve(&target())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::ForkParentMismatch { .. }));
    }

    #[tokio::test]
    async fn missing_upstream_propagates() {
        let forge = MockForge::new("alice");
        let sleeper = RecordingSleeper::default();

        let err = ForkResolver::new(&forge, &sleeper, policy(3), Verbosity::Quiet)
            .resolve(&target())
            .await
            .unwrap_err();

        match err {
            PublishError::Forge { error, .. } => assert!(error.is_not_found()),
            other => panic!("expected forge error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lookup_failure_is_not_retried() {
        let forge = forge().fail_on(FailOn::GetRepo(ForgeError::AuthFailed("bad".into())));
        let sleeper = RecordingSleeper::default();

        let err = ForkResolver::new(&forge, &sleeper, policy(3), Verbosity::Quiet)
            .resolve(&target())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PublishError::Forge {
                error: ForgeError::AuthFailed(_),
                ..
            }
        ));
        assert_eq!(created_forks(&forge), 0);
    }
}
