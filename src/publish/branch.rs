//! publish::branch
//!
//! Brings the integration branch on the fork into a known state.
//!
//! # States
//!
//! - **Existing branch**: rebuilt from the fork's own default branch.
//! - **Missing branch**: created at the fork's default-branch head, then
//!   rebuilt from the parent's default branch so the pull request diffs
//!   cleanly against upstream.
//!
//! "Rebuild" is a forced ref update to another branch's head. It is not a
//! merge: whatever the integration branch carried before is dropped, and
//! the content stage writes the release on top again.

use crate::core::types::{BranchName, RepoId};
use crate::forge::{Forge, ForgeError, Repository};
use crate::ui::output::{self, Verbosity};

use super::errors::PublishError;

/// Which branch the integration branch was rebuilt from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildSource {
    /// The fork's default branch (branch already existed)
    ForkDefault,
    /// The parent's default branch (branch was just created)
    ParentDefault,
}

/// The integration branch after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledBranch {
    pub repo: RepoId,
    pub name: BranchName,
    /// Commit the branch points at now
    pub sha: String,
    /// Whether this run created the branch
    pub created: bool,
    pub rebuilt_from: RebuildSource,
}

/// Reconciles integration branches on a fork.
pub struct BranchReconciler<'a> {
    forge: &'a dyn Forge,
    verbosity: Verbosity,
}

impl<'a> BranchReconciler<'a> {
    pub fn new(forge: &'a dyn Forge, verbosity: Verbosity) -> Self {
        Self { forge, verbosity }
    }

    /// Ensure `branch` exists on `fork` and rebuild it from the right upstream.
    pub async fn reconcile(
        &self,
        fork: &Repository,
        branch: &BranchName,
    ) -> Result<ReconciledBranch, PublishError> {
        let exists = match self.forge.get_ref(&fork.id, branch.as_str()).await {
            Ok(_) => true,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                return Err(PublishError::forge(format!(
                    "reading branch '{}' on {}",
                    branch, fork.id
                ))(e))
            }
        };

        if exists {
            output::stage(
                "branch",
                format!("rebuilding {} from {}", branch, fork.default_branch),
                self.verbosity,
            );
            let sha = self
                .rebuild_branch(&fork.id, branch, &fork.id, &fork.default_branch)
                .await?;
            return Ok(ReconciledBranch {
                repo: fork.id.clone(),
                name: branch.clone(),
                sha,
                created: false,
                rebuilt_from: RebuildSource::ForkDefault,
            });
        }

        let parent = fork.parent.as_deref().ok_or_else(|| PublishError::NotAFork {
            fork: fork.id.clone(),
        })?;

        let head = self
            .forge
            .get_ref(&fork.id, &fork.default_branch)
            .await
            .map_err(PublishError::forge(format!(
                "reading default branch '{}' on {}",
                fork.default_branch, fork.id
            )))?;
        self.forge
            .create_ref(&fork.id, branch.as_str(), &head.sha)
            .await
            .map_err(PublishError::forge(format!(
                "creating branch '{}' on {}",
                branch, fork.id
            )))?;
        output::stage(
            "branch",
            format!("created {} at {}", branch, short(&head.sha)),
            self.verbosity,
        );

        let sha = self
            .rebuild_branch(&fork.id, branch, &parent.id, &parent.default_branch)
            .await?;
        Ok(ReconciledBranch {
            repo: fork.id.clone(),
            name: branch.clone(),
            sha,
            created: true,
            rebuilt_from: RebuildSource::ParentDefault,
        })
    }

    /// Force `branch` on `target` to the head of `source_branch` on `source`.
    ///
    /// Returns the commit the branch now points at. A refused update is
    /// [`PublishError::RefRejected`].
    pub async fn rebuild_branch(
        &self,
        target: &RepoId,
        branch: &BranchName,
        source: &RepoId,
        source_branch: &str,
    ) -> Result<String, PublishError> {
        let head = self
            .forge
            .get_ref(source, source_branch)
            .await
            .map_err(PublishError::forge(format!(
                "reading '{}' on {}",
                source_branch, source
            )))?;

        output::debug(
            format!(
                "force-updating {}:{} to {}/{}@{}",
                target,
                branch,
                source,
                source_branch,
                short(&head.sha)
            ),
            self.verbosity,
        );

        match self
            .forge
            .update_ref(target, branch.as_str(), &head.sha, true)
            .await
        {
            Ok(updated) => Ok(updated.sha),
            Err(e) if is_rejection(&e) => Err(PublishError::RefRejected {
                repo: target.clone(),
                branch: branch.to_string(),
                message: e.to_string(),
            }),
            Err(e) => Err(PublishError::forge(format!(
                "updating branch '{}' on {}",
                branch, target
            ))(e)),
        }
    }
}

/// The service understood the request and refused it.
fn is_rejection(e: &ForgeError) -> bool {
    match e {
        ForgeError::Conflict(_) | ForgeError::AuthFailed(_) => true,
        ForgeError::ApiError { status, .. } => *status == 409 || *status == 422,
        _ => false,
    }
}

fn short(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{FailOn, MockForge, MockOperation};

    fn upstream() -> RepoId {
        "catalog-org/catalog".parse().unwrap()
    }

    fn fork_id() -> RepoId {
        "alice/catalog".parse().unwrap()
    }

    fn branch() -> BranchName {
        BranchName::new("com.example.mod-1.0.0-1.29.1").unwrap()
    }

    /// Upstream and fork whose default branches point at different commits.
    async fn diverged() -> (MockForge, Repository, String, String) {
        let forge = MockForge::new("alice");
        forge.add_repo(&upstream(), "main", &[("blacklist.txt", "")]);
        forge.add_fork(&upstream(), &fork_id());
        let fork_head = forge.commit_file(&fork_id(), "main", "blacklist.txt", "alice/old\n");
        let parent_head = forge.commit_file(&upstream(), "main", "README.md", "new upstream");
        let fork = forge.get_repo(&fork_id()).await.unwrap();
        (forge, fork, fork_head, parent_head)
    }

    #[tokio::test]
    async fn new_branch_created_at_fork_head_then_rebuilt_from_parent() {
        let (forge, fork, fork_head, parent_head) = diverged().await;

        let result = BranchReconciler::new(&forge, Verbosity::Quiet)
            .reconcile(&fork, &branch())
            .await
            .unwrap();

        assert!(result.created);
        assert_eq!(result.rebuilt_from, RebuildSource::ParentDefault);
        assert_eq!(result.sha, parent_head);
        assert_eq!(forge.branch_sha(&fork_id(), branch().as_str()), Some(parent_head));

        let ops = forge.operations();
        assert!(ops.contains(&MockOperation::CreateRef {
            repo: "alice/catalog".into(),
            branch: branch().to_string(),
            sha: fork_head,
        }));
    }

    #[tokio::test]
    async fn existing_branch_rebuilt_from_fork_default() {
        let (forge, fork, fork_head, _) = diverged().await;
        forge
            .create_ref(&fork_id(), branch().as_str(), &fork_head)
            .await
            .unwrap();
        let stale = forge.commit_file(&fork_id(), branch().as_str(), "mods/x.json", "{}");
        forge.clear_operations();

        let result = BranchReconciler::new(&forge, Verbosity::Quiet)
            .reconcile(&fork, &branch())
            .await
            .unwrap();

        assert!(!result.created);
        assert_eq!(result.rebuilt_from, RebuildSource::ForkDefault);
        assert_eq!(result.sha, fork_head);
        assert_ne!(result.sha, stale);
        assert!(forge
            .file_text(&fork_id(), branch().as_str(), "mods/x.json")
            .is_none());
        assert!(!forge
            .operations()
            .iter()
            .any(|op| matches!(op, MockOperation::CreateRef { .. })));
    }

    #[tokio::test]
    async fn rejected_update_asks_for_manual_merge() {
        let (forge, fork, _, _) = diverged().await;
        let forge = forge.fail_on(FailOn::UpdateRef(ForgeError::ApiError {
            status: 422,
            message: "protected branch".into(),
        }));

        let err = BranchReconciler::new(&forge, Verbosity::Quiet)
            .reconcile(&fork, &branch())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::RefRejected { .. }));
        assert!(err.to_string().contains("manual merge"));
    }

    #[tokio::test]
    async fn network_failure_is_not_a_rejection() {
        let (forge, fork, _, _) = diverged().await;
        let forge = forge.fail_on(FailOn::UpdateRef(ForgeError::NetworkError("reset".into())));

        let err = BranchReconciler::new(&forge, Verbosity::Quiet)
            .reconcile(&fork, &branch())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::Forge { .. }));
    }

    #[test]
    fn short_sha() {
        assert_eq!(short("0123456789abcdef"), "0123456");
        assert_eq!(short("abc"), "abc");
    }
}
