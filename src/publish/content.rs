//! publish::content
//!
//! Precondition-checked file writes on the integration branch.
//!
//! Each write first reads the file's current revision token on the branch.
//! A token turns the write into [`WritePrecondition::UpdateIfUnchanged`];
//! no token (missing file, or any read failure) makes it a
//! [`WritePrecondition::Create`]. A refused write is reported as
//! [`PublishError::WriteRejected`] and never retried here.
//!
//! The contributor list is a newline-delimited file of `owner/repo` lines.
//! Entries compare case-insensitively and are only ever appended.

use crate::core::types::{BranchName, RepoId};
use crate::forge::{FileCommit, Forge, ForgeError, PutFileRequest, Repository, WritePrecondition};
use crate::ui::output::{self, Verbosity};

use super::errors::PublishError;

/// One file to write: path, desired content and commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    pub path: String,
    pub content: Vec<u8>,
    pub message: String,
}

impl FileWrite {
    pub fn new(
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            message: message.into(),
        }
    }
}

/// A write that went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: String,
    /// Precondition the write was made under
    pub precondition: WritePrecondition,
    pub commit: FileCommit,
}

/// What happened to the contributor list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContributorUpdate {
    /// No contributor could be derived (no source repository)
    Skipped,
    /// Already listed upstream
    ListedUpstream,
    /// Already listed on the integration branch
    ListedOnBranch,
    /// Appended in a new commit
    Appended(WrittenFile),
}

/// A newline-delimited list of contributor identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributorList {
    text: String,
}

impl ContributorList {
    pub fn parse(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Non-empty, trimmed entries.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.text.lines().map(str::trim).filter(|l| !l.is_empty())
    }

    /// Case-insensitive membership.
    pub fn contains(&self, contributor: &str) -> bool {
        let wanted = contributor.trim();
        self.entries().any(|e| e.eq_ignore_ascii_case(wanted))
    }

    /// Append `contributor` unless present. Returns whether it was added.
    ///
    /// Existing text is kept byte for byte.
    pub fn append(&mut self, contributor: &str) -> bool {
        if self.contains(contributor) {
            return false;
        }
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push_str(contributor.trim());
        self.text.push('\n');
        true
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Writes files to a branch with revision-token preconditions.
pub struct ContentPublisher<'a> {
    forge: &'a dyn Forge,
    verbosity: Verbosity,
}

impl<'a> ContentPublisher<'a> {
    pub fn new(forge: &'a dyn Forge, verbosity: Verbosity) -> Self {
        Self { forge, verbosity }
    }

    /// Precondition for writing `path` on `branch` right now.
    pub async fn read_precondition(
        &self,
        repo: &RepoId,
        branch: &BranchName,
        path: &str,
    ) -> WritePrecondition {
        match self.forge.get_file(repo, path, branch.as_str()).await {
            Ok(file) => WritePrecondition::UpdateIfUnchanged(file.sha),
            Err(e) => {
                if !e.is_not_found() {
                    output::debug(
                        format!("reading {} failed ({}), writing as new file", path, e),
                        self.verbosity,
                    );
                }
                WritePrecondition::Create
            }
        }
    }

    /// Write one file. Identical content is still written.
    pub async fn publish_file(
        &self,
        repo: &RepoId,
        branch: &BranchName,
        write: FileWrite,
    ) -> Result<WrittenFile, PublishError> {
        let precondition = self.read_precondition(repo, branch, &write.path).await;
        self.put(repo, branch, write, precondition).await
    }

    /// Write files in order, stopping at the first failure.
    pub async fn publish_files(
        &self,
        repo: &RepoId,
        branch: &BranchName,
        writes: Vec<FileWrite>,
    ) -> Result<Vec<WrittenFile>, PublishError> {
        let mut written = Vec::with_capacity(writes.len());
        for write in writes {
            written.push(self.publish_file(repo, branch, write).await?);
        }
        Ok(written)
    }

    async fn put(
        &self,
        repo: &RepoId,
        branch: &BranchName,
        write: FileWrite,
        precondition: WritePrecondition,
    ) -> Result<WrittenFile, PublishError> {
        let path = write.path.clone();
        let verb = match precondition {
            WritePrecondition::Create => "creating",
            WritePrecondition::UpdateIfUnchanged(_) => "updating",
        };
        output::stage("content", format!("{} {}", verb, path), self.verbosity);

        let request = PutFileRequest {
            path: write.path,
            content: write.content,
            message: write.message,
            branch: branch.to_string(),
            precondition: precondition.clone(),
        };
        match self.forge.put_file(repo, request).await {
            Ok(commit) => Ok(WrittenFile {
                path,
                precondition,
                commit,
            }),
            Err(e) if is_rejection(&e) => Err(PublishError::WriteRejected {
                path,
                branch: branch.to_string(),
                message: e.to_string(),
            }),
            Err(e) => Err(PublishError::forge(format!("writing {}", path))(e)),
        }
    }

    /// Add `contributor` to the list at `path` unless already listed,
    /// either upstream or on the integration branch.
    pub async fn append_contributor(
        &self,
        upstream: &Repository,
        fork: &RepoId,
        branch: &BranchName,
        path: &str,
        contributor: &str,
        message: &str,
    ) -> Result<ContributorUpdate, PublishError> {
        let upstream_list = match self
            .forge
            .get_file(&upstream.id, path, &upstream.default_branch)
            .await
        {
            Ok(file) => ContributorList::parse(file.text()),
            Err(e) if e.is_not_found() => ContributorList::default(),
            Err(e) => {
                return Err(PublishError::forge(format!(
                    "reading {} on {}",
                    path, upstream.id
                ))(e))
            }
        };
        if upstream_list.contains(contributor) {
            output::debug(format!("{} already listed upstream", contributor), self.verbosity);
            return Ok(ContributorUpdate::ListedUpstream);
        }

        let (mut branch_list, precondition) =
            match self.forge.get_file(fork, path, branch.as_str()).await {
                Ok(file) => (
                    ContributorList::parse(file.text()),
                    WritePrecondition::UpdateIfUnchanged(file.sha),
                ),
                Err(e) if e.is_not_found() => {
                    (ContributorList::default(), WritePrecondition::Create)
                }
                Err(e) => {
                    return Err(PublishError::forge(format!(
                        "reading {} on {}:{}",
                        path, fork, branch
                    ))(e))
                }
            };
        if !branch_list.append(contributor) {
            output::debug(format!("{} already listed on {}", contributor, branch), self.verbosity);
            return Ok(ContributorUpdate::ListedOnBranch);
        }

        let write = FileWrite::new(path, branch_list.as_str(), message);
        self.put(fork, branch, write, precondition)
            .await
            .map(ContributorUpdate::Appended)
    }
}

fn is_rejection(e: &ForgeError) -> bool {
    match e {
        ForgeError::Conflict(_) => true,
        ForgeError::ApiError { status, .. } => *status == 409 || *status == 422,
        _ => false,
    }
}
