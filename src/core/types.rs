//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`RepoId`] - Hosted repository coordinate (`owner/name`)
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use modpublish::core::types::{BranchName, RepoId};
//!
//! let branch = BranchName::new("com.example.mod-1.0.0-1.29.1").unwrap();
//! let repo: RepoId = "catalog-org/catalog".parse().unwrap();
//! assert_eq!(repo.owner(), "catalog-org");
//!
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!("no-slash".parse::<RepoId>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid repository '{0}', expected owner/name")]
    InvalidRepo(String),
}

/// A validated Git branch name.
///
/// Branch names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
/// - Cannot be exactly `@`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let fail = |reason: &str| Err(TypeError::InvalidBranchName(reason.to_string()));

        if name.is_empty() {
            return fail("branch name cannot be empty");
        }
        if name == "@" {
            return fail("branch name cannot be '@' (reserved)");
        }
        if name.starts_with('.') || name.starts_with('-') {
            return fail("branch name cannot start with '.' or '-'");
        }
        if name.ends_with(".lock") || name.ends_with('/') {
            return fail("branch name cannot end with '.lock' or '/'");
        }
        for bad in ["..", "@{", "//"] {
            if name.contains(bad) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{bad}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(TypeError::InvalidBranchName(format!(
                "branch name cannot contain '{c}'"
            )));
        }
        if name.chars().any(|c| c.is_ascii_control()) {
            return fail("branch name cannot contain control characters");
        }

        for component in name.split('/').filter(|c| !c.is_empty()) {
            if component.starts_with('.') || component.ends_with(".lock") {
                return fail("path component cannot start with '.' or end with '.lock'");
            }
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(value: BranchName) -> Self {
        value.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Coordinate of a hosted repository: owner login plus repository name.
///
/// Hosting services compare these case-insensitively, so equality checks
/// between coordinates coming from different sources should go through
/// [`RepoId::same_as`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    /// Create a repository coordinate.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRepo` if either part is empty or contains `/`.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, TypeError> {
        let owner = owner.into();
        let name = name.into();
        let valid = |s: &str| !s.is_empty() && !s.contains('/') && !s.contains(char::is_whitespace);
        if !valid(&owner) || !valid(&name) {
            return Err(TypeError::InvalidRepo(format!("{owner}/{name}")));
        }
        Ok(Self { owner, name })
    }

    /// Repository owner (user or organization login).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive comparison of two coordinates.
    pub fn same_as(&self, other: &RepoId) -> bool {
        self.owner.eq_ignore_ascii_case(&other.owner) && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl FromStr for RepoId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('/') {
            Some((owner, name)) => {
                Self::new(owner, name).map_err(|_| TypeError::InvalidRepo(s.to_string()))
            }
            None => Err(TypeError::InvalidRepo(s.to_string())),
        }
    }
}

impl TryFrom<String> for RepoId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepoId> for String {
    fn from(value: RepoId) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod branch_name {
        use super::*;

        #[test]
        fn accepts_catalog_style_names() {
            let name = BranchName::new("com.example.mod-1.0.0-1.29.1").unwrap();
            assert_eq!(name.as_str(), "com.example.mod-1.0.0-1.29.1");
            assert_eq!(name.to_string(), "com.example.mod-1.0.0-1.29.1");
        }

        #[test]
        fn rejects_invalid_names() {
            assert!(BranchName::new("").is_err());
            assert!(BranchName::new("@").is_err());
            assert!(BranchName::new(".hidden").is_err());
            assert!(BranchName::new("-dash").is_err());
            assert!(BranchName::new("branch.lock").is_err());
            assert!(BranchName::new("trailing/").is_err());
            assert!(BranchName::new("a..b").is_err());
            assert!(BranchName::new("a//b").is_err());
            assert!(BranchName::new("has space").is_err());
            assert!(BranchName::new("a:b").is_err());
            assert!(BranchName::new("a/.b").is_err());
        }

        #[test]
        fn serde_validates() {
            let ok: BranchName = serde_json::from_str("\"main\"").unwrap();
            assert_eq!(ok.as_str(), "main");
            assert!(serde_json::from_str::<BranchName>("\"a..b\"").is_err());
        }
    }

    mod repo_id {
        use super::*;

        #[test]
        fn parses_owner_and_name() {
            let repo: RepoId = "octocat/hello-world".parse().unwrap();
            assert_eq!(repo.owner(), "octocat");
            assert_eq!(repo.name(), "hello-world");
            assert_eq!(repo.to_string(), "octocat/hello-world");
        }

        #[test]
        fn rejects_malformed() {
            assert!("octocat".parse::<RepoId>().is_err());
            assert!("/name".parse::<RepoId>().is_err());
            assert!("owner/".parse::<RepoId>().is_err());
            assert!("a/b/c".parse::<RepoId>().is_err());
            assert!(RepoId::new("has space", "x").is_err());
        }

        #[test]
        fn same_as_ignores_case() {
            let a = RepoId::new("Octocat", "Hello-World").unwrap();
            let b = RepoId::new("octocat", "hello-world").unwrap();
            assert!(a.same_as(&b));
            assert_ne!(a, b);
        }
    }
}
