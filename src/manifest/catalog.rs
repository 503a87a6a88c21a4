//! manifest::catalog
//!
//! Catalog entry document and the names and text derived from a manifest.
//!
//! # Naming
//!
//! - Integration branch: `{id}-{version}-{packageVersion}`
//! - Entry path: `{mods_dir}/{packageVersion}/{id}-{version}.json`
//!
//! where a missing package version is written as `global`.

use serde::{Deserialize, Serialize};

use super::{ManifestError, ModManifest};
use crate::core::types::BranchName;

/// Everything about a release that does not come from the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseLinks {
    /// Where the package can be downloaded
    pub download: String,
    /// Source repository URL
    pub source: Option<String>,
    pub funding: Option<String>,
    pub website: Option<String>,
    /// Avatar of the source repository owner
    pub author_icon: Option<String>,
    /// SHA-256 hex digest of the package
    pub hash: Option<String>,
}

/// The JSON document written to the catalog for one mod release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    pub description: String,
    pub id: String,
    pub version: String,
    pub author: String,
    pub author_icon: String,
    pub loader: String,
    pub download: String,
    pub source: String,
    pub cover: String,
    pub funding: String,
    pub website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl CatalogEntry {
    /// Build the entry for a manifest. Absent optional values become empty strings.
    pub fn new(manifest: &ModManifest, links: &ReleaseLinks) -> Self {
        let or_empty = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            name: manifest.name.clone(),
            description: or_empty(&manifest.description),
            id: manifest.id.clone(),
            version: manifest.version.clone(),
            author: manifest.display_author(),
            author_icon: or_empty(&links.author_icon),
            loader: or_empty(&manifest.loader),
            download: links.download.clone(),
            source: or_empty(&links.source),
            cover: or_empty(&manifest.cover),
            funding: or_empty(&links.funding),
            website: or_empty(&links.website),
            hash: links.hash.clone(),
        }
    }

    /// Pretty JSON with a trailing newline, as committed.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| ManifestError::Invalid(format!("cannot serialize entry: {}", e)))
    }
}

/// Integration branch for a release.
pub fn branch_name(manifest: &ModManifest) -> Result<BranchName, ManifestError> {
    let raw = format!(
        "{}-{}-{}",
        manifest.id,
        manifest.version,
        manifest.package_version_or_global()
    );
    BranchName::new(raw).map_err(|e| ManifestError::Invalid(e.to_string()))
}

/// Repository path of the catalog entry.
pub fn entry_path(manifest: &ModManifest, mods_dir: &str) -> String {
    format!(
        "{}/{}/{}-{}.json",
        mods_dir.trim_end_matches('/'),
        manifest.package_version_or_global(),
        manifest.id,
        manifest.version
    )
}

/// `{name} v{version}`, used for the commit subject and the PR title.
pub fn title(manifest: &ModManifest) -> String {
    format!("{} v{}", manifest.name, manifest.version)
}

fn summary_block(manifest: &ModManifest) -> String {
    let rows = [
        ("ID", manifest.id.clone()),
        ("Author", manifest.display_author()),
        ("Loader", manifest.loader.clone().unwrap_or_default()),
        ("Game Version", manifest.package_version_or_global().to_string()),
    ];
    rows.iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

fn description(manifest: &ModManifest) -> Option<&str> {
    manifest
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
}

/// Commit message: title, blank line, key/value block, then the
/// description between `---` rules when there is one.
pub fn commit_message(manifest: &ModManifest) -> String {
    let mut message = format!("{}\n\n{}", title(manifest), summary_block(manifest));
    if let Some(desc) = description(manifest) {
        message.push_str(&format!("\n\n---\n{}\n---", desc));
    }
    message
}

/// Pull request body: key/value summary then the description.
pub fn pr_body(manifest: &ModManifest) -> String {
    let mut body = summary_block(manifest);
    if let Some(desc) = description(manifest) {
        body.push_str("\n\n");
        body.push_str(desc);
    }
    body
}

/// Comment posted on an already-open pull request.
pub fn update_comment(manifest: &ModManifest) -> String {
    format!(
        "Updated manifest to {} v{}.\n\n{}",
        manifest.name,
        manifest.version,
        summary_block(manifest)
    )
}

/// Commit message for adding a contributor to the contributor list.
pub fn contributor_message(contributor: &str) -> String {
    format!("Add {} to contributor list", contributor)
}
