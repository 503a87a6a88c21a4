//! manifest
//!
//! Mod manifests and the catalog documents derived from them.
//!
//! # Components
//!
//! - [`ModManifest`] - The manifest file shipped inside a mod package
//! - [`ManifestSource`] - Where a manifest comes from; [`DirectorySource`]
//!   searches an unpacked package directory
//! - [`catalog`] - Catalog entry document, branch and path naming, commit
//!   message and pull request text
//!
//! A package without a manifest is not an error at this layer:
//! [`ManifestSource::load`] returns `Ok(None)` and the caller decides.

pub mod catalog;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How deep [`DirectorySource`] descends looking for the manifest.
const MAX_SEARCH_DEPTH: usize = 3;

/// Errors from reading or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manifest '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid manifest: {0}")]
    Invalid(String),
}

/// The manifest file inside a mod package.
///
/// ```json
/// {
///   "name": "Example Mod",
///   "id": "com.example.mod",
///   "version": "1.0.0",
///   "author": "Alice",
///   "loader": "fabric",
///   "packageVersion": "1.29.1"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModManifest {
    pub name: String,
    pub id: String,
    pub version: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub loader: Option<String>,
    /// Who ported the mod, credited ahead of the author.
    #[serde(default)]
    pub porter: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub package_id: Option<String>,
    /// Game version the package targets. `None` means any.
    #[serde(default)]
    pub package_version: Option<String>,
}

impl ModManifest {
    /// Parse and validate manifest JSON.
    pub fn from_json(text: &str, origin: &Path) -> Result<Self, ManifestError> {
        let manifest: ModManifest =
            serde_json::from_str(text).map_err(|e| ManifestError::Parse {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check the fields that end up in branch names and file paths.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.name.trim().is_empty() {
            return Err(ManifestError::Invalid("'name' is empty".into()));
        }
        if self.author.trim().is_empty() {
            return Err(ManifestError::Invalid("'author' is empty".into()));
        }

        let mut segments = vec![("id", self.id.as_str()), ("version", self.version.as_str())];
        if let Some(pv) = &self.package_version {
            segments.push(("packageVersion", pv.as_str()));
        }
        for (field, value) in segments {
            if value.is_empty()
                || value.contains('/')
                || value.contains('\\')
                || value.contains("..")
                || value.chars().any(|c| c.is_whitespace() || c.is_control())
            {
                return Err(ManifestError::Invalid(format!(
                    "'{}' must be a single path segment, got '{}'",
                    field, value
                )));
            }
        }
        Ok(())
    }

    /// Author credit, with the porter first when present.
    pub fn display_author(&self) -> String {
        match self.porter.as_deref().map(str::trim) {
            Some(porter) if !porter.is_empty() => format!("{}, {}", porter, self.author),
            _ => self.author.clone(),
        }
    }

    /// Package version, or `"global"` for version-independent mods.
    pub fn package_version_or_global(&self) -> &str {
        self.package_version
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or("global")
    }
}

/// Somewhere a manifest can be loaded from.
pub trait ManifestSource {
    /// Load the manifest, `Ok(None)` if the package carries none.
    fn load(&self) -> Result<Option<ModManifest>, ManifestError>;

    /// Human-readable location for messages.
    fn describe(&self) -> String;
}

/// Finds the manifest inside an unpacked package directory.
///
/// The shallowest match wins; siblings are visited in name order.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    manifest_name: String,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, manifest_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            manifest_name: manifest_name.into(),
        }
    }

    /// Locate the manifest file without parsing it.
    pub fn find(&self) -> Result<Option<PathBuf>, ManifestError> {
        let meta = fs::metadata(&self.root).map_err(|e| ManifestError::Read {
            path: self.root.clone(),
            source: e,
        })?;
        if meta.is_file() {
            return Ok(Some(self.root.clone()));
        }

        let mut level = vec![self.root.clone()];
        for _ in 0..=MAX_SEARCH_DEPTH {
            let mut next = Vec::new();
            for dir in &level {
                let mut entries = read_dir_sorted(dir)?;
                if let Some(hit) = entries.iter().find(|p| {
                    p.is_file() && p.file_name().is_some_and(|n| n == self.manifest_name.as_str())
                }) {
                    return Ok(Some(hit.clone()));
                }
                entries.retain(|p| p.is_dir());
                next.extend(entries);
            }
            if next.is_empty() {
                break;
            }
            level = next;
        }
        Ok(None)
    }
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, ManifestError> {
    let read_err = |e| ManifestError::Read {
        path: dir.to_path_buf(),
        source: e,
    };
    let mut paths = fs::read_dir(dir)
        .map_err(read_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)?;
    paths.sort();
    Ok(paths)
}

impl ManifestSource for DirectorySource {
    fn load(&self) -> Result<Option<ModManifest>, ManifestError> {
        let Some(path) = self.find()? else {
            return Ok(None);
        };
        let text = fs::read_to_string(&path).map_err(|e| ManifestError::Read {
            path: path.clone(),
            source: e,
        })?;
        ModManifest::from_json(&text, &path).map(Some)
    }

    fn describe(&self) -> String {
        format!("{} in {}", self.manifest_name, self.root.display())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) fn example() -> ModManifest {
        ModManifest {
            name: "Example Mod".into(),
            id: "com.example.mod".into(),
            version: "1.0.0".into(),
            author: "Alice".into(),
            description: Some("Does example things.".into()),
            loader: Some("fabric".into()),
            porter: None,
            cover: None,
            package_id: None,
            package_version: Some("1.29.1".into()),
        }
    }

    const MANIFEST_JSON: &str = r#"{
        "name": "Example Mod",
        "id": "com.example.mod",
        "version": "1.0.0",
        "author": "Alice",
        "loader": "fabric",
        "porter": "Bob",
        "packageId": "example-pkg",
        "packageVersion": "1.29.1"
    }"#;

    #[test]
    fn parses_camel_case_fields() {
        let m = ModManifest::from_json(MANIFEST_JSON, Path::new("mod.json")).unwrap();
        assert_eq!(m.package_id.as_deref(), Some("example-pkg"));
        assert_eq!(m.package_version.as_deref(), Some("1.29.1"));
        assert_eq!(m.porter.as_deref(), Some("Bob"));
        assert!(m.description.is_none());
    }

    #[test]
    fn porter_prefixes_author() {
        let mut m = example();
        assert_eq!(m.display_author(), "Alice");
        m.porter = Some("Bob".into());
        assert_eq!(m.display_author(), "Bob, Alice");
        m.porter = Some("  ".into());
        assert_eq!(m.display_author(), "Alice");
    }

    #[test]
    fn missing_package_version_is_global() {
        let mut m = example();
        assert_eq!(m.package_version_or_global(), "1.29.1");
        m.package_version = None;
        assert_eq!(m.package_version_or_global(), "global");
    }

    #[test]
    fn rejects_path_like_ids() {
        let mut m = example();
        m.id = "../escape".into();
        assert!(matches!(m.validate(), Err(ManifestError::Invalid(_))));

        let mut m = example();
        m.version = "1.0 beta".into();
        assert!(m.validate().is_err());
    }

    #[test]
    fn parse_error_names_file() {
        let err = ModManifest::from_json("{", Path::new("pkg/mod.json")).unwrap_err();
        assert!(err.to_string().contains("pkg/mod.json"));
    }

    #[test]
    fn directory_source_finds_nested_manifest() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("example-mod");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("mod.json"), MANIFEST_JSON).unwrap();
        fs::write(temp.path().join("readme.txt"), "hi").unwrap();

        let source = DirectorySource::new(temp.path(), "mod.json");
        let manifest = source.load().unwrap().unwrap();
        assert_eq!(manifest.id, "com.example.mod");
    }

    #[test]
    fn directory_source_prefers_shallowest() {
        let temp = TempDir::new().unwrap();
        let deep = temp.path().join("a");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("mod.json"), "not json").unwrap();
        fs::write(temp.path().join("mod.json"), MANIFEST_JSON).unwrap();

        let source = DirectorySource::new(temp.path(), "mod.json");
        assert_eq!(source.find().unwrap(), Some(temp.path().join("mod.json")));
        assert!(source.load().unwrap().is_some());
    }

    #[test]
    fn directory_without_manifest_is_none() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("other.json"), "{}").unwrap();

        let source = DirectorySource::new(temp.path(), "mod.json");
        assert!(source.load().unwrap().is_none());
        assert!(source.describe().contains("mod.json"));
    }

    #[test]
    fn root_may_be_the_manifest_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("custom.json");
        fs::write(&file, MANIFEST_JSON).unwrap();

        let source = DirectorySource::new(&file, "mod.json");
        assert!(source.load().unwrap().is_some());
    }

    #[test]
    fn missing_root_is_read_error() {
        let temp = TempDir::new().unwrap();
        let source = DirectorySource::new(temp.path().join("absent"), "mod.json");
        assert!(matches!(source.load(), Err(ManifestError::Read { .. })));
    }
}
