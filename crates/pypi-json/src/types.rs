use crate::wheel::is_wheel_filename;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Generic information about a specific version of a project.
///
/// This is the `info` object of a PyPI JSON API response. Apart from `name`
/// and `version`, every field is optional on the wire and passed through
/// untouched.
///
/// # Examples
///
/// ```
/// use pypi_json::types::ProjectInfo;
///
/// let info: ProjectInfo = serde_json::from_str(
///     r#"{"name": "OctoCheese", "version": "0.3.0", "summary": "Cheesy"}"#,
/// ).unwrap();
///
/// assert_eq!(info.name, "OctoCheese");
/// assert_eq!(info.summary.as_deref(), Some("Cheesy"));
/// assert!(!info.yanked);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Raw (non-normalized) project name
    pub name: String,
    /// Version string, expected to follow PEP 440
    pub version: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_content_type: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub maintainer: Option<String>,
    #[serde(default)]
    pub maintainer_email: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    /// Trove classifiers
    #[serde(default)]
    pub classifiers: Vec<String>,
    #[serde(default)]
    pub home_page: Option<String>,
    #[serde(default)]
    pub docs_url: Option<String>,
    #[serde(default)]
    pub bugtrack_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub package_url: Option<String>,
    #[serde(default)]
    pub project_url: Option<String>,
    #[serde(default)]
    pub release_url: Option<String>,
    /// Additional URLs (homepage, repository, documentation, etc.)
    #[serde(default)]
    pub project_urls: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub platform: Option<String>,
    /// PEP 508 dependency specifications
    #[serde(default)]
    pub requires_dist: Option<Vec<String>>,
    #[serde(default)]
    pub requires_python: Option<String>,
    /// PEP 592 yank flag
    #[serde(default)]
    pub yanked: bool,
    #[serde(default)]
    pub yanked_reason: Option<String>,
}

/// Distribution package type of an [`Artifact`].
///
/// Values the index does not know about yet deserialize as
/// [`PackageType::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum PackageType {
    BdistWheel,
    Sdist,
    BdistWininst,
    BdistEgg,
    BdistMsi,
    BdistDumb,
    BdistRpm,
    BdistDmg,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One distribution file of a release.
///
/// Retrieved from the `urls` list or from a `releases` entry of the JSON API.
///
/// # Examples
///
/// ```
/// use pypi_json::types::{Artifact, PackageType};
///
/// let artifact: Artifact = serde_json::from_str(r#"{
///     "filename": "octocheese-0.3.0-py3-none-any.whl",
///     "url": "https://files.pythonhosted.org/packages/octocheese-0.3.0-py3-none-any.whl",
///     "packagetype": "bdist_wheel",
///     "digests": {"sha256": "abc123"}
/// }"#).unwrap();
///
/// assert!(artifact.is_wheel());
/// assert_eq!(artifact.packagetype, PackageType::BdistWheel);
/// assert_eq!(artifact.sha256(), Some("abc123"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Basename of the file, including extension
    pub filename: String,
    /// Download URL
    pub url: String,
    /// File size in bytes
    #[serde(default)]
    pub size: u64,
    /// Checksum name (`md5`, `sha256`, `blake2b_256`, ...) to hex digest
    #[serde(default)]
    pub digests: BTreeMap<String, String>,
    #[serde(default)]
    pub packagetype: PackageType,
    /// Either `source` or a PEP 425 python tag
    #[serde(default)]
    pub python_version: Option<String>,
    #[serde(default)]
    pub requires_python: Option<String>,
    /// Whether a detached PGP signature accompanies the file
    #[serde(default)]
    pub has_sig: bool,
    #[serde(default)]
    pub comment_text: Option<String>,
    #[serde(default)]
    pub yanked: bool,
    #[serde(default)]
    pub yanked_reason: Option<String>,
    /// Upload time, `%Y-%m-%dT%H:%M:%S` without timezone
    #[serde(default)]
    pub upload_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub upload_time_iso_8601: Option<DateTime<Utc>>,
}

impl Artifact {
    /// Returns the sha256 digest of the file, if the index published one.
    pub fn sha256(&self) -> Option<&str> {
        self.digests.get("sha256").map(String::as_str)
    }

    /// Returns `true` if the filename carries the wheel extension.
    pub fn is_wheel(&self) -> bool {
        is_wheel_filename(&self.filename)
    }
}

/// A vulnerability affecting the project, as reported by OSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Identifier, e.g. `PYSEC-001`
    pub id: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    /// Versions the vulnerability was fixed in, e.g. `["3.3.2"]`
    #[serde(default)]
    pub fixed_in: Vec<String>,
    #[serde(default)]
    pub withdrawn: Option<String>,
}

/// Download URL paired with the sha256 digest of the file.
///
/// Produced by
/// [`ProjectMetadata::releases_with_digests`](crate::ProjectMetadata::releases_with_digests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUrl {
    pub url: String,
    pub digest: Option<String>,
}
