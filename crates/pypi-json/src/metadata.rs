//! Project metadata as returned by the PyPI JSON API.

use crate::error::{PypiJsonError, Result};
use crate::name::canonicalize_name;
use crate::types::{Artifact, FileUrl, ProjectInfo, Vulnerability};
use itertools::Itertools;
use pep440_rs::Version;
use pep508_rs::Requirement;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Top-level keys every metadata document must carry.
const REQUIRED_KEYS: [&str; 3] = ["info", "last_serial", "urls"];

/// A project's metadata from the PyPI JSON API.
///
/// Built once from a decoded JSON document and never mutated afterwards.
/// `name()` and `version()` are derived from `info` on every call.
///
/// `releases` is only present for project-wide queries
/// (`/pypi/{project}/json`). Version-pinned responses
/// (`/pypi/{project}/{version}/json`) omit it, and every query that needs it
/// returns [`PypiJsonError::NoReleases`] instead of an empty result.
///
/// Build values with [`ProjectMetadata::from_value`], [`ProjectMetadata::from_slice`]
/// or [`parse_metadata`]. Whether the document answered a version-pinned query
/// is not part of the JSON, so it is lost on `Serialize` and the derived
/// `Deserialize` always treats the document as project-wide. Re-parse a
/// serialized pinned document with `from_value(.., true)` to keep the
/// `NoReleases` hint.
///
/// # Examples
///
/// ```
/// use pypi_json::parse_metadata;
/// use pep440_rs::Version;
/// use serde_json::json;
/// use std::str::FromStr;
///
/// let metadata = parse_metadata(json!({
///     "info": {"name": "Octo-Cheese", "version": "0.3.0"},
///     "last_serial": 1,
///     "releases": {"0.1.0": [], "0.3.0": []},
///     "urls": []
/// })).unwrap();
///
/// assert_eq!(metadata.name(), "octo-cheese");
/// assert_eq!(metadata.latest_version().unwrap(), Version::from_str("0.3.0").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Generic information about a specific version of the project
    pub info: ProjectInfo,
    /// Monotonically increasing serial that changes on every project update
    pub last_serial: u64,
    /// Version string to the artifacts of that version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub releases: Option<BTreeMap<String, Vec<Artifact>>>,
    /// Artifacts of the version described by `info`
    pub urls: Vec<Artifact>,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
    #[serde(skip)]
    versioned: bool,
}

/// Parse a project-wide metadata document.
///
/// Shorthand for [`ProjectMetadata::from_value`] with `versioned = false`.
pub fn parse_metadata(document: Value) -> Result<ProjectMetadata> {
    ProjectMetadata::from_value(document, false)
}

impl ProjectMetadata {
    /// Builds metadata from a decoded JSON document.
    ///
    /// `versioned` records whether the document answered a version-pinned
    /// query; it only changes how a missing `releases` map is reported.
    ///
    /// # Errors
    ///
    /// Returns [`PypiJsonError::Schema`] if the document is not an object,
    /// lacks `info`, `last_serial` or `urls`, or has a field of the wrong shape.
    /// Unknown keys are ignored.
    pub fn from_value(document: Value, versioned: bool) -> Result<Self> {
        let object = document
            .as_object()
            .ok_or_else(|| PypiJsonError::schema("expected a JSON object at the top level"))?;

        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !object.contains_key(**key)) {
            return Err(PypiJsonError::schema(format!(
                "missing required key '{}'",
                missing
            )));
        }

        let mut metadata: Self =
            serde_json::from_value(document).map_err(|e| PypiJsonError::schema(e.to_string()))?;
        metadata.versioned = versioned;

        Ok(metadata)
    }

    /// Builds metadata from an undecoded response body.
    pub fn from_slice(body: &[u8], versioned: bool) -> Result<Self> {
        let document: Value = serde_json::from_slice(body)
            .map_err(|e| PypiJsonError::schema(format!("invalid JSON: {}", e)))?;

        Self::from_value(document, versioned)
    }

    /// Returns the canonicalized project name.
    pub fn name(&self) -> String {
        canonicalize_name(&self.info.name)
    }

    /// Returns the release version described by `info`.
    pub fn version(&self) -> Result<Version> {
        parse_version(&self.info.version)
    }

    /// Whether this document answered a version-pinned query.
    pub fn is_versioned(&self) -> bool {
        self.versioned
    }

    /// Whether the version described by `info` has been yanked.
    pub fn is_yanked(&self) -> bool {
        self.info.yanked
    }

    /// Returns the latest version among all releases.
    ///
    /// Versions are ordered by PEP 440 precedence, so `1.10` beats `1.9` and
    /// `1.0rc1 < 1.0 < 1.0.post1`.
    ///
    /// # Errors
    ///
    /// - [`PypiJsonError::NoReleases`] when `releases` is absent or empty
    /// - [`PypiJsonError::VersionParse`] when a release key is not PEP 440
    pub fn latest_version(&self) -> Result<Version> {
        let releases = self.release_map()?;

        releases
            .keys()
            .map(|key| parse_version(key))
            .process_results(|versions| versions.max())?
            .ok_or(PypiJsonError::NoReleases {
                versioned: self.versioned,
            })
    }

    /// Maps every release version to its download URLs and sha256 digests.
    ///
    /// # Errors
    ///
    /// Returns [`PypiJsonError::NoReleases`] when `releases` is absent or empty.
    pub fn releases_with_digests(&self) -> Result<BTreeMap<String, Vec<FileUrl>>> {
        let releases = self.release_map()?;

        Ok(releases
            .iter()
            .map(|(version, artifacts)| {
                let files = artifacts
                    .iter()
                    .map(|artifact| {
                        let digest = artifact.sha256().map(str::to_owned);
                        if digest.is_none() {
                            tracing::warn!("no sha256 digest for {}", artifact.filename);
                        }
                        FileUrl {
                            url: artifact.url.clone(),
                            digest,
                        }
                    })
                    .collect();
                (version.clone(), files)
            })
            .collect())
    }

    /// Maps every release version to its download URLs.
    ///
    /// # Errors
    ///
    /// Returns [`PypiJsonError::NoReleases`] when `releases` is absent or empty.
    pub fn releases(&self) -> Result<BTreeMap<String, Vec<String>>> {
        Ok(self
            .releases_with_digests()?
            .into_iter()
            .map(|(version, files)| (version, files.into_iter().map(|file| file.url).collect()))
            .collect())
    }

    /// Returns the artifacts published for `version`.
    ///
    /// The version described by `info` is served from `urls`, so it works for
    /// version-pinned documents too. Any other version is looked up in
    /// `releases`, first by exact key and then by PEP 440 equality
    /// (`1.0` matches a `1.0.0` key).
    ///
    /// # Errors
    ///
    /// - [`PypiJsonError::NoReleases`] when another version is requested and
    ///   the document has no `releases` map
    /// - [`PypiJsonError::VersionNotFound`] when `releases` has no such version
    pub fn artifacts(&self, version: &str) -> Result<&[Artifact]> {
        if versions_equal(version, &self.info.version) {
            return Ok(&self.urls);
        }

        let releases = self.releases.as_ref().ok_or(PypiJsonError::NoReleases {
            versioned: self.versioned,
        })?;

        if let Some(artifacts) = releases.get(version) {
            return Ok(artifacts);
        }

        releases
            .iter()
            .find(|(key, _)| versions_equal(key, version))
            .map(|(_, artifacts)| artifacts.as_slice())
            .ok_or_else(|| PypiJsonError::version_not_found(version))
    }

    /// Parses `info.requires_dist` into PEP 508 requirements.
    ///
    /// # Errors
    ///
    /// Returns [`PypiJsonError::InvalidRequirement`] for the first entry that
    /// does not parse.
    pub fn requirements(&self) -> Result<Vec<Requirement>> {
        self.info
            .requires_dist
            .iter()
            .flatten()
            .map(|entry| {
                Requirement::from_str(entry).map_err(|e| PypiJsonError::InvalidRequirement {
                    requirement: entry.clone(),
                    source: Box::new(e),
                })
            })
            .collect()
    }

    fn release_map(&self) -> Result<&BTreeMap<String, Vec<Artifact>>> {
        self.releases
            .as_ref()
            .filter(|releases| !releases.is_empty())
            .ok_or(PypiJsonError::NoReleases {
                versioned: self.versioned,
            })
    }
}

/// Parse a PEP 440 version, keeping the input in the error.
pub(crate) fn parse_version(version: &str) -> Result<Version> {
    Version::from_str(version).map_err(|e| PypiJsonError::version_parse(version, e))
}

/// String equality, falling back to PEP 440 equality when both sides parse.
pub(crate) fn versions_equal(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (Version::from_str(a), Version::from_str(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artifact(filename: &str, sha256: &str) -> Value {
        let packagetype = if filename.ends_with(".whl") {
            "bdist_wheel"
        } else {
            "sdist"
        };
        json!({
            "filename": filename,
            "url": format!("https://files.example.org/{}", filename),
            "digests": {"sha256": sha256, "md5": "ignored"},
            "packagetype": packagetype,
        })
    }

    fn octo_cheese() -> ProjectMetadata {
        parse_metadata(json!({
            "info": {"name": "Octo-Cheese", "version": "0.3.0"},
            "last_serial": 1,
            "releases": {
                "0.0.2": [artifact("octocheese-0.0.2.tar.gz", "aa"), artifact("octocheese-0.0.2-py3-none-any.whl", "bb")],
                "0.1.0": [artifact("octocheese-0.1.0.tar.gz", "cc")],
                "0.3.0": [artifact("octocheese-0.3.0.tar.gz", "dd")]
            },
            "urls": [artifact("octocheese-0.3.0.tar.gz", "dd")]
        }))
        .unwrap()
    }

    #[test]
    fn test_name_and_version() {
        let metadata = octo_cheese();
        assert_eq!(metadata.name(), "octo-cheese");
        assert_eq!(metadata.version().unwrap(), Version::from_str("0.3.0").unwrap());
        assert!(!metadata.is_versioned());
        assert!(!metadata.is_yanked());
    }

    #[test]
    fn test_latest_version() {
        let metadata = octo_cheese();
        assert_eq!(
            metadata.latest_version().unwrap(),
            Version::from_str("0.3.0").unwrap()
        );
    }

    #[test]
    fn test_latest_version_uses_version_precedence() {
        let metadata = parse_metadata(json!({
            "info": {"name": "pkg", "version": "1.9"},
            "last_serial": 7,
            "releases": {
                "1.9": [],
                "1.10.0rc1": [],
                "1.10": [],
                "1.10.post1": [],
                "1.2": []
            },
            "urls": []
        }))
        .unwrap();

        assert_eq!(
            metadata.latest_version().unwrap(),
            Version::from_str("1.10.post1").unwrap()
        );
    }

    #[test]
    fn test_latest_version_prefers_release_over_prerelease() {
        let metadata = parse_metadata(json!({
            "info": {"name": "pkg", "version": "2.0"},
            "last_serial": 7,
            "releases": {"2.0rc2": [], "2.0": [], "2.0b1": [], "1.99": []},
            "urls": []
        }))
        .unwrap();

        assert_eq!(
            metadata.latest_version().unwrap(),
            Version::from_str("2.0").unwrap()
        );
    }

    #[test]
    fn test_latest_version_without_releases() {
        let metadata = ProjectMetadata::from_value(
            json!({
                "info": {"name": "OctoCheese", "version": "0.1.0"},
                "last_serial": 1,
                "urls": []
            }),
            true,
        )
        .unwrap();

        assert!(metadata.releases.is_none());
        let err = metadata.latest_version().unwrap_err();
        assert!(matches!(err, PypiJsonError::NoReleases { versioned: true }));
        assert!(err.to_string().contains("'releases' key is no longer included"));

        assert!(matches!(
            metadata.releases_with_digests(),
            Err(PypiJsonError::NoReleases { .. })
        ));
        assert!(matches!(
            metadata.releases(),
            Err(PypiJsonError::NoReleases { .. })
        ));
    }

    #[test]
    fn test_pinned_flag_survives_reparse_only() {
        let pinned = ProjectMetadata::from_value(
            json!({
                "info": {"name": "OctoCheese", "version": "0.1.0"},
                "last_serial": 1,
                "urls": []
            }),
            true,
        )
        .unwrap();
        let serialized = serde_json::to_value(&pinned).unwrap();
        assert!(serialized.get("versioned").is_none());

        let derived: ProjectMetadata = serde_json::from_value(serialized.clone()).unwrap();
        assert!(!derived.is_versioned());
        assert!(matches!(
            derived.releases(),
            Err(PypiJsonError::NoReleases { versioned: false })
        ));

        let reparsed = ProjectMetadata::from_value(serialized, pinned.is_versioned()).unwrap();
        assert_eq!(reparsed, pinned);
        assert!(matches!(
            reparsed.releases(),
            Err(PypiJsonError::NoReleases { versioned: true })
        ));
    }

    #[test]
    fn test_latest_version_empty_releases() {
        let metadata = parse_metadata(json!({
            "info": {"name": "pkg", "version": "1.0"},
            "last_serial": 1,
            "releases": {},
            "urls": []
        }))
        .unwrap();

        assert!(matches!(
            metadata.latest_version(),
            Err(PypiJsonError::NoReleases { versioned: false })
        ));
    }

    #[test]
    fn test_latest_version_invalid_key() {
        let metadata = parse_metadata(json!({
            "info": {"name": "pkg", "version": "1.0"},
            "last_serial": 1,
            "releases": {"1.0": [], "not a version": []},
            "urls": []
        }))
        .unwrap();

        match metadata.latest_version() {
            Err(PypiJsonError::VersionParse { version, .. }) => assert_eq!(version, "not a version"),
            other => panic!("Expected VersionParse, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_info_version() {
        let metadata = parse_metadata(json!({
            "info": {"name": "pkg", "version": "one.two"},
            "last_serial": 1,
            "urls": []
        }))
        .unwrap();

        assert!(matches!(
            metadata.version(),
            Err(PypiJsonError::VersionParse { .. })
        ));
    }

    #[test]
    fn test_releases_with_digests() {
        let metadata = octo_cheese();
        let releases = metadata.releases_with_digests().unwrap();

        let files = &releases["0.0.2"];
        assert_eq!(files.len(), 2);
        assert_eq!(
            files[0],
            FileUrl {
                url: "https://files.example.org/octocheese-0.0.2.tar.gz".into(),
                digest: Some("aa".into()),
            }
        );
        assert_eq!(files[1].digest.as_deref(), Some("bb"));
    }

    #[test]
    fn test_releases_matches_releases_with_digests() {
        let metadata = octo_cheese();
        let with_digests = metadata.releases_with_digests().unwrap();
        let plain = metadata.releases().unwrap();

        assert!(with_digests.keys().eq(plain.keys()));
        for (version, files) in &with_digests {
            let urls: Vec<&str> = files.iter().map(|f| f.url.as_str()).collect();
            assert_eq!(urls, plain[version]);
        }
    }

    #[test]
    fn test_missing_digest_is_none() {
        let metadata = parse_metadata(json!({
            "info": {"name": "pkg", "version": "1.0"},
            "last_serial": 1,
            "releases": {"1.0": [{"filename": "pkg-1.0.zip", "url": "https://x/pkg-1.0.zip", "digests": {"md5": "00"}}]},
            "urls": []
        }))
        .unwrap();

        let releases = metadata.releases_with_digests().unwrap();
        assert_eq!(releases["1.0"][0].digest, None);
    }

    #[test]
    fn test_schema_missing_keys() {
        for key in REQUIRED_KEYS {
            let mut document = json!({
                "info": {"name": "pkg", "version": "1.0"},
                "last_serial": 1,
                "urls": []
            });
            document.as_object_mut().unwrap().remove(key);

            match parse_metadata(document) {
                Err(PypiJsonError::Schema { message }) => assert!(message.contains(key)),
                other => panic!("Expected Schema error for {}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_schema_not_an_object() {
        assert!(matches!(
            parse_metadata(json!([1, 2, 3])),
            Err(PypiJsonError::Schema { .. })
        ));
    }

    #[test]
    fn test_schema_wrong_shape() {
        let result = parse_metadata(json!({
            "info": {"name": "pkg", "version": "1.0"},
            "last_serial": "not a number",
            "urls": []
        }));
        assert!(matches!(result, Err(PypiJsonError::Schema { .. })));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let metadata = parse_metadata(json!({
            "info": {"name": "pkg", "version": "1.0", "dynamic": null},
            "last_serial": 1,
            "urls": [],
            "ownership": {"roles": []}
        }))
        .unwrap();

        assert_eq!(metadata.name(), "pkg");
        assert!(metadata.vulnerabilities.is_empty());
    }

    #[test]
    fn test_from_slice_invalid_json() {
        let result = ProjectMetadata::from_slice(b"{not json", false);
        match result {
            Err(PypiJsonError::Schema { message }) => assert!(message.starts_with("invalid JSON")),
            other => panic!("Expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_artifacts_lookup() {
        let metadata = octo_cheese();

        // Current version comes from `urls`
        assert_eq!(metadata.artifacts("0.3.0").unwrap().len(), 1);
        // PEP 440 equality
        assert_eq!(metadata.artifacts("0.3").unwrap().len(), 1);
        assert_eq!(metadata.artifacts("0.0.2").unwrap().len(), 2);
        assert_eq!(metadata.artifacts("0.1").unwrap().len(), 1);

        match metadata.artifacts("1.2.3") {
            Err(PypiJsonError::VersionNotFound { version }) => assert_eq!(version, "1.2.3"),
            other => panic!("Expected VersionNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_artifacts_versioned_document() {
        let metadata = ProjectMetadata::from_value(
            json!({
                "info": {"name": "OctoCheese", "version": "0.1.0"},
                "last_serial": 1,
                "urls": [artifact("octocheese-0.1.0.tar.gz", "cc")]
            }),
            true,
        )
        .unwrap();

        assert_eq!(metadata.artifacts("0.1.0").unwrap().len(), 1);
        assert!(matches!(
            metadata.artifacts("0.3.0"),
            Err(PypiJsonError::NoReleases { versioned: true })
        ));
    }

    #[test]
    fn test_requirements() {
        let metadata = parse_metadata(json!({
            "info": {
                "name": "pkg",
                "version": "1.0",
                "requires_dist": ["requests>=2.28.0,<3.0", "colorama; sys_platform == 'win32'"]
            },
            "last_serial": 1,
            "urls": []
        }))
        .unwrap();

        let requirements = metadata.requirements().unwrap();
        assert_eq!(requirements.len(), 2);
        assert_eq!(requirements[0].name.to_string(), "requests");
        assert_eq!(requirements[1].name.to_string(), "colorama");
    }

    #[test]
    fn test_requirements_invalid() {
        let metadata = parse_metadata(json!({
            "info": {"name": "pkg", "version": "1.0", "requires_dist": ["requests >>> 2"]},
            "last_serial": 1,
            "urls": []
        }))
        .unwrap();

        match metadata.requirements() {
            Err(PypiJsonError::InvalidRequirement { requirement, .. }) => {
                assert_eq!(requirement, "requests >>> 2");
            }
            other => panic!("Expected InvalidRequirement, got {:?}", other),
        }
    }

    #[test]
    fn test_requirements_absent() {
        let metadata = octo_cheese();
        assert!(metadata.requirements().unwrap().is_empty());
    }

    #[test]
    fn test_versions_equal() {
        assert!(versions_equal("1.0", "1.0"));
        assert!(versions_equal("1.0", "1.0.0"));
        assert!(!versions_equal("1.0", "1.0.1"));
        assert!(!versions_equal("legacy", "other"));
    }
}
