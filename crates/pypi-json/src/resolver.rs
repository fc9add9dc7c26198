//! Wheel tag to download URL resolution.
//!
//! Given the artifacts of one release, every wheel is expanded into the
//! compatibility tags it supports and each tag is mapped to that wheel's
//! URL. Everything that is not a wheel (sdists, legacy binary formats) ends
//! up in a separate list, in input order.

use crate::error::{PypiJsonError, Result};
use crate::metadata::ProjectMetadata;
use crate::wheel::{WheelFilename, WheelTag, is_wheel_filename};
use std::collections::HashMap;
use url::Url;

/// Result of [`resolve_wheel_tags`].
///
/// Built fresh on every call; nothing is cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedIndex {
    /// Compatibility tag to the URL of the wheel offering it
    pub tags: HashMap<WheelTag, Url>,
    /// URLs of non-wheel artifacts, in the order they were listed
    pub other_urls: Vec<Url>,
}

impl ResolvedIndex {
    /// Returns the URL for the first tag in `supported` that the index contains.
    ///
    /// `supported` is expected in priority order, most specific tag first, as
    /// an installer would enumerate the tags of the running interpreter.
    ///
    /// # Examples
    ///
    /// ```
    /// use pypi_json::{ResolvedIndex, WheelTag};
    /// use url::Url;
    ///
    /// let mut index = ResolvedIndex::default();
    /// let url = Url::parse("https://files.example.org/pkg-1.0-py3-none-any.whl").unwrap();
    /// index.tags.insert(WheelTag::new("py3", "none", "any"), url.clone());
    ///
    /// let supported = [
    ///     WheelTag::new("cp312", "cp312", "manylinux_2_17_x86_64"),
    ///     WheelTag::new("py3", "none", "any"),
    /// ];
    /// assert_eq!(index.best_match(&supported), Some(&url));
    /// ```
    pub fn best_match<'a>(
        &self,
        supported: impl IntoIterator<Item = &'a WheelTag>,
    ) -> Option<&Url> {
        supported.into_iter().find_map(|tag| self.tags.get(tag))
    }

    /// Tag/URL pairs sorted by tag, for stable output.
    pub fn sorted_tags(&self) -> Vec<(&WheelTag, &Url)> {
        let mut pairs: Vec<_> = self.tags.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs
    }

    /// Returns `true` if the release has no wheels at all.
    pub fn is_source_only(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Build the tag → URL index for `version` (default: the version in `info`).
///
/// When two wheels offer the same tag, the one listed later wins.
///
/// # Errors
///
/// - [`PypiJsonError::VersionNotFound`] when the version is not in `releases`
/// - [`PypiJsonError::NoReleases`] when another version is requested from a
///   version-pinned document
/// - [`PypiJsonError::NoArtifacts`] when the version has no files
/// - [`PypiJsonError::InvalidUrl`] when an artifact URL does not parse
/// - [`PypiJsonError::FilenameParse`] when a `.whl` name is malformed
///
/// # Examples
///
/// ```
/// use pypi_json::{WheelTag, parse_metadata, resolve_wheel_tags};
/// use serde_json::json;
///
/// let metadata = parse_metadata(json!({
///     "info": {"name": "pkg", "version": "1.0.0"},
///     "last_serial": 1,
///     "urls": [
///         {"filename": "pkg-1.0.0-py3-none-any.whl", "url": "https://files.example.org/pkg-1.0.0-py3-none-any.whl"},
///         {"filename": "pkg-1.0.0.tar.gz", "url": "https://files.example.org/pkg-1.0.0.tar.gz"}
///     ]
/// })).unwrap();
///
/// let index = resolve_wheel_tags(&metadata, None).unwrap();
/// assert_eq!(index.tags.len(), 1);
/// assert!(index.tags.contains_key(&WheelTag::new("py3", "none", "any")));
/// assert_eq!(index.other_urls.len(), 1);
/// ```
pub fn resolve_wheel_tags(metadata: &ProjectMetadata, version: Option<&str>) -> Result<ResolvedIndex> {
    let version = version.unwrap_or(&metadata.info.version);
    let artifacts = metadata.artifacts(version)?;

    if artifacts.is_empty() {
        return Err(PypiJsonError::NoArtifacts {
            version: version.to_string(),
        });
    }

    let mut index = ResolvedIndex::default();

    for artifact in artifacts {
        let url = Url::parse(&artifact.url).map_err(|e| PypiJsonError::InvalidUrl {
            url: artifact.url.clone(),
            source: e,
        })?;
        let filename = url_filename(&url);

        if !is_wheel_filename(&filename) {
            index.other_urls.push(url);
            continue;
        }

        let wheel = WheelFilename::parse(&filename)?;
        for tag in wheel.tags() {
            if let Some(previous) = index.tags.get(&tag) {
                tracing::debug!("tag {} moves from {} to {}", tag, previous, url);
            }
            index.tags.insert(tag, url.clone());
        }
    }

    tracing::debug!(
        "resolved {} tags and {} other files for {} {}",
        index.tags.len(),
        index.other_urls.len(),
        metadata.info.name,
        version
    );

    Ok(index)
}

impl ProjectMetadata {
    /// Method form of [`resolve_wheel_tags`].
    pub fn wheel_tag_mapping(&self, version: Option<&str>) -> Result<ResolvedIndex> {
        resolve_wheel_tags(self, version)
    }
}

/// Last path segment of `url`, percent-decoded when possible.
fn url_filename(url: &Url) -> String {
    let raw = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::parse_metadata;
    use serde_json::{Value, json};

    const FILES: &str = "https://files.example.org/packages";

    fn file(filename: &str) -> Value {
        json!({"filename": filename, "url": format!("{}/{}", FILES, filename)})
    }

    fn file_at(filename: &str, dir: &str) -> Value {
        json!({"filename": filename, "url": format!("{}/{}/{}", FILES, dir, filename)})
    }

    fn metadata_with_urls(urls: Vec<Value>) -> ProjectMetadata {
        parse_metadata(json!({
            "info": {"name": "pkg", "version": "1.0.0"},
            "last_serial": 1,
            "releases": {
                "0.9.0": [file("pkg-0.9.0.tar.gz"), file("pkg-0.9.0-py2.py3-none-any.whl")],
                "0.8.0": []
            },
            "urls": urls
        }))
        .unwrap()
    }

    fn url(path: &str) -> Url {
        Url::parse(&format!("{}/{}", FILES, path)).unwrap()
    }

    #[test]
    fn test_wheel_and_sdist() {
        let metadata = metadata_with_urls(vec![
            file("pkg-1.0.0-py3-none-any.whl"),
            file("pkg-1.0.0.tar.gz"),
        ]);

        let index = resolve_wheel_tags(&metadata, None).unwrap();

        assert_eq!(index.tags.len(), 1);
        assert_eq!(
            index.tags[&WheelTag::new("py3", "none", "any")],
            url("pkg-1.0.0-py3-none-any.whl")
        );
        assert_eq!(index.other_urls, vec![url("pkg-1.0.0.tar.gz")]);
        assert!(!index.is_source_only());
    }

    #[test]
    fn test_compressed_tags_share_url() {
        let metadata = metadata_with_urls(vec![]);
        let index = resolve_wheel_tags(&metadata, Some("0.9.0")).unwrap();

        assert_eq!(index.tags.len(), 2);
        let expected = url("pkg-0.9.0-py2.py3-none-any.whl");
        assert_eq!(index.tags[&WheelTag::new("py2", "none", "any")], expected);
        assert_eq!(index.tags[&WheelTag::new("py3", "none", "any")], expected);
        assert_eq!(index.other_urls, vec![url("pkg-0.9.0.tar.gz")]);
    }

    #[test]
    fn test_last_write_wins() {
        let metadata = metadata_with_urls(vec![
            file_at("pkg-1.0.0-py3-none-any.whl", "a"),
            file_at("pkg-1.0.0-py3-none-any.whl", "b"),
        ]);

        let index = resolve_wheel_tags(&metadata, None).unwrap();

        assert_eq!(index.tags.len(), 1);
        assert_eq!(
            index.tags[&WheelTag::new("py3", "none", "any")],
            url("b/pkg-1.0.0-py3-none-any.whl")
        );
    }

    #[test]
    fn test_partial_overlap_keeps_earlier_tags() {
        let metadata = metadata_with_urls(vec![
            file("pkg-1.0.0-py2.py3-none-any.whl"),
            file("pkg-1.0.0-py3-none-any.whl"),
        ]);

        let index = resolve_wheel_tags(&metadata, None).unwrap();

        assert_eq!(
            index.tags[&WheelTag::new("py2", "none", "any")],
            url("pkg-1.0.0-py2.py3-none-any.whl")
        );
        assert_eq!(
            index.tags[&WheelTag::new("py3", "none", "any")],
            url("pkg-1.0.0-py3-none-any.whl")
        );
    }

    #[test]
    fn test_no_artifacts() {
        let metadata = metadata_with_urls(vec![]);

        match resolve_wheel_tags(&metadata, None) {
            Err(PypiJsonError::NoArtifacts { version }) => assert_eq!(version, "1.0.0"),
            other => panic!("Expected NoArtifacts, got {:?}", other),
        }

        assert!(matches!(
            resolve_wheel_tags(&metadata, Some("0.8.0")),
            Err(PypiJsonError::NoArtifacts { .. })
        ));
    }

    #[test]
    fn test_version_not_found() {
        let metadata = metadata_with_urls(vec![file("pkg-1.0.0.tar.gz")]);

        let err = resolve_wheel_tags(&metadata, Some("1.2.3")).unwrap_err();
        assert!(matches!(&err, PypiJsonError::VersionNotFound { version } if version == "1.2.3"));
        assert!(err.to_string().contains("1.2.3"));
    }

    #[test]
    fn test_malformed_wheel_name() {
        let metadata = metadata_with_urls(vec![file("pkg-1.0.0-none-any.whl")]);

        match resolve_wheel_tags(&metadata, None) {
            Err(PypiJsonError::FilenameParse { filename, .. }) => {
                assert_eq!(filename, "pkg-1.0.0-none-any.whl");
            }
            other => panic!("Expected FilenameParse, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_url() {
        let metadata = metadata_with_urls(vec![json!({
            "filename": "pkg-1.0.0.tar.gz",
            "url": "not a url"
        })]);

        assert!(matches!(
            resolve_wheel_tags(&metadata, None),
            Err(PypiJsonError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_other_urls_are_never_wheels() {
        let metadata = metadata_with_urls(vec![
            file("pkg-1.0.0.tar.gz"),
            file("pkg-1.0.0.zip"),
            file("pkg-1.0.0-py3.9.egg"),
            file("pkg-1.0.0.win32.exe"),
            file("pkg-1.0.0-cp39-cp39-win32.whl"),
        ]);

        let index = resolve_wheel_tags(&metadata, None).unwrap();

        assert_eq!(index.other_urls.len(), 4);
        for other in &index.other_urls {
            assert!(!is_wheel_filename(&url_filename(other)));
        }
    }

    #[test]
    fn test_other_urls_keep_order() {
        let metadata = metadata_with_urls(vec![
            file("pkg-1.0.0.zip"),
            file("pkg-1.0.0-py3-none-any.whl"),
            file("pkg-1.0.0.tar.gz"),
        ]);

        let index = resolve_wheel_tags(&metadata, None).unwrap();
        assert_eq!(
            index.other_urls,
            vec![url("pkg-1.0.0.zip"), url("pkg-1.0.0.tar.gz")]
        );
    }

    #[test]
    fn test_source_only_release() {
        let metadata = metadata_with_urls(vec![file("pkg-1.0.0.tar.gz")]);
        let index = resolve_wheel_tags(&metadata, None).unwrap();
        assert!(index.is_source_only());
    }

    #[test]
    fn test_percent_encoded_filename() {
        let metadata = metadata_with_urls(vec![json!({
            "filename": "pkg-1.0.0+local-py3-none-any.whl",
            "url": format!("{}/pkg-1.0.0%2Blocal-py3-none-any.whl", FILES)
        })]);

        let index = resolve_wheel_tags(&metadata, None).unwrap();
        assert!(index.tags.contains_key(&WheelTag::new("py3", "none", "any")));
    }

    #[test]
    fn test_fresh_index_per_call() {
        let metadata = metadata_with_urls(vec![file("pkg-1.0.0-py3-none-any.whl")]);
        let first = metadata.wheel_tag_mapping(None).unwrap();
        let second = metadata.wheel_tag_mapping(None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_best_match_priority() {
        let metadata = metadata_with_urls(vec![
            file("pkg-1.0.0-cp39-cp39-manylinux2014_x86_64.whl"),
            file("pkg-1.0.0-py3-none-any.whl"),
        ]);
        let index = resolve_wheel_tags(&metadata, None).unwrap();

        let linux = [
            WheelTag::new("cp39", "cp39", "manylinux2014_x86_64"),
            WheelTag::new("py3", "none", "any"),
        ];
        assert_eq!(
            index.best_match(&linux),
            Some(&url("pkg-1.0.0-cp39-cp39-manylinux2014_x86_64.whl"))
        );

        let windows = [
            WheelTag::new("cp39", "cp39", "win_amd64"),
            WheelTag::new("py3", "none", "any"),
        ];
        assert_eq!(
            index.best_match(&windows),
            Some(&url("pkg-1.0.0-py3-none-any.whl"))
        );

        let py2 = [WheelTag::new("py2", "none", "any")];
        assert_eq!(index.best_match(&py2), None);
    }

    #[test]
    fn test_sorted_tags() {
        let metadata = metadata_with_urls(vec![file("pkg-1.0.0-py3.py2-none-any.whl")]);
        let index = resolve_wheel_tags(&metadata, None).unwrap();

        let rendered: Vec<String> = index
            .sorted_tags()
            .iter()
            .map(|(tag, _)| tag.to_string())
            .collect();
        assert_eq!(rendered, vec!["py2-none-any", "py3-none-any"]);
    }
}
