//! Errors produced while interpreting PyPI JSON metadata.

use pypi_json_core::TransportError;
use thiserror::Error;

/// Errors that can occur while parsing metadata or resolving artifacts.
///
/// None of these are retried: they describe the document, not the network.
/// Transport failures are wrapped in [`PypiJsonError::Transport`].
#[derive(Error, Debug)]
pub enum PypiJsonError {
    /// The metadata document is missing a required key or has the wrong shape
    #[error("Invalid metadata document: {message}")]
    Schema { message: String },

    /// A version string does not follow PEP 440
    #[error("Invalid version '{version}': {source}")]
    VersionParse {
        version: String,
        #[source]
        source: pep440_rs::VersionParseError,
    },

    /// Release-wide data was requested but the document has no `releases` map
    #[error("{}", no_releases_message(.versioned))]
    NoReleases { versioned: bool },

    /// The requested version is not a key of `releases`
    #[error("Cannot find version {version} on the index.")]
    VersionNotFound { version: String },

    /// The resolved version exists but has no files
    #[error("Version {version} has no files on the index.")]
    NoArtifacts { version: String },

    /// A `.whl` filename does not follow the wheel filename grammar
    #[error("Invalid wheel filename '{filename}': {reason}")]
    FilenameParse { filename: String, reason: String },

    /// A compatibility tag is not of the form `python-abi-platform`
    #[error("Invalid compatibility tag '{tag}', expected 'python-abi-platform'")]
    InvalidTag { tag: String },

    /// An artifact URL could not be parsed
    #[error("Invalid artifact URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A `requires_dist` entry is not a valid PEP 508 requirement
    #[error("Invalid requirement '{requirement}': {source}")]
    InvalidRequirement {
        requirement: String,
        #[source]
        source: Box<pep508_rs::Pep508Error>,
    },

    /// The index answered 404 for the project (or project/version)
    #[error("{}", project_not_found_message(.project, .version.as_deref()))]
    ProjectNotFound {
        project: String,
        version: Option<String>,
    },

    /// The request never produced a usable response body
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type alias for pypi-json operations.
pub type Result<T> = std::result::Result<T, PypiJsonError>;

impl PypiJsonError {
    /// Helper for creating schema errors
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Helper for creating wheel filename errors
    pub fn filename_parse(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FilenameParse {
            filename: filename.into(),
            reason: reason.into(),
        }
    }

    /// Helper for creating version parse errors
    pub fn version_parse(version: impl Into<String>, source: pep440_rs::VersionParseError) -> Self {
        Self::VersionParse {
            version: version.into(),
            source,
        }
    }

    /// Helper for creating "version not found" errors
    pub fn version_not_found(version: impl Into<String>) -> Self {
        Self::VersionNotFound {
            version: version.into(),
        }
    }
}

fn no_releases_message(versioned: &bool) -> &'static str {
    if *versioned {
        "The 'releases' key is no longer included in the JSON responses for individual versions. \
         Fetch the metadata again without supplying a version."
    } else {
        "The metadata document has no releases."
    }
}

fn project_not_found_message(project: &str, version: Option<&str>) -> String {
    match version {
        Some(version) => format!("No such project/version '{}' {}", project, version),
        None => format!("No such project '{}'", project),
    }
}
