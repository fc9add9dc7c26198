//! Async client for the PyPI JSON API.

use crate::error::{PypiJsonError, Result};
use crate::metadata::ProjectMetadata;
use bytes::Bytes;
use pypi_json_core::{HttpTransport, Transport, TransportConfig, TransportError};
use std::fmt;
use std::sync::Arc;

/// Client for a PyPI-compatible JSON API.
///
/// Every call goes to the transport; responses are not cached.
///
/// # Examples
///
/// ```no_run
/// # use pypi_json::PypiJsonClient;
/// # use pypi_json_core::TransportConfig;
/// # #[tokio::main]
/// # async fn main() -> pypi_json::Result<()> {
/// let client = PypiJsonClient::from_config(TransportConfig::default())?;
/// let metadata = client.get_metadata("octocheese", None).await?;
/// println!("{} {}", metadata.info.name, metadata.info.version);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PypiJsonClient {
    transport: Arc<dyn Transport>,
}

impl PypiJsonClient {
    /// Creates a client on top of an existing transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Creates a client with an [`HttpTransport`] built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PypiJsonError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: TransportConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// Base URL of the JSON API, without a trailing slash.
    pub fn endpoint_url(&self) -> &str {
        self.transport.endpoint().trim_end_matches('/')
    }

    /// Fetches metadata for `project`, optionally pinned to `version`.
    ///
    /// Requesting a specific version returns a document without `releases`;
    /// release-wide operations on it fail with [`PypiJsonError::NoReleases`].
    ///
    /// # Errors
    ///
    /// - [`PypiJsonError::ProjectNotFound`] when the index answers 404
    /// - [`PypiJsonError::Schema`] when the body is not a metadata document
    /// - [`PypiJsonError::Transport`] for any other transport failure
    pub async fn get_metadata(&self, project: &str, version: Option<&str>) -> Result<ProjectMetadata> {
        let url = self.metadata_url(project, version);
        tracing::debug!("fetching metadata from {}", url);

        let body = self.transport.get(&url).await.map_err(|e| match e {
            TransportError::NotFound { .. } => PypiJsonError::ProjectNotFound {
                project: project.to_string(),
                version: version.map(str::to_string),
            },
            other => PypiJsonError::Transport(other),
        })?;

        ProjectMetadata::from_slice(&body, version.is_some())
    }

    /// Downloads the file at `url`, typically an artifact URL from the metadata.
    pub async fn download_file(&self, url: &str) -> Result<Bytes> {
        tracing::debug!("downloading {}", url);
        Ok(self.transport.get(url).await?)
    }

    fn metadata_url(&self, project: &str, version: Option<&str>) -> String {
        let project = urlencoding::encode(project);
        match version {
            Some(version) => format!(
                "{}/{}/{}/json",
                self.endpoint_url(),
                project,
                urlencoding::encode(version)
            ),
            None => format!("{}/{}/json", self.endpoint_url(), project),
        }
    }
}

impl fmt::Display for PypiJsonClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PypiJsonClient({})", self.endpoint_url())
    }
}

impl fmt::Debug for PypiJsonClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PypiJsonClient")
            .field("endpoint", &self.endpoint_url())
            .finish()
    }
}
