use thiserror::Error;

/// Transport-level errors shared by every pypi-json crate.
///
/// These describe what went wrong between the client and the index server.
/// Interpretation of the payload (schema, versions, filenames) happens in
/// `pypi-json` and has its own error type.
///
/// # Examples
///
/// ```
/// use pypi_json_core::error::{Result, TransportError};
///
/// fn require_https(url: &str) -> Result<()> {
///     if !url.starts_with("https://") {
///         return Err(TransportError::InsecureUrl(url.into()));
///     }
///     Ok(())
/// }
///
/// assert!(require_https("http://example.com").is_err());
/// ```
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("not found: {url}")]
    NotFound { url: String },

    #[error("URL must use HTTPS: {0}")]
    InsecureUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl TransportError {
    /// Helper for wrapping a reqwest failure with the URL it concerned.
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }

    /// Returns the HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

/// Convenience type alias for `Result<T, TransportError>`.
pub type Result<T> = std::result::Result<T, TransportError>;
