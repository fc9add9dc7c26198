use crate::config::TransportConfig;
use crate::error::{Result, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Source of raw response bodies.
///
/// The client only needs "give me the bytes at this URL"; everything about
/// sessions, authentication and timeouts lives behind this trait.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use bytes::Bytes;
/// use pypi_json_core::{Transport, TransportError};
///
/// struct Canned(&'static str);
///
/// #[async_trait]
/// impl Transport for Canned {
///     fn endpoint(&self) -> &str {
///         "https://example.invalid/pypi"
///     }
///
///     async fn get(&self, _url: &str) -> Result<Bytes, TransportError> {
///         Ok(Bytes::from_static(self.0.as_bytes()))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Base URL of the JSON API this transport talks to.
    fn endpoint(&self) -> &str;

    /// Fetches `url` and returns the fully buffered response body.
    ///
    /// # Errors
    ///
    /// - [`TransportError::NotFound`] for HTTP 404
    /// - [`TransportError::Status`] for any other non-2xx status
    /// - [`TransportError::Request`] when the request itself fails
    async fn get(&self, url: &str) -> Result<Bytes>;
}

/// [`Transport`] backed by a `reqwest` client.
///
/// The user agent, timeout and optional basic authentication are taken from
/// [`TransportConfig`] and applied to every request.
///
/// # Examples
///
/// ```no_run
/// use pypi_json_core::{HttpTransport, Transport, TransportConfig};
///
/// # async fn example() -> pypi_json_core::Result<()> {
/// let transport = HttpTransport::new(TransportConfig::default())?;
/// let body = transport.get("https://pypi.org/pypi/octocheese/json").await?;
/// println!("Fetched {} bytes", body.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: TransportConfig,
}

impl HttpTransport {
    /// Creates a transport from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the underlying HTTP client cannot
    /// be constructed (for example when the TLS backend fails to initialise).
    pub fn new(config: TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self { client, config })
    }

    /// Returns the configuration this transport was built from.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn ensure_https(&self, url: &str) -> Result<()> {
        if self.config.require_https && !url.starts_with("https://") {
            return Err(TransportError::InsecureUrl(url.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    async fn get(&self, url: &str) -> Result<Bytes> {
        self.ensure_https(url)?;
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url);
        if let Some((username, password)) = self.config.basic_auth() {
            request = request.basic_auth(username, password);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::request(url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::request(url, e))?;

        tracing::debug!("received {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
