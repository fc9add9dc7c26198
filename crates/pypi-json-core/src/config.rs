use serde::Deserialize;

/// Base URL of the public PyPI JSON API.
pub const DEFAULT_ENDPOINT: &str = "https://pypi.org/pypi";

/// Default timeout for HTTP requests, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`HttpTransport`](crate::HttpTransport).
///
/// Every field has a default, so an empty JSON object is a valid configuration.
///
/// # Defaults
///
/// - `endpoint`: `"https://pypi.org/pypi"`
/// - `timeout_secs`: `10`
/// - `user_agent`: `"pypi-json/<crate version>"`
/// - `username` / `password`: unset (no authentication)
/// - `require_https`: `false`
///
/// # Examples
///
/// ```
/// use pypi_json_core::TransportConfig;
///
/// let json = r#"{
///     "endpoint": "https://my.custom.pypi/",
///     "username": "username",
///     "password": "password"
/// }"#;
///
/// let config: TransportConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.endpoint, "https://my.custom.pypi/");
/// assert_eq!(config.timeout_secs, 10);
/// assert!(config.basic_auth().is_some());
/// ```
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct TransportConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub require_https: bool,
}

impl TransportConfig {
    /// Returns a configuration pointing at `endpoint` with all other fields defaulted.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Returns `(username, password)` when a username is configured.
    pub fn basic_auth(&self) -> Option<(&str, Option<&str>)> {
        self.username
            .as_deref()
            .map(|user| (user, self.password.as_deref()))
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            username: None,
            password: None,
            require_https: false,
        }
    }
}

// Keeps the password out of logs.
impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("require_https", &self.require_https)
            .finish()
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("pypi-json/{}", env!("CARGO_PKG_VERSION"))
}
