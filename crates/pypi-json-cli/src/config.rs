use anyhow::{Context, Result};
use pypi_json_core::TransportConfig;
use std::path::Path;

/// Settings that override the configuration file.
///
/// Filled from command-line flags and the `PYPI_JSON_*` environment
/// variables; clap already gives a flag precedence over its variable.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Overrides {
    pub(crate) endpoint: Option<String>,
    pub(crate) timeout_secs: Option<u64>,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
}

/// Builds the transport configuration.
///
/// Starts from the defaults, layers the JSON file at `path` (if any) on top,
/// then applies `overrides`.
pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<TransportConfig> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => TransportConfig::default(),
    };

    if let Some(endpoint) = overrides.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(timeout_secs) = overrides.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    if let Some(username) = overrides.username {
        config.username = Some(username);
    }
    if let Some(password) = overrides.password {
        config.password = Some(password);
    }

    tracing::debug!("using {:?}", config);
    Ok(config)
}

fn read_file(path: &Path) -> Result<TransportConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("invalid config file {}", path.display()))
}
