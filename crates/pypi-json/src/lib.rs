//! PyPI JSON API client and metadata model.
//!
//! Fetches project metadata from a PyPI-compatible JSON API, exposes it as a
//! typed, read-only [`ProjectMetadata`] value and resolves the wheels of a
//! release into a compatibility tag → download URL index.
//!
//! # Examples
//!
//! ```no_run
//! use pypi_json::{PypiJsonClient, WheelTag};
//! use pypi_json_core::TransportConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> pypi_json::Result<()> {
//! let client = PypiJsonClient::from_config(TransportConfig::default())?;
//! let metadata = client.get_metadata("octocheese", None).await?;
//!
//! println!("latest: {}", metadata.latest_version()?);
//!
//! let index = metadata.wheel_tag_mapping(None)?;
//! if let Some(url) = index.best_match(&[WheelTag::new("py3", "none", "any")]) {
//!     println!("download {}", url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod metadata;
pub mod name;
pub mod resolver;
pub mod types;
pub mod wheel;

// Re-export commonly used types
pub use client::PypiJsonClient;
pub use error::{PypiJsonError, Result};
pub use metadata::{ProjectMetadata, parse_metadata};
pub use name::canonicalize_name;
pub use resolver::{ResolvedIndex, resolve_wheel_tags};
pub use types::{Artifact, FileUrl, PackageType, ProjectInfo, Vulnerability};
pub use wheel::{BuildTag, WheelFilename, WheelTag, expand_tags, is_wheel_filename};
