//! Transport layer for pypi-json.
//!
//! This crate owns everything that touches the network so that the metadata
//! model in `pypi-json` can stay a pure function of decoded JSON.
//!
//! # Architecture
//!
//! pypi-json-core defines:
//! - **Traits**: `Transport`, the seam the client fetches response bodies through
//! - **HTTP Transport**: `HttpTransport`, a `reqwest` implementation with
//!   user agent, timeout and basic authentication support
//! - **Configuration**: `TransportConfig`, deserializable with serde defaults
//! - **Error Types**: `TransportError`
//!
//! Responses are never cached; every call goes to the network.

pub mod config;
pub mod error;
pub mod transport;

// Re-export commonly used types
pub use config::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, TransportConfig};
pub use error::{Result, TransportError};
pub use transport::{HttpTransport, Transport};
