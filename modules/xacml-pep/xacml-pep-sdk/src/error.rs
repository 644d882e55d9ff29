//! Error types for the XACML PEP client.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by [`AuthZClient`](crate::AuthZClient) and
/// [`PdpTransport`](crate::PdpTransport) implementations.
///
/// Each variant names the layer that failed. Nothing is retried; a PDP
/// decision other than `Permit` is not an error.
#[derive(Debug, Error)]
pub enum AuthZClientError {
    /// Missing or invalid client configuration. Raised before any network activity.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The request could not be encoded.
    #[error("failed to encode request: {0}")]
    Serialization(String),

    /// The PDP could not be reached.
    #[error("connection to PDP failed: {0}")]
    Connect(String),

    /// TLS handshake or certificate validation failed.
    #[error("TLS failure talking to PDP: {0}")]
    Tls(String),

    /// The call did not complete within the configured request timeout.
    #[error("PDP call timed out after {0:?}")]
    Timeout(Duration),

    /// The PDP rejected the credentials (HTTP 401).
    #[error("PDP rejected credentials (HTTP {status})")]
    Unauthorized { status: u16, body: String },

    /// Any other non-2xx status. The body is not parsed as a decision.
    #[error("PDP returned HTTP {status}")]
    Status { status: u16, body: String },

    /// The response body matched neither response shape.
    #[error("failed to decode PDP response: {0}")]
    Deserialization(String),

    /// The PDP answered with no results.
    #[error("PDP returned an empty result set")]
    EmptyResponse,

    /// Any other transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl AuthZClientError {
    /// HTTP status of the PDP answer, for protocol-level errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AuthZClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Deserialization(e.to_string())
    }
}
