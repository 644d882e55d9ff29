//! Public API trait for the PEP client.

use async_trait::async_trait;

use crate::error::AuthZClientError;
use crate::models::{Request, Response};

/// Client used by a PEP to obtain decisions from a remote PDP.
///
/// ```ignore
/// let client: Arc<dyn AuthZClient> = Arc::new(PdpClient::new(&config)?);
///
/// let response = client.make_authorization_request(&request).await?;
/// for decision in response.decisions() {
///     tracing::info!(%decision, "PDP decision");
/// }
/// ```
#[async_trait]
pub trait AuthZClient: Send + Sync {
    /// Send the request to the PDP and return its decisions.
    ///
    /// The response is always in the canonical multi-result shape and holds
    /// at least one result, whichever JSON Profile version the PDP speaks.
    ///
    /// # Errors
    ///
    /// - `Connect`, `Tls`, `Timeout`, `Transport` when the call cannot complete
    /// - `Unauthorized`, `Status` for non-2xx answers
    /// - `Deserialization` when the body matches neither response shape
    /// - `EmptyResponse` when the PDP returned no results
    async fn make_authorization_request(
        &self,
        request: &Request,
    ) -> Result<Response, AuthZClientError>;
}
