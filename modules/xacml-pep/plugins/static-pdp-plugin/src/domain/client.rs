//! [`PdpTransport`] implementation for the static PDP plugin.

use async_trait::async_trait;
use xacml_pep_sdk::{AuthZClientError, DecisionVariant, PdpPayload, PdpTransport, Request};

use super::service::Service;

#[async_trait]
impl PdpTransport for Service {
    async fn send(
        &self,
        request: &Request,
        variant: DecisionVariant,
    ) -> Result<PdpPayload, AuthZClientError> {
        tracing::debug!(
            variant = variant.as_str(),
            mode = ?self.config().mode,
            "static PDP evaluating request"
        );
        Ok(self.evaluate(request, variant))
    }
}
