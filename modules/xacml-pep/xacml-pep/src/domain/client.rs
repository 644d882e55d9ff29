//! PDP client: routes a request to the right PDP call and normalizes the
//! answer.

use std::sync::Arc;

use async_trait::async_trait;
use xacml_pep_sdk::{
    AuthZClient, AuthZClientError, DecisionVariant, PdpTransport, Request, Response, reconcile,
};

use crate::config::PdpClientConfig;
use crate::infra::HttpPdpTransport;

/// [`AuthZClient`] over a pluggable [`PdpTransport`].
///
/// Holds no mutable state; share it behind an `Arc` for concurrent calls.
#[derive(Clone)]
pub struct PdpClient {
    transport: Arc<dyn PdpTransport>,
}

impl PdpClient {
    /// Build a client that talks to the configured PDP over HTTP(S).
    ///
    /// # Errors
    ///
    /// Returns [`AuthZClientError::Configuration`] when the configuration is
    /// invalid. No network activity happens here.
    pub fn new(config: &PdpClientConfig) -> Result<Self, AuthZClientError> {
        let transport = HttpPdpTransport::new(config)?;
        tracing::info!(
            pdp_url = %config.pdp_url,
            tls_mode = ?config.tls.mode,
            request_timeout_ms = config.request_timeout_ms,
            "PDP client initialized"
        );
        Ok(Self::with_transport(Arc::new(transport)))
    }

    #[must_use]
    pub fn with_transport(transport: Arc<dyn PdpTransport>) -> Self {
        Self { transport }
    }
}

fn log_error(op: &str, e: &AuthZClientError) {
    tracing::error!(operation = op, error = ?e, "PDP call failed");
}

#[async_trait]
impl AuthZClient for PdpClient {
    #[tracing::instrument(skip_all, fields(variant = tracing::field::Empty))]
    async fn make_authorization_request(
        &self,
        request: &Request,
    ) -> Result<Response, AuthZClientError> {
        let variant = DecisionVariant::for_request(request);
        tracing::Span::current().record("variant", variant.as_str());

        let payload = self
            .transport
            .send(request, variant)
            .await
            .inspect_err(|e| log_error(variant.as_str(), e))?;

        reconcile(request, payload).inspect_err(|e| log_error(variant.as_str(), e))
    }
}

impl std::fmt::Debug for PdpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdpClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Mutex;

    use xacml_pep_sdk::models::{DecisionResult, MultiRequests, RequestReference};
    use xacml_pep_sdk::{Category, Decision, PdpPayload, SingleResponse};

    use super::*;

    /// Transport returning a canned payload and recording the variant used.
    struct CannedTransport {
        payload: Mutex<Option<Result<PdpPayload, AuthZClientError>>>,
        seen: Mutex<Vec<DecisionVariant>>,
    }

    impl CannedTransport {
        fn new(payload: Result<PdpPayload, AuthZClientError>) -> Arc<Self> {
            Arc::new(Self {
                payload: Mutex::new(Some(payload)),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PdpTransport for CannedTransport {
        async fn send(
            &self,
            _request: &Request,
            variant: DecisionVariant,
        ) -> Result<PdpPayload, AuthZClientError> {
            self.seen.lock().unwrap().push(variant);
            self.payload.lock().unwrap().take().unwrap()
        }
    }

    fn sample_request() -> Request {
        Request::builder()
            .access_subject(Category::new().with_attribute("Attributes.access_subject.role", "user"))
            .resource(Category::new().with_attribute("bnc.object.objectId", "sbie"))
            .action(Category::new().with_attribute("bnc.action.actionId", "access"))
            .build()
            .unwrap()
    }

    fn multi_request() -> Request {
        Request::builder()
            .access_subject(Category::new().with_id("s").with_attribute("role", "user"))
            .resource(Category::new().with_id("r1").with_attribute("objectId", "sbie"))
            .resource(Category::new().with_id("r2").with_attribute("objectId", "other"))
            .multi_requests(MultiRequests {
                request_references: vec![
                    RequestReference::new(["s", "r1"]),
                    RequestReference::new(["s", "r2"]),
                ],
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn single_decision_is_promoted() {
        let transport = CannedTransport::new(Ok(PdpPayload::Single(SingleResponse::new(
            DecisionResult::new(Decision::Permit),
        ))));
        let client = PdpClient::with_transport(transport.clone());

        let response = client
            .make_authorization_request(&sample_request())
            .await
            .unwrap();

        assert_eq!(response.decisions().collect::<Vec<_>>(), vec![Decision::Permit]);
        assert_eq!(
            *transport.seen.lock().unwrap(),
            vec![DecisionVariant::SingleDecision]
        );
    }

    #[tokio::test]
    async fn multi_decision_passes_through() {
        let transport = CannedTransport::new(Ok(PdpPayload::Multi(Response::new(vec![
            DecisionResult::new(Decision::Permit),
            DecisionResult::new(Decision::Deny),
        ]))));
        let client = PdpClient::with_transport(transport.clone());

        let response = client
            .make_authorization_request(&multi_request())
            .await
            .unwrap();

        assert_eq!(
            response.decisions().collect::<Vec<_>>(),
            vec![Decision::Permit, Decision::Deny]
        );
        assert_eq!(
            *transport.seen.lock().unwrap(),
            vec![DecisionVariant::MultiDecision]
        );
    }

    #[tokio::test]
    async fn transport_error_is_propagated() {
        let transport = CannedTransport::new(Err(AuthZClientError::Unauthorized {
            status: 401,
            body: "bad credentials".to_owned(),
        }));
        let client = PdpClient::with_transport(transport);

        let err = client
            .make_authorization_request(&sample_request())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn empty_result_set_is_an_error() {
        let transport = CannedTransport::new(Ok(PdpPayload::Multi(Response::new(Vec::new()))));
        let client = PdpClient::with_transport(transport);

        assert!(matches!(
            client.make_authorization_request(&multi_request()).await,
            Err(AuthZClientError::EmptyResponse)
        ));
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = PdpClientConfig::new("https://pdp.example.com", "", "secret");
        assert!(matches!(
            PdpClient::new(&config),
            Err(AuthZClientError::Configuration(_))
        ));
    }
}
