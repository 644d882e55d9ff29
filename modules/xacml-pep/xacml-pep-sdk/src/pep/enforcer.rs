//! Policy Enforcement Point (`PEP`) object.
//!
//! [`PolicyEnforcer`] wraps an [`AuthZClient`] with deny-biased enforcement:
//! access is granted only when every result in the response is `Permit`.
//! Anything else (`Deny`, `NotApplicable`, `Indeterminate`) is a denial.

use std::sync::Arc;

use crate::api::AuthZClient;
use crate::error::AuthZClientError;
use crate::models::{Decision, Request, Response, Status};

/// Error from the PEP enforcement flow.
#[derive(Debug, thiserror::Error)]
pub enum EnforcerError {
    /// At least one result was not `Permit`.
    #[error("access denied by PDP: {decision}")]
    Denied {
        /// First non-permit decision in the response.
        decision: Decision,
        /// Status attached to that result, if any.
        status: Option<Status>,
    },

    /// The PDP call failed.
    #[error("authorization request failed: {0}")]
    EvaluationFailed(#[from] AuthZClientError),
}

/// Deny-biased Policy Enforcement Point.
///
/// Cheap to clone (`Arc` inside). Obligations and advice are left in the
/// returned [`Response`] for the caller to discharge.
#[derive(Clone)]
pub struct PolicyEnforcer {
    client: Arc<dyn AuthZClient>,
}

impl PolicyEnforcer {
    #[must_use]
    pub fn new(client: Arc<dyn AuthZClient>) -> Self {
        Self { client }
    }

    /// Send the request and grant access only on an all-`Permit` answer.
    ///
    /// # Errors
    ///
    /// - [`EnforcerError::Denied`] if any result is not `Permit`
    /// - [`EnforcerError::EvaluationFailed`] if the PDP call fails
    #[tracing::instrument(skip_all, fields(multi_decision = request.is_multi_decision_request()))]
    pub async fn authorize(&self, request: &Request) -> Result<Response, EnforcerError> {
        let response = self.client.make_authorization_request(request).await?;

        if let Some(denied) = response.results().iter().find(|r| !r.is_permit()) {
            tracing::debug!(decision = %denied.decision, "access denied");
            return Err(EnforcerError::Denied {
                decision: denied.decision,
                status: denied.status.clone(),
            });
        }

        Ok(response)
    }
}

impl std::fmt::Debug for PolicyEnforcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEnforcer").finish_non_exhaustive()
    }
}
