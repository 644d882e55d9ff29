//! Normalization of PDP payloads into the canonical [`Response`].

use tracing::debug;

use crate::error::AuthZClientError;
use crate::models::{PdpPayload, Request, Response};

/// Turn a transport payload into a canonical multi-result [`Response`].
///
/// - `Multi` payloads pass through unchanged.
/// - `Single` payloads are promoted to a one-element `Response`; the result
///   is moved as-is.
///
/// The payload shape decides, not the request: when the request's
/// multi-decision predicate disagrees with the shape the PDP used, the
/// payload is still normalized and the mismatch is logged.
///
/// # Errors
///
/// - [`AuthZClientError::EmptyResponse`] if the PDP returned no results
pub fn reconcile(request: &Request, payload: PdpPayload) -> Result<Response, AuthZClientError> {
    let multi_decision = request.is_multi_decision_request();

    let response = match payload {
        PdpPayload::Multi(response) => {
            if !multi_decision {
                debug!(
                    results = response.results().len(),
                    "PDP answered a single-decision request with the array shape"
                );
            }
            response
        }
        PdpPayload::Single(single) => {
            if multi_decision {
                debug!("PDP answered a multi-decision request with a single result object");
            }
            Response::from(single)
        }
    };

    if response.is_empty() {
        return Err(AuthZClientError::EmptyResponse);
    }

    Ok(response)
}
