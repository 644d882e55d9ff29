//! Plugin API trait for PDP transports.

use async_trait::async_trait;

use crate::error::AuthZClientError;
use crate::models::{PdpPayload, Request};

/// Which of the two logical PDP calls is being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionVariant {
    /// Expects the array-of-results shape.
    MultiDecision,
    /// Expects the object-or-array shape of the 1.0 profile.
    SingleDecision,
}

impl DecisionVariant {
    /// Pick the call for a request from its multi-decision predicate.
    #[must_use]
    pub fn for_request(request: &Request) -> Self {
        if request.is_multi_decision_request() {
            Self::MultiDecision
        } else {
            Self::SingleDecision
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultiDecision => "multi-decision",
            Self::SingleDecision => "single-decision",
        }
    }
}

/// Transport capability used by the client to reach a PDP.
///
/// Implementations are interchangeable at construction time (HTTP, static
/// in-process, test doubles).
#[async_trait]
pub trait PdpTransport: Send + Sync {
    /// Deliver the request and return the decoded, not yet reconciled, payload.
    ///
    /// # Errors
    ///
    /// Any [`AuthZClientError`] describing the layer that failed.
    async fn send(
        &self,
        request: &Request,
        variant: DecisionVariant,
    ) -> Result<PdpPayload, AuthZClientError>;
}
