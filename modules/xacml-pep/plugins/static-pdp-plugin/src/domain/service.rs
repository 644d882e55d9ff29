//! Service implementation for the static PDP plugin.

use xacml_pep_sdk::models::response::STATUS_OK;
use xacml_pep_sdk::models::{IdReference, PolicyIdentifierList, StatusCode};
use xacml_pep_sdk::{
    DecisionResult, DecisionVariant, PdpPayload, Request, Response, SingleResponse, Status,
};

use crate::config::StaticPdpPluginConfig;

/// Static PDP service.
///
/// Every individual decision in a request gets the configured decision:
/// - `SingleDecision` → single-object payload with one result
/// - `MultiDecision` → array payload with one result per individual decision
#[derive(Debug, Clone, Default)]
pub struct Service {
    config: StaticPdpPluginConfig,
}

impl Service {
    #[must_use]
    pub fn new(config: StaticPdpPluginConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &StaticPdpPluginConfig {
        &self.config
    }

    /// Evaluate a request for the given call variant.
    #[must_use]
    pub fn evaluate(&self, request: &Request, variant: DecisionVariant) -> PdpPayload {
        match variant {
            DecisionVariant::SingleDecision => {
                PdpPayload::Single(SingleResponse::new(self.result(request)))
            }
            DecisionVariant::MultiDecision => {
                let count = request.individual_decision_count().max(1);
                PdpPayload::Multi(Response::new(
                    (0..count).map(|_| self.result(request)).collect(),
                ))
            }
        }
    }

    fn result(&self, request: &Request) -> DecisionResult {
        let policy_identifier_list = request.return_policy_id_list().then(|| PolicyIdentifierList {
            policy_id_reference: vec![IdReference {
                id: self.config.policy_id.clone(),
                version: None,
            }],
            policy_set_id_reference: Vec::new(),
        });

        DecisionResult {
            status: Some(Status {
                status_code: Some(StatusCode {
                    value: STATUS_OK.to_owned(),
                    status_code: None,
                }),
                status_message: None,
                status_detail: None,
            }),
            policy_identifier_list,
            ..DecisionResult::new(self.config.decision())
        }
    }
}
