//! Response side of the XACML JSON Profile.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::one_or_many;
use super::request::Category;

/// Status code URN for a successful evaluation.
pub const STATUS_OK: &str = "urn:oasis:names:tc:xacml:1.0:status:ok";
/// The PDP lacked an attribute it needed to reach a decision.
pub const STATUS_MISSING_ATTRIBUTE: &str = "urn:oasis:names:tc:xacml:1.0:status:missing-attribute";
/// The request document was malformed.
pub const STATUS_SYNTAX_ERROR: &str = "urn:oasis:names:tc:xacml:1.0:status:syntax-error";
/// The PDP failed while evaluating the request.
pub const STATUS_PROCESSING_ERROR: &str = "urn:oasis:names:tc:xacml:1.0:status:processing-error";

/// Authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Permit,
    Deny,
    NotApplicable,
    Indeterminate,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Permit => "Permit",
            Self::Deny => "Deny",
            Self::NotApplicable => "NotApplicable",
            Self::Indeterminate => "Indeterminate",
        })
    }
}

/// Status code, possibly nested for more specific codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusCode {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<Box<StatusCode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<StatusCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_detail: Option<Value>,
}

impl Status {
    /// Top-level status code value, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.status_code.as_ref().map(|c| c.value.as_str())
    }
}

/// Attribute assignment carried by an obligation or advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeAssignment {
    pub attribute_id: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

/// Obligation or advice returned with a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObligationOrAdvice {
    pub id: String,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub attribute_assignment: Vec<AttributeAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdReference {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Policies and policy sets that contributed to a decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyIdentifierList {
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub policy_id_reference: Vec<IdReference>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub policy_set_id_reference: Vec<IdReference>,
}

/// One decision outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DecisionResult {
    pub decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub obligations: Vec<ObligationOrAdvice>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub associated_advice: Vec<ObligationOrAdvice>,
    /// Attributes echoed back because of `IncludeInResult`.
    #[serde(
        default,
        rename = "Category",
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_identifier_list: Option<PolicyIdentifierList>,
}

impl DecisionResult {
    /// Bare result with only a decision.
    #[must_use]
    pub fn new(decision: Decision) -> Self {
        Self {
            decision,
            status: None,
            obligations: Vec::new(),
            associated_advice: Vec::new(),
            categories: Vec::new(),
            policy_identifier_list: None,
        }
    }

    #[must_use]
    pub fn is_permit(&self) -> bool {
        self.decision == Decision::Permit
    }
}

/// Canonical response: an ordered sequence of results.
///
/// Encoded as `{"Response": [ ... ]}` (JSON Profile 1.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "Response")]
    results: Vec<DecisionResult>,
}

impl Response {
    #[must_use]
    pub fn new(results: Vec<DecisionResult>) -> Self {
        Self { results }
    }

    #[must_use]
    pub fn results(&self) -> &[DecisionResult] {
        &self.results
    }

    #[must_use]
    pub fn into_results(self) -> Vec<DecisionResult> {
        self.results
    }

    /// Decisions in result order.
    pub fn decisions(&self) -> impl Iterator<Item = Decision> + '_ {
        self.results.iter().map(|r| r.decision)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl From<SingleResponse> for Response {
    fn from(single: SingleResponse) -> Self {
        Self {
            results: vec![single.result],
        }
    }
}

/// Single-result response: `{"Response": { ... }}` (JSON Profile 1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleResponse {
    #[serde(rename = "Response")]
    result: DecisionResult,
}

impl SingleResponse {
    #[must_use]
    pub fn new(result: DecisionResult) -> Self {
        Self { result }
    }

    #[must_use]
    pub fn result(&self) -> &DecisionResult {
        &self.result
    }

    #[must_use]
    pub fn into_result(self) -> DecisionResult {
        self.result
    }
}

/// What a transport returns for one call, before reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum PdpPayload {
    /// Array-of-results shape.
    Multi(Response),
    /// Single-object shape.
    Single(SingleResponse),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_decodes_full_profile_document() {
        let result: DecisionResult = serde_json::from_value(json!({
            "Decision": "Deny",
            "Status": {
                "StatusCode": {
                    "Value": STATUS_MISSING_ATTRIBUTE,
                    "StatusCode": { "Value": "urn:example:nested" }
                },
                "StatusMessage": "role missing"
            },
            "Obligations": {
                "Id": "urn:example:obligation:log",
                "AttributeAssignment": [
                    { "AttributeId": "urn:example:reason", "Value": "denied" }
                ]
            },
            "AssociatedAdvice": [
                { "Id": "urn:example:advice:retry" }
            ],
            "PolicyIdentifierList": {
                "PolicyIdReference": { "Id": "p1", "Version": "1.0" }
            }
        }))
        .unwrap();

        assert_eq!(result.decision, Decision::Deny);
        let status = result.status.as_ref().unwrap();
        assert_eq!(status.code(), Some(STATUS_MISSING_ATTRIBUTE));
        assert_eq!(
            status
                .status_code
                .as_ref()
                .and_then(|c| c.status_code.as_ref())
                .map(|c| c.value.as_str()),
            Some("urn:example:nested")
        );
        assert_eq!(result.obligations.len(), 1);
        assert_eq!(result.obligations[0].attribute_assignment.len(), 1);
        assert_eq!(result.associated_advice[0].id, "urn:example:advice:retry");
        assert_eq!(
            result.policy_identifier_list.unwrap().policy_id_reference[0].id,
            "p1"
        );
    }

    #[test]
    fn unknown_decision_is_rejected() {
        let err = serde_json::from_value::<DecisionResult>(json!({ "Decision": "Maybe" }));
        assert!(err.is_err());
    }

    #[test]
    fn response_serializes_as_array_envelope() {
        let response = Response::new(vec![DecisionResult::new(Decision::Permit)]);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "Response": [{ "Decision": "Permit" }] })
        );
    }

    #[test]
    fn single_response_serializes_as_object_envelope() {
        let single = SingleResponse::new(DecisionResult::new(Decision::NotApplicable));
        assert_eq!(
            serde_json::to_value(&single).unwrap(),
            json!({ "Response": { "Decision": "NotApplicable" } })
        );
    }

    #[test]
    fn single_response_promotes_into_response() {
        let result = DecisionResult::new(Decision::Indeterminate);
        let response = Response::from(SingleResponse::new(result.clone()));
        assert_eq!(response.results(), &[result]);
    }

    #[test]
    fn decision_display_matches_wire_name() {
        assert_eq!(Decision::NotApplicable.to_string(), "NotApplicable");
    }
}
