//! Wire encoding of requests and responses.
//!
//! Requests travel inside a `{"Request": ...}` envelope. Responses arrive in
//! one of two shapes: `{"Response": [ ... ]}` (JSON Profile 1.1, always an
//! array) or `{"Response": { ... }}` (1.0, a bare object when there is a
//! single result). [`decode_response`] accepts both.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{PdpPayload, Request, Response, SingleResponse};

/// Media type for both request and response bodies.
pub const XACML_JSON_MEDIA_TYPE: &str = "application/xacml+json";

#[derive(Serialize)]
struct RequestEnvelopeRef<'a> {
    #[serde(rename = "Request")]
    request: &'a Request,
}

#[derive(Deserialize)]
struct RequestEnvelope {
    #[serde(rename = "Request")]
    request: Request,
}

/// Encode a request document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_request(request: &Request) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&RequestEnvelopeRef { request })
}

/// Decode a request document.
///
/// # Errors
///
/// Returns an error if the body is not a valid request envelope.
pub fn decode_request(body: &[u8]) -> Result<Request, serde_json::Error> {
    serde_json::from_slice::<RequestEnvelope>(body).map(|e| e.request)
}

/// Decode a response body of either shape.
///
/// The canonical array shape is tried first; if it does not fit, the body is
/// decoded as a single-result document. When neither fits, the error for the
/// shape actually present is returned.
///
/// # Errors
///
/// Returns an error if the body is not JSON, has no `Response` member, or
/// the member matches neither shape.
pub fn decode_response(body: &[u8]) -> Result<PdpPayload, serde_json::Error> {
    let document: Value = serde_json::from_slice(body)?;

    let multi_err = match Response::deserialize(&document) {
        Ok(response) => return Ok(PdpPayload::Multi(response)),
        Err(e) => e,
    };

    match SingleResponse::deserialize(&document) {
        Ok(single) => Ok(PdpPayload::Single(single)),
        Err(single_err) => match document.get("Response") {
            Some(Value::Array(_)) => Err(multi_err),
            Some(Value::Object(_)) => Err(single_err),
            Some(other) => Err(serde_json::Error::custom(format!(
                "`Response` must be an object or an array, got {}",
                json_kind(other)
            ))),
            None => Err(serde_json::Error::missing_field("Response")),
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
