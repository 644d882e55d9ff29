//! Domain models for the XACML JSON Profile.
//!
//! Member names follow the profile's `PascalCase` encoding. Every array member
//! also accepts a bare object on input, since the 1.0 profile allowed either.

use serde::{Deserialize, Deserializer};

pub mod request;
pub mod response;

pub use request::{
    Attribute, Category, CategoryKind, IntoAttributeValue, MultiRequests, Request,
    RequestReference,
};
pub use response::{
    AttributeAssignment, Decision, DecisionResult, IdReference, ObligationOrAdvice, PdpPayload,
    PolicyIdentifierList, Response, SingleResponse, Status, StatusCode,
};

/// Accept either `[T, ...]` or a single `T`.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

#[allow(clippy::trivially_copy_pass_by_ref)] // signature required by serde
fn is_false(value: &bool) -> bool {
    !*value
}
