//! Request side of the XACML JSON Profile.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{is_false, one_or_many};

/// Well-known attribute categories with a shorthand member in the JSON Profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    AccessSubject,
    Resource,
    Action,
    Environment,
}

impl CategoryKind {
    pub const ALL: [Self; 4] = [
        Self::AccessSubject,
        Self::Resource,
        Self::Action,
        Self::Environment,
    ];

    /// Full category identifier.
    #[must_use]
    pub fn urn(self) -> &'static str {
        match self {
            Self::AccessSubject => "urn:oasis:names:tc:xacml:1.0:subject-category:access-subject",
            Self::Resource => "urn:oasis:names:tc:xacml:3.0:attribute-category:resource",
            Self::Action => "urn:oasis:names:tc:xacml:3.0:attribute-category:action",
            Self::Environment => "urn:oasis:names:tc:xacml:3.0:attribute-category:environment",
        }
    }

    /// Shorthand member name used in the request document.
    #[must_use]
    pub fn shorthand(self) -> &'static str {
        match self {
            Self::AccessSubject => "AccessSubject",
            Self::Resource => "Resource",
            Self::Action => "Action",
            Self::Environment => "Environment",
        }
    }

    /// Resolve a category identifier (URN or shorthand) to a well-known kind.
    #[must_use]
    pub fn from_identifier(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.urn() == id || kind.shorthand() == id)
    }
}

/// A single attribute within a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attribute {
    /// Attribute identifier (e.g. `urn:oasis:names:tc:xacml:1.0:subject:subject-id`).
    pub attribute_id: String,
    /// Attribute value. Arrays encode bags.
    pub value: Value,
    /// Data type URI or shorthand. Omitted means the PDP infers it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Ask the PDP to echo this attribute back in the result.
    #[serde(default, skip_serializing_if = "is_false")]
    pub include_in_result: bool,
}

impl Attribute {
    #[must_use]
    pub fn new(attribute_id: impl Into<String>, value: impl IntoAttributeValue) -> Self {
        Self {
            attribute_id: attribute_id.into(),
            value: value.into_attribute_value(),
            data_type: None,
            issuer: None,
            include_in_result: false,
        }
    }

    #[must_use]
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    #[must_use]
    pub fn include_in_result(mut self, include: bool) -> Self {
        self.include_in_result = include;
        self
    }
}

/// A named collection of attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Category {
    /// Category identifier. Required for custom categories, omitted for
    /// categories encoded under their shorthand member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Reference target for `MultiRequests`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Free-form content (XML or JSON string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        rename = "Attribute",
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub attributes: Vec<Attribute>,
}

impl Category {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom category identified by `category_id`.
    #[must_use]
    pub fn custom(category_id: impl Into<String>) -> Self {
        Self {
            category_id: Some(category_id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn with_attribute(
        self,
        attribute_id: impl Into<String>,
        value: impl IntoAttributeValue,
    ) -> Self {
        self.with(Attribute::new(attribute_id, value))
    }

    #[must_use]
    pub fn with(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// First attribute with the given id.
    #[must_use]
    pub fn attribute(&self, attribute_id: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.attribute_id == attribute_id)
    }
}

/// Multiple Decision Profile references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiRequests {
    #[serde(rename = "RequestReference", deserialize_with = "one_or_many")]
    pub request_references: Vec<RequestReference>,
}

/// One individual decision, expressed as the category `Id`s it combines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestReference {
    #[serde(rename = "ReferenceId", deserialize_with = "one_or_many")]
    pub reference_ids: Vec<String>,
}

impl RequestReference {
    #[must_use]
    pub fn new<I, S>(reference_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reference_ids: reference_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// XACML decision request.
///
/// Built through [`Request::builder`](crate::pep::RequestBuilder) or decoded
/// from the wire. Fields are read-only once built, so the multi-decision
/// predicate is stable for the lifetime of the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Request {
    #[serde(default)]
    pub(crate) return_policy_id_list: bool,
    #[serde(default)]
    pub(crate) combined_decision: bool,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub(crate) access_subject: Vec<Category>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub(crate) resource: Vec<Category>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub(crate) action: Vec<Category>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub(crate) environment: Vec<Category>,
    #[serde(
        default,
        rename = "Category",
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub(crate) custom: Vec<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) multi_requests: Option<MultiRequests>,
}

impl Request {
    /// Whether the PDP should list the policies that contributed to each decision.
    #[must_use]
    pub fn return_policy_id_list(&self) -> bool {
        self.return_policy_id_list
    }

    #[must_use]
    pub fn combined_decision(&self) -> bool {
        self.combined_decision
    }

    /// Instances of a well-known category, in insertion order.
    #[must_use]
    pub fn categories(&self, kind: CategoryKind) -> &[Category] {
        match kind {
            CategoryKind::AccessSubject => &self.access_subject,
            CategoryKind::Resource => &self.resource,
            CategoryKind::Action => &self.action,
            CategoryKind::Environment => &self.environment,
        }
    }

    /// Categories carried under the generic `Category` member.
    #[must_use]
    pub fn custom_categories(&self) -> &[Category] {
        &self.custom
    }

    #[must_use]
    pub fn multi_requests(&self) -> Option<&MultiRequests> {
        self.multi_requests.as_ref()
    }

    /// Every category in the request, shorthand members first.
    pub fn all_categories(&self) -> impl Iterator<Item = &Category> {
        CategoryKind::ALL
            .into_iter()
            .flat_map(|kind| self.categories(kind))
            .chain(&self.custom)
    }

    /// Whether this request is a Multiple Decision Profile request.
    ///
    /// True when it carries at least one `RequestReference`, or when any
    /// category (shorthand or custom, compared by identifier) occurs more
    /// than once.
    #[must_use]
    pub fn is_multi_decision_request(&self) -> bool {
        let has_references = self
            .multi_requests
            .as_ref()
            .is_some_and(|m| !m.request_references.is_empty());

        has_references || self.category_counts().values().any(|count| *count > 1)
    }

    /// Number of individual decisions the PDP is expected to return.
    ///
    /// With `MultiRequests` this is the number of references; otherwise it is
    /// the product of the instance counts of every category present.
    #[must_use]
    pub fn individual_decision_count(&self) -> usize {
        if let Some(multi) = self
            .multi_requests
            .as_ref()
            .filter(|m| !m.request_references.is_empty())
        {
            return multi.request_references.len();
        }

        self.category_counts()
            .values()
            .fold(1_usize, |acc, count| acc.saturating_mul(*count))
    }

    /// Instance count per category identifier. Custom categories that use a
    /// well-known URN are counted together with the shorthand member.
    fn category_counts(&self) -> HashMap<&str, usize> {
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for kind in CategoryKind::ALL {
            let n = self.categories(kind).len();
            if n > 0 {
                *counts.entry(kind.urn()).or_default() += n;
            }
        }

        for category in &self.custom {
            let Some(id) = category.category_id.as_deref() else {
                continue;
            };
            let key = match CategoryKind::from_identifier(id) {
                Some(kind) => kind.urn(),
                None => id,
            };
            *counts.entry(key).or_default() += 1;
        }

        counts
    }
}

/// Conversion of typed values into attribute values.
pub trait IntoAttributeValue {
    fn into_attribute_value(self) -> Value;
}

impl IntoAttributeValue for String {
    #[inline]
    fn into_attribute_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoAttributeValue for &str {
    #[inline]
    fn into_attribute_value(self) -> Value {
        Value::String(self.to_owned())
    }
}

impl IntoAttributeValue for &String {
    #[inline]
    fn into_attribute_value(self) -> Value {
        Value::String(self.clone())
    }
}

impl IntoAttributeValue for bool {
    #[inline]
    fn into_attribute_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoAttributeValue for i64 {
    #[inline]
    fn into_attribute_value(self) -> Value {
        Value::Number(self.into())
    }
}

impl IntoAttributeValue for i32 {
    #[inline]
    fn into_attribute_value(self) -> Value {
        Value::Number(self.into())
    }
}

impl IntoAttributeValue for u64 {
    #[inline]
    fn into_attribute_value(self) -> Value {
        Value::Number(self.into())
    }
}

impl IntoAttributeValue for f64 {
    /// Non-finite values become `null`.
    #[inline]
    fn into_attribute_value(self) -> Value {
        Value::from(self)
    }
}

impl IntoAttributeValue for Value {
    #[inline]
    fn into_attribute_value(self) -> Value {
        self
    }
}

impl<T: IntoAttributeValue> IntoAttributeValue for Vec<T> {
    fn into_attribute_value(self) -> Value {
        Value::Array(
            self.into_iter()
                .map(IntoAttributeValue::into_attribute_value)
                .collect(),
        )
    }
}
