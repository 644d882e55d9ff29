//! PEP request builder.
//!
//! Fluent assembly of a [`Request`] from attribute categories. Validation is
//! structural only: identifiers and values must be present, and
//! `MultiRequests` references must resolve.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use crate::models::{Attribute, Category, CategoryKind, MultiRequests, Request};

/// Structural problem found while building a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestBuildError {
    #[error("attribute in category '{category}' has an empty AttributeId")]
    EmptyAttributeId { category: String },

    #[error("attribute '{attribute_id}' has an empty value")]
    EmptyAttributeValue { attribute_id: String },

    #[error("custom category is missing its CategoryId")]
    MissingCategoryId,

    #[error("request reference contains no ReferenceId")]
    EmptyReference,

    #[error("request reference points at unknown category Id '{0}'")]
    UnknownReference(String),
}

impl Request {
    /// Start building a request.
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }
}

/// Builder for [`Request`].
///
/// # Examples
///
/// ```
/// use xacml_pep_sdk::models::{Category, Request};
///
/// let request = Request::builder()
///     .access_subject(Category::new().with_attribute("Attributes.access_subject.role", "user"))
///     .resource(Category::new().with_attribute("bnc.object.objectId", "sbie"))
///     .action(Category::new().with_attribute("bnc.action.actionId", "access"))
///     .return_policy_id_list(true)
///     .build()
///     .unwrap();
///
/// assert!(!request.is_multi_decision_request());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    #[must_use]
    pub fn access_subject(self, category: Category) -> Self {
        self.category_of(CategoryKind::AccessSubject, category)
    }

    #[must_use]
    pub fn resource(self, category: Category) -> Self {
        self.category_of(CategoryKind::Resource, category)
    }

    #[must_use]
    pub fn action(self, category: Category) -> Self {
        self.category_of(CategoryKind::Action, category)
    }

    #[must_use]
    pub fn environment(self, category: Category) -> Self {
        self.category_of(CategoryKind::Environment, category)
    }

    /// Add an instance of a well-known category.
    #[must_use]
    pub fn category_of(mut self, kind: CategoryKind, category: Category) -> Self {
        let target = match kind {
            CategoryKind::AccessSubject => &mut self.request.access_subject,
            CategoryKind::Resource => &mut self.request.resource,
            CategoryKind::Action => &mut self.request.action,
            CategoryKind::Environment => &mut self.request.environment,
        };
        target.push(category);
        self
    }

    /// Add a custom category. It must carry a `CategoryId`.
    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.request.custom.push(category);
        self
    }

    #[must_use]
    pub fn multi_requests(mut self, multi_requests: MultiRequests) -> Self {
        self.request.multi_requests = Some(multi_requests);
        self
    }

    /// Ask the PDP to return the identifiers of applicable policies.
    #[must_use]
    pub fn return_policy_id_list(mut self, enabled: bool) -> Self {
        self.request.return_policy_id_list = enabled;
        self
    }

    #[must_use]
    pub fn combined_decision(mut self, enabled: bool) -> Self {
        self.request.combined_decision = enabled;
        self
    }

    /// Validate and produce the request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestBuildError`] when an attribute has an empty id or
    /// value, a custom category lacks its `CategoryId`, or a request
    /// reference is empty or points at an unknown category `Id`.
    pub fn build(self) -> Result<Request, RequestBuildError> {
        let request = self.request;

        for kind in CategoryKind::ALL {
            for category in request.categories(kind) {
                validate_attributes(kind.shorthand(), &category.attributes)?;
            }
        }

        for category in &request.custom {
            let category_id = category
                .category_id
                .as_deref()
                .filter(|id| !id.trim().is_empty())
                .ok_or(RequestBuildError::MissingCategoryId)?;
            validate_attributes(category_id, &category.attributes)?;
        }

        if let Some(multi) = &request.multi_requests {
            let known: HashSet<&str> = request
                .all_categories()
                .filter_map(|c| c.id.as_deref())
                .collect();

            for reference in &multi.request_references {
                if reference.reference_ids.is_empty() {
                    return Err(RequestBuildError::EmptyReference);
                }
                if let Some(unknown) = reference
                    .reference_ids
                    .iter()
                    .find(|id| !known.contains(id.as_str()))
                {
                    return Err(RequestBuildError::UnknownReference(unknown.clone()));
                }
            }
        }

        Ok(request)
    }
}

fn validate_attributes(category: &str, attributes: &[Attribute]) -> Result<(), RequestBuildError> {
    for attribute in attributes {
        if attribute.attribute_id.trim().is_empty() {
            return Err(RequestBuildError::EmptyAttributeId {
                category: category.to_owned(),
            });
        }
        if is_empty_value(&attribute.value) {
            return Err(RequestBuildError::EmptyAttributeValue {
                attribute_id: attribute.attribute_id.clone(),
            });
        }
    }
    Ok(())
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty() || items.iter().any(is_empty_value),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => false,
    }
}
