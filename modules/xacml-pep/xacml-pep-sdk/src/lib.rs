#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! XACML PEP SDK
//!
//! Public surface of the XACML JSON Profile PEP client:
//!
//! - [`AuthZClient`] - Public API trait for PEPs
//! - [`PdpTransport`] - Transport plugin trait ([`DecisionVariant`] selects the call)
//! - [`Request`], [`Response`], [`SingleResponse`] - JSON Profile models
//! - [`codec`] - Request encoding and shape-tolerant response decoding
//! - [`reconcile`] - Normalization of 1.0/1.1 response shapes
//! - [`AuthZClientError`] - Error taxonomy
//! - [`pep`] - Request builder and deny-biased [`PolicyEnforcer`]
//!
//! ## Usage
//!
//! ```ignore
//! use xacml_pep_sdk::{AuthZClient, models::{Category, Request}};
//!
//! let request = Request::builder()
//!     .access_subject(Category::new().with_attribute("Attributes.access_subject.role", "user"))
//!     .resource(Category::new().with_attribute("bnc.object.objectId", "sbie"))
//!     .action(Category::new().with_attribute("bnc.action.actionId", "access"))
//!     .build()?;
//!
//! let response = client.make_authorization_request(&request).await?;
//! ```

pub mod api;
pub mod codec;
pub mod error;
pub mod models;
pub mod pep;
pub mod reconcile;
pub mod transport_api;

// Re-export main types at crate root
pub use api::AuthZClient;
pub use codec::XACML_JSON_MEDIA_TYPE;
pub use error::AuthZClientError;
pub use models::{
    Attribute, Category, CategoryKind, Decision, DecisionResult, PdpPayload, Request, Response,
    SingleResponse, Status,
};
pub use pep::{EnforcerError, PolicyEnforcer, RequestBuildError, RequestBuilder};
pub use reconcile::reconcile;
pub use transport_api::{DecisionVariant, PdpTransport};
