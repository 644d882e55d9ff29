//! PEP (Policy Enforcement Point) helpers.
//!
//! - [`RequestBuilder`] - fluent request assembly with structural validation
//! - [`PolicyEnforcer`] - deny-biased enforcement on top of an [`AuthZClient`](crate::AuthZClient)

pub mod enforcer;
pub mod request_builder;

pub use enforcer::{EnforcerError, PolicyEnforcer};
pub use request_builder::{RequestBuildError, RequestBuilder};
