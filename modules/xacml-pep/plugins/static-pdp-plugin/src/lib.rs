#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static PDP Plugin
//!
//! In-process [`PdpTransport`](xacml_pep_sdk::PdpTransport) that answers every
//! request with a configured decision. Useful for development and tests where
//! no PDP is reachable.
//!
//! ## Modes
//!
//! - `permit_all` (default) - every individual decision is `Permit`
//! - `deny_all` - every individual decision is `Deny`
//! - `fixed` - every individual decision is the configured `decision`
//!
//! Single-decision calls get the 1.0 single-object shape; multi-decision calls
//! get one result per individual decision.
//!
//! ## Configuration
//!
//! ```yaml
//! mode: fixed
//! decision: NotApplicable
//! policy_id: "urn:example:policy:static"
//! ```

pub mod config;
pub mod domain;

pub use config::{StaticPdpMode, StaticPdpPluginConfig};
pub use domain::Service as StaticPdpTransport;
