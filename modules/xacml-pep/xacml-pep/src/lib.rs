//! XACML PEP client
//!
//! Concrete [`AuthZClient`](xacml_pep_sdk::AuthZClient) that talks to a
//! remote PDP over HTTP(S) using the XACML JSON Profile.
//!
//! ## Configuration
//!
//! ```yaml
//! pdp_url: "https://pdp.example.com/authorization/pdp"
//! username: "pep"
//! password: "secret"
//! tls:
//!   mode: strict
//! ```
//!
//! Every field can be overridden with `XACML_PEP__*` environment variables.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;

pub use config::{PdpClientConfig, TlsConfig, TlsMode};
pub use domain::PdpClient;
pub use infra::HttpPdpTransport;
