//! Network adapters.

pub mod http_transport;
pub mod tls;

pub use http_transport::HttpPdpTransport;
