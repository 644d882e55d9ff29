pub mod client;

pub use client::PdpClient;
