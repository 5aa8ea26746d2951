//! Data models and structures for the lite-server status tool

pub mod config;
pub mod endpoint;
pub mod status;

// Re-export main model types
pub use config::Config;
pub use endpoint::{EndpointDescriptor, PublicKey};
pub use status::{LiteServerVersion, ProbeResult, ServerDetails, StatusReport};
