//! TON lite-server status tool
//!
//! Resolves a set of lite-server endpoints from a network preset or a JSON
//! config document, probes each endpoint over ADNL (handshake, ping and a few
//! lite-server queries) and renders an ordered status table.

pub mod adnl;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod prober;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, EndpointDescriptor, ProbeResult, PublicKey, ServerDetails, StatusReport};
pub use types::{ArchiveDepth, ConfigSource, NetworkPreset, ProbeErrorKind};
pub use config::resolver::ConfigResolver;
pub use prober::{AdnlProber, ProbeOptions, Prober, probe_all};
pub use output::StatusReporter;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Long version string including build metadata when available
pub fn long_version() -> String {
    let mut version = format!("{} {}", PKG_NAME, VERSION);
    if let Some(commit) = option_env!("GIT_COMMIT") {
        version.push_str(&format!(" ({})", commit));
    }
    if let Some(built) = option_env!("BUILD_TIME") {
        version.push_str(&format!(" built {}", built));
    }
    version
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Per-probe timeout, applied to the handshake and to each query
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(1000);
    /// Aggregate deadline for the whole probing phase
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(120);
    /// 0 means one concurrent probe per endpoint
    pub const DEFAULT_CONCURRENCY: usize = 0;
    /// Timeout for fetching a remote config document
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const MAX_PROBE_TIMEOUT_MS: u64 = 60_000;
    pub const MAX_DEADLINE_SECS: u64 = 3_600;
    pub const MAX_CONCURRENCY: usize = 1_024;
    pub const MAX_FETCH_TIMEOUT_SECS: u64 = 300;
}
