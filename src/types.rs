//! Type definitions shared across the resolver, prober and reporter

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Named TON network with a built-in endpoint list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkPreset {
    Mainnet,
    Testnet,
}

impl NetworkPreset {
    pub const ALL: [NetworkPreset; 2] = [NetworkPreset::Mainnet, NetworkPreset::Testnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkPreset::Mainnet => "mainnet",
            NetworkPreset::Testnet => "testnet",
        }
    }
}

impl FromStr for NetworkPreset {
    type Err = AppError;

    /// Case-insensitive lookup; anything else is rejected at the boundary
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(NetworkPreset::Mainnet),
            "testnet" => Ok(NetworkPreset::Testnet),
            _ => Err(AppError::invalid_network(s)),
        }
    }
}

impl fmt::Display for NetworkPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the endpoint list of an invocation comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Preset(NetworkPreset),
    LocalPath(String),
    RemoteUrl(String),
}

impl ConfigSource {
    /// Build a source from the `-c` argument, falling back to the preset
    pub fn from_args(network: NetworkPreset, config: Option<&str>) -> Self {
        match config.map(str::trim).filter(|c| !c.is_empty()) {
            Some(value) if is_remote(value) => ConfigSource::RemoteUrl(value.to_string()),
            Some(value) => ConfigSource::LocalPath(value.to_string()),
            None => ConfigSource::Preset(network),
        }
    }

    /// Human-readable description used in logs and the report banner
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::Preset(network) => format!("{} preset", network),
            ConfigSource::LocalPath(path) => format!("file {}", path),
            ConfigSource::RemoteUrl(url) => format!("url {}", url),
        }
    }
}

fn is_remote(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Why a probe did not reach the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeErrorKind {
    /// No handshake completed within the timeout or the aggregate deadline
    Timeout,
    /// Connection refused, reset or host could not be resolved
    ConnectionError,
    /// The peer answered but the ADNL exchange was rejected or malformed
    ProtocolError,
}

impl ProbeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeErrorKind::Timeout => "timeout",
            ProbeErrorKind::ConnectionError => "connection error",
            ProbeErrorKind::ProtocolError => "protocol error",
        }
    }
}

impl fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far back a lite-server can serve masterchain blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveDepth {
    /// Deepest fixed offset that succeeded in the quick check
    AtLeast(String),
    /// Exact search result, in days
    Days(u32),
    /// No lookup succeeded
    Unknown,
}

impl ArchiveDepth {
    pub fn is_unknown(&self) -> bool {
        matches!(self, ArchiveDepth::Unknown)
    }
}

impl fmt::Display for ArchiveDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveDepth::AtLeast(label) => write!(f, "≈ {}", label),
            ArchiveDepth::Days(days) => f.write_str(&format_days(*days)),
            ArchiveDepth::Unknown => f.write_str("(?)"),
        }
    }
}

/// Split a day count into `Ny Nm Nd` using 365-day years and 30-day months
fn format_days(total: u32) -> String {
    let years = total / 365;
    let rem = total % 365;
    let months = rem / 30;
    let days = rem % 30;

    let mut parts = Vec::new();
    if years > 0 {
        parts.push(format!("{}y", years));
    }
    if months > 0 {
        parts.push(format!("{}m", months));
    }
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if parts.is_empty() {
        return "(?)".to_string();
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_lookup_is_case_insensitive() {
        assert_eq!("mainnet".parse::<NetworkPreset>().unwrap(), NetworkPreset::Mainnet);
        assert_eq!("TestNet".parse::<NetworkPreset>().unwrap(), NetworkPreset::Testnet);
        assert_eq!(" MAINNET ".parse::<NetworkPreset>().unwrap(), NetworkPreset::Mainnet);
    }

    #[test]
    fn test_unknown_network_rejected() {
        let err = "devnet".parse::<NetworkPreset>().unwrap_err();
        assert!(matches!(err, AppError::InvalidNetwork(ref name) if name == "devnet"));
    }

    #[test]
    fn test_config_source_from_args() {
        assert_eq!(
            ConfigSource::from_args(NetworkPreset::Testnet, None),
            ConfigSource::Preset(NetworkPreset::Testnet)
        );
        assert_eq!(
            ConfigSource::from_args(NetworkPreset::Mainnet, Some("./global.json")),
            ConfigSource::LocalPath("./global.json".to_string())
        );
        assert_eq!(
            ConfigSource::from_args(NetworkPreset::Mainnet, Some("HTTPS://ton.org/global.config.json")),
            ConfigSource::RemoteUrl("HTTPS://ton.org/global.config.json".to_string())
        );
        assert_eq!(
            ConfigSource::from_args(NetworkPreset::Mainnet, Some("  ")),
            ConfigSource::Preset(NetworkPreset::Mainnet)
        );
    }

    #[test]
    fn test_archive_depth_display() {
        assert_eq!(ArchiveDepth::AtLeast("3m".to_string()).to_string(), "≈ 3m");
        assert_eq!(ArchiveDepth::Days(400).to_string(), "1y 1m 5d");
        assert_eq!(ArchiveDepth::Days(30).to_string(), "1m");
        assert_eq!(ArchiveDepth::Days(0).to_string(), "(?)");
        assert_eq!(ArchiveDepth::Unknown.to_string(), "(?)");
    }
}
