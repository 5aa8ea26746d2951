//! Probe results and the aggregated status report

use crate::models::endpoint::EndpointDescriptor;
use crate::types::{ArchiveDepth, ProbeErrorKind};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Answer to `liteServer.getVersion`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiteServerVersion {
    pub mode: u32,
    /// Encoded as `major << 8 | minor`
    pub version: u32,
    pub capabilities: u64,
    pub now: u32,
}

impl LiteServerVersion {
    pub fn major(&self) -> u32 {
        self.version >> 8
    }

    pub fn minor(&self) -> u32 {
        self.version & 0xff
    }
}

impl fmt::Display for LiteServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

/// Best-effort facts collected after a successful handshake
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerDetails {
    /// `tcp.ping` round trip
    pub ping: Option<Duration>,
    /// Duration of `liteServer.getMasterchainInfo`
    pub request: Option<Duration>,
    pub version: Option<LiteServerVersion>,
    /// Server unix time from `liteServer.getTime`
    pub time: Option<u32>,
    /// Last known masterchain block seqno
    pub last_seqno: Option<u32>,
    pub archive_depth: Option<ArchiveDepth>,
}

/// Outcome of probing one endpoint. Created once, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub endpoint: EndpointDescriptor,
    pub reachable: bool,
    /// Time to establish the ADNL session
    pub latency: Option<Duration>,
    pub error: Option<ProbeErrorKind>,
    pub details: ServerDetails,
}

impl ProbeResult {
    pub fn reachable(endpoint: EndpointDescriptor, latency: Duration, details: ServerDetails) -> Self {
        Self {
            endpoint,
            reachable: true,
            latency: Some(latency),
            error: None,
            details,
        }
    }

    pub fn failed(endpoint: EndpointDescriptor, kind: ProbeErrorKind) -> Self {
        Self {
            endpoint,
            reachable: false,
            latency: None,
            error: Some(kind),
            details: ServerDetails::default(),
        }
    }

    pub fn latency_ms(&self) -> Option<u128> {
        self.latency.map(|l| l.as_millis())
    }
}

/// Results in resolved-endpoint order, one per endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    results: Vec<ProbeResult>,
    elapsed: Duration,
}

impl StatusReport {
    pub fn new(results: Vec<ProbeResult>, elapsed: Duration) -> Self {
        Self { results, elapsed }
    }

    pub fn results(&self) -> &[ProbeResult] {
        &self.results
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Wall time of the probing phase
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn reachable_count(&self) -> usize {
        self.results.iter().filter(|r| r.reachable).count()
    }

    pub fn unreachable_count(&self) -> usize {
        self.len() - self.reachable_count()
    }
}
