//! Minimal ADNL-over-TCP client for lite-servers
//!
//! Only what a status probe needs: the encrypted handshake, `tcp.ping` and
//! sequential `liteServer.query` round trips on one connection.

pub mod connection;
pub mod crypto;
pub mod tl;

#[cfg(test)]
pub(crate) mod test_server;

pub use connection::AdnlConnection;

use crate::types::ProbeErrorKind;
use thiserror::Error;

/// Failures of one ADNL session
#[derive(Error, Debug)]
pub enum AdnlError {
    #[error("failed to resolve {host}: {reason}")]
    Resolve { host: String, reason: String },

    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by peer")]
    Closed,

    #[error("invalid server public key")]
    InvalidKey,

    #[error("packet checksum mismatch")]
    Checksum,

    #[error("invalid packet size {0}")]
    PacketSize(u32),

    #[error("malformed TL data: {0}")]
    Tl(String),

    #[error("unexpected answer constructor {0:#010x}")]
    UnexpectedAnswer(u32),

    #[error("lite-server error {code}: {message}")]
    LiteServer { code: i32, message: String },

    #[error("operation timed out")]
    Timeout,
}

impl AdnlError {
    pub fn tl(message: impl Into<String>) -> Self {
        Self::Tl(message.into())
    }

    /// Classification used in probe results
    pub fn kind(&self) -> ProbeErrorKind {
        match self {
            AdnlError::Resolve { .. } | AdnlError::Connect(_) => ProbeErrorKind::ConnectionError,
            AdnlError::Timeout => ProbeErrorKind::Timeout,
            _ => ProbeErrorKind::ProtocolError,
        }
    }
}

pub type AdnlResult<T> = std::result::Result<T, AdnlError>;
