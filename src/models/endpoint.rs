//! Lite-server endpoint descriptors

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Serialize, Serializer};
use std::fmt;

/// Ed25519 public key identifying a lite-server
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub const LEN: usize = 32;

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Decode a base64 key as found in TON global configs
    pub fn from_base64(encoded: &str) -> std::result::Result<Self, String> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| format!("invalid base64: {}", e))?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| format!("expected {} bytes, got {}", Self::LEN, bytes.len()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base64())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

/// One lite-server: where to connect and which key to expect
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EndpointDescriptor {
    pub host: String,
    pub port: u16,
    pub public_key: PublicKey,
}

impl EndpointDescriptor {
    pub fn new<H: Into<String>>(host: H, port: u16, public_key: PublicKey) -> Self {
        Self {
            host: host.into(),
            port,
            public_key,
        }
    }

    /// `host:port`, bracketing IPv6 literals
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_base64_round_trip() {
        let key = PublicKey::from_bytes([7u8; 32]);
        let decoded = PublicKey::from_base64(&key.to_base64()).unwrap();
        assert_eq!(key, decoded);
    }

    #[test]
    fn test_public_key_rejects_wrong_length() {
        let err = PublicKey::from_base64("AAAA").unwrap_err();
        assert!(err.contains("expected 32 bytes, got 3"));
    }

    #[test]
    fn test_public_key_rejects_garbage() {
        assert!(PublicKey::from_base64("not base64!").is_err());
    }

    #[test]
    fn test_address_formatting() {
        let key = PublicKey::from_bytes([0u8; 32]);
        assert_eq!(EndpointDescriptor::new("5.9.10.47", 19949, key).address(), "5.9.10.47:19949");
        assert_eq!(EndpointDescriptor::new("::1", 3000, key).address(), "[::1]:3000");
    }
}
