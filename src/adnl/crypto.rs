//! Key ids, key agreement and the AES-CTR ciphers of an ADNL TCP session

use super::{AdnlError, AdnlResult};
use crate::models::PublicKey;
use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// AES-256 in big-endian 128-bit counter mode
pub type AesCtr = ctr::Ctr128BE<Aes256>;

/// TL id of `pub.ed25519`
const PUB_ED25519: u32 = 0x4813b4c6;

/// Size of the random session parameters sent in the handshake
pub const SESSION_PARAMS_LEN: usize = 160;

/// key id (32) + ephemeral public key (32) + checksum (32) + encrypted params (160)
pub const HANDSHAKE_LEN: usize = 96 + SESSION_PARAMS_LEN;

pub fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// ADNL short id of an ed25519 public key
pub fn key_id(public_key: &[u8; 32]) -> [u8; 32] {
    sha256(&[&PUB_ED25519.to_le_bytes()[..], &public_key[..]])
}

/// x25519 agreement between an ed25519 secret and a peer's ed25519 public key
pub fn shared_secret(local: &SigningKey, remote: &[u8; 32]) -> AdnlResult<[u8; 32]> {
    let remote = VerifyingKey::from_bytes(remote).map_err(|_| AdnlError::InvalidKey)?;
    Ok(x25519_dalek::x25519(local.to_scalar_bytes(), remote.to_montgomery().to_bytes()))
}

fn cipher(key: &[u8], iv: &[u8]) -> AesCtr {
    let mut key_bytes = [0u8; 32];
    let mut iv_bytes = [0u8; 16];
    key_bytes.copy_from_slice(key);
    iv_bytes.copy_from_slice(iv);
    AesCtr::new(&key_bytes.into(), &iv_bytes.into())
}

/// Cipher protecting the handshake body, derived from the shared secret
/// and the checksum of the session parameters
fn handshake_cipher(shared: &[u8; 32], checksum: &[u8; 32]) -> AesCtr {
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(&shared[..16]);
    key[16..].copy_from_slice(&checksum[16..]);

    let mut iv = [0u8; 16];
    iv[..4].copy_from_slice(&checksum[..4]);
    iv[4..].copy_from_slice(&shared[20..]);

    AesCtr::new(&key.into(), &iv.into())
}

/// The 160 random bytes both stream ciphers are cut from
#[derive(Clone)]
pub struct SessionParams([u8; SESSION_PARAMS_LEN]);

impl SessionParams {
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_PARAMS_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SESSION_PARAMS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SESSION_PARAMS_LEN] {
        &self.0
    }

    /// `(receive, send)` ciphers for the connecting side
    pub fn client_ciphers(&self) -> (AesCtr, AesCtr) {
        let p = &self.0;
        (cipher(&p[0..32], &p[64..80]), cipher(&p[32..64], &p[80..96]))
    }

    /// `(receive, send)` ciphers for the accepting side
    pub fn server_ciphers(&self) -> (AesCtr, AesCtr) {
        let (rx, tx) = self.client_ciphers();
        (tx, rx)
    }
}

/// First packet of a session plus the parameters it carries
pub struct Handshake {
    pub packet: [u8; HANDSHAKE_LEN],
    pub params: SessionParams,
}

/// Build a handshake to `server` signed off an ephemeral ed25519 key
pub fn build_handshake(server: &PublicKey) -> AdnlResult<Handshake> {
    let mut seed = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut seed);
    let ephemeral = SigningKey::from_bytes(&seed);

    build_handshake_with(server, &ephemeral, SessionParams::generate())
}

pub fn build_handshake_with(
    server: &PublicKey,
    ephemeral: &SigningKey,
    params: SessionParams,
) -> AdnlResult<Handshake> {
    let shared = shared_secret(ephemeral, server.as_bytes())?;
    let checksum = sha256(&[&params.as_bytes()[..]]);

    let mut body = *params.as_bytes();
    handshake_cipher(&shared, &checksum).apply_keystream(&mut body);

    let mut packet = [0u8; HANDSHAKE_LEN];
    packet[0..32].copy_from_slice(&key_id(server.as_bytes()));
    packet[32..64].copy_from_slice(&ephemeral.verifying_key().to_bytes());
    packet[64..96].copy_from_slice(&checksum);
    packet[96..].copy_from_slice(&body);

    Ok(Handshake { packet, params })
}

/// Server side: check the handshake is addressed to `server` and recover
/// the session parameters
pub fn accept_handshake(server: &SigningKey, packet: &[u8; HANDSHAKE_LEN]) -> AdnlResult<SessionParams> {
    let own_id = key_id(&server.verifying_key().to_bytes());
    if packet[0..32] != own_id {
        return Err(AdnlError::InvalidKey);
    }

    let mut client_key = [0u8; 32];
    client_key.copy_from_slice(&packet[32..64]);
    let mut checksum = [0u8; 32];
    checksum.copy_from_slice(&packet[64..96]);

    let shared = shared_secret(server, &client_key)?;
    let mut body = [0u8; SESSION_PARAMS_LEN];
    body.copy_from_slice(&packet[96..]);
    handshake_cipher(&shared, &checksum).apply_keystream(&mut body);

    if sha256(&[&body[..]]) != checksum {
        return Err(AdnlError::Checksum);
    }

    Ok(SessionParams::from_bytes(body))
}
