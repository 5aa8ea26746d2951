//! Encrypted, checksummed packet stream over one TCP connection

use super::crypto::{self, AesCtr};
use super::tl::{self, LiteRequest};
use super::{AdnlError, AdnlResult};
use crate::models::{EndpointDescriptor, PublicKey};
use ctr::cipher::StreamCipher;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{lookup_host, TcpStream};

/// nonce (32) + checksum (32)
const PACKET_OVERHEAD: u32 = 64;
/// Largest packet accepted from a peer
const MAX_PACKET_SIZE: u32 = 1 << 24;

/// One ADNL TCP session. Queries are sent one at a time.
pub struct AdnlConnection {
    stream: TcpStream,
    rx: AesCtr,
    tx: AesCtr,
}

impl AdnlConnection {
    /// Resolve, connect and complete the handshake with `endpoint`
    pub async fn connect(endpoint: &EndpointDescriptor) -> AdnlResult<Self> {
        let addrs: Vec<SocketAddr> = lookup_host((endpoint.host.as_str(), endpoint.port))
            .await
            .map_err(|e| AdnlError::Resolve {
                host: endpoint.host.clone(),
                reason: e.to_string(),
            })?
            .collect();

        if addrs.is_empty() {
            return Err(AdnlError::Resolve {
                host: endpoint.host.clone(),
                reason: "no addresses found".to_string(),
            });
        }

        let stream = TcpStream::connect(&addrs[..]).await.map_err(AdnlError::Connect)?;
        let _ = stream.set_nodelay(true);

        Self::handshake(stream, &endpoint.public_key).await
    }

    /// Send the handshake over an established stream and wait for the
    /// server's empty confirmation packet
    pub async fn handshake(mut stream: TcpStream, server: &PublicKey) -> AdnlResult<Self> {
        let handshake = crypto::build_handshake(server)?;
        stream.write_all(&handshake.packet).await?;

        let (rx, tx) = handshake.params.client_ciphers();
        let mut connection = Self::from_parts(stream, rx, tx);
        connection.recv().await?;
        Ok(connection)
    }

    pub(crate) fn from_parts(stream: TcpStream, rx: AesCtr, tx: AesCtr) -> Self {
        Self { stream, rx, tx }
    }

    pub async fn send(&mut self, payload: &[u8]) -> AdnlResult<()> {
        let nonce: [u8; 32] = rand::random();
        let size = PACKET_OVERHEAD + payload.len() as u32;

        let mut packet = Vec::with_capacity(4 + size as usize);
        packet.extend_from_slice(&size.to_le_bytes());
        packet.extend_from_slice(&nonce);
        packet.extend_from_slice(payload);
        packet.extend_from_slice(&crypto::sha256(&[&nonce[..], payload]));

        self.tx.apply_keystream(&mut packet);
        self.stream.write_all(&packet).await?;
        self.stream.flush().await?;
        Ok(())
    }

    pub async fn recv(&mut self) -> AdnlResult<Vec<u8>> {
        let mut size_bytes = [0u8; 4];
        self.read_exact(&mut size_bytes).await?;
        self.rx.apply_keystream(&mut size_bytes);

        let size = u32::from_le_bytes(size_bytes);
        if !(PACKET_OVERHEAD..=MAX_PACKET_SIZE).contains(&size) {
            return Err(AdnlError::PacketSize(size));
        }

        let mut body = vec![0u8; size as usize];
        self.read_exact(&mut body).await?;
        self.rx.apply_keystream(&mut body);

        let (data, checksum) = body.split_at(size as usize - 32);
        if crypto::sha256(&[data]) != checksum {
            return Err(AdnlError::Checksum);
        }

        Ok(data[32..].to_vec())
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> AdnlResult<()> {
        match self.stream.read_exact(buf).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(AdnlError::Closed),
            Err(e) => Err(e.into()),
        }
    }

    /// `tcp.ping` round trip
    pub async fn ping(&mut self) -> AdnlResult<Duration> {
        let id: i64 = rand::random();
        let start = Instant::now();

        self.send(&tl::ping(id)).await?;
        loop {
            let payload = self.recv().await?;
            if tl::parse_pong(&payload)? == id {
                return Ok(start.elapsed());
            }
        }
    }

    /// Send one lite-server request and return the raw answer body
    pub async fn query(&mut self, request: &LiteRequest) -> AdnlResult<Vec<u8>> {
        let query_id: [u8; 32] = rand::random();
        self.send(&tl::adnl_query(&query_id, request)).await?;

        loop {
            let payload = self.recv().await?;
            let (answer_id, answer) = tl::parse_adnl_answer(&payload)?;
            if answer_id == query_id {
                return Ok(answer);
            }
        }
    }

    pub async fn close(mut self) -> AdnlResult<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
