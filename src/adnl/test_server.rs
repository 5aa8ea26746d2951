//! In-process lite-server speaking the server side of the protocol

use super::connection::AdnlConnection;
use super::crypto::{self, HANDSHAKE_LEN};
use super::tl::{self, BlockIdExt, LiteRequest, TlReader, TlWriter};
use super::{AdnlError, AdnlResult};
use crate::models::{EndpointDescriptor, PublicKey};
use ed25519_dalek::SigningKey;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const BLOCK_HEADER: u32 = 0x752d8219;

#[derive(Debug, Clone)]
pub(crate) struct ServerBehaviour {
    pub time: u32,
    pub seqno: u32,
    pub version: u32,
    /// Oldest block utime the server still has
    pub archive_since: u32,
    /// Delay before every reply
    pub delay: Duration,
    /// Answer every lite query with `liteServer.error`
    pub reject_queries: bool,
}

impl Default for ServerBehaviour {
    fn default() -> Self {
        let time = 1_700_000_000;
        Self {
            time,
            seqno: 41_000_000,
            version: 0x101,
            archive_since: time - 10 * 86_400,
            delay: Duration::ZERO,
            reject_queries: false,
        }
    }
}

impl ServerBehaviour {
    fn last_block(&self) -> BlockIdExt {
        BlockIdExt {
            workchain: tl::MASTERCHAIN,
            shard: tl::SHARD_ALL,
            seqno: self.seqno,
            root_hash: [0x11; 32],
            file_hash: [0x22; 32],
        }
    }

    fn respond(&self, request: LiteRequest) -> Vec<u8> {
        if self.reject_queries {
            return tl::lite_error(-400, "queries disabled");
        }

        let mut writer = TlWriter::new();
        match request {
            LiteRequest::GetTime => {
                writer.u32(tl::CURRENT_TIME).i32(self.time as i32);
            }
            LiteRequest::GetVersion => {
                writer.u32(tl::VERSION).u32(0).i32(self.version as i32).i64(7).i32(self.time as i32);
            }
            LiteRequest::GetMasterchainInfo => {
                writer.u32(tl::MASTERCHAIN_INFO);
                self.last_block().write(&mut writer);
                writer.int256(&[0x33; 32]).i32(tl::MASTERCHAIN).int256(&[0x44; 32]).int256(&[0x55; 32]);
            }
            LiteRequest::LookupBlockByUtime(utime) => {
                if utime < self.archive_since {
                    return tl::lite_error(651, "block not found in db");
                }
                writer.u32(BLOCK_HEADER);
                self.last_block().write(&mut writer);
                writer.u32(4).bytes(&[]);
            }
        }
        writer.finish()
    }
}

pub(crate) struct LiteServerDouble {
    addr: SocketAddr,
    key: SigningKey,
    task: JoinHandle<()>,
}

impl LiteServerDouble {
    pub async fn spawn(behaviour: ServerBehaviour) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let key = SigningKey::from_bytes(&[0x5a; 32]);
        let behaviour = Arc::new(behaviour);

        let server_key = key.clone();
        let task = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let key = server_key.clone();
                let behaviour = Arc::clone(&behaviour);
                tokio::spawn(async move {
                    let _ = serve(socket, key, behaviour).await;
                });
            }
        });

        Self { addr, key, task }
    }

    pub fn endpoint(&self) -> EndpointDescriptor {
        EndpointDescriptor::new(
            "127.0.0.1",
            self.addr.port(),
            PublicKey::from_bytes(self.key.verifying_key().to_bytes()),
        )
    }
}

impl Drop for LiteServerDouble {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(mut socket: TcpStream, key: SigningKey, behaviour: Arc<ServerBehaviour>) -> AdnlResult<()> {
    let mut handshake = [0u8; HANDSHAKE_LEN];
    socket.read_exact(&mut handshake).await?;
    let params = crypto::accept_handshake(&key, &handshake)?;

    let (rx, tx) = params.server_ciphers();
    let mut connection = AdnlConnection::from_parts(socket, rx, tx);
    connection.send(&[]).await?;

    loop {
        let payload = connection.recv().await?;
        if !behaviour.delay.is_zero() {
            tokio::time::sleep(behaviour.delay).await;
        }
        let reply = reply_to(&behaviour, &payload)?;
        connection.send(&reply).await?;
    }
}

fn reply_to(behaviour: &ServerBehaviour, payload: &[u8]) -> AdnlResult<Vec<u8>> {
    let mut reader = TlReader::new(payload);
    match reader.u32()? {
        tl::TCP_PING => Ok(TlWriter::new().u32(tl::TCP_PONG).i64(reader.i64()?).finish()),
        tl::ADNL_MESSAGE_QUERY => {
            let query_id = reader.int256()?;
            let mut lite = TlReader::new(reader.bytes()?);
            if lite.u32()? != tl::LITE_QUERY {
                return Err(AdnlError::tl("expected liteServer.query"));
            }
            let request = LiteRequest::decode(lite.bytes()?)?;
            let answer = behaviour.respond(request);
            Ok(TlWriter::new()
                .u32(tl::ADNL_MESSAGE_ANSWER)
                .int256(&query_id)
                .bytes(&answer)
                .finish())
        }
        other => Err(AdnlError::UnexpectedAnswer(other)),
    }
}
