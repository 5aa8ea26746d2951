//! TL serialization of the handful of ADNL and lite-server messages used here
//!
//! Integers are little-endian, byte strings carry a 1-byte (or `0xfe` plus
//! 3-byte) length prefix and are padded to a multiple of four bytes.

use super::{AdnlError, AdnlResult};
use crate::models::LiteServerVersion;

pub const TCP_PING: u32 = 0x4d082b9a;
pub const TCP_PONG: u32 = 0xdc69fb03;
pub const ADNL_MESSAGE_QUERY: u32 = 0xb48bf97a;
pub const ADNL_MESSAGE_ANSWER: u32 = 0x0fac8416;

pub const LITE_QUERY: u32 = 0x798c06df;
pub const LITE_ERROR: u32 = 0xbba9e148;
pub const GET_MASTERCHAIN_INFO: u32 = 0x2ee6b589;
pub const MASTERCHAIN_INFO: u32 = 0x85832881;
pub const GET_TIME: u32 = 0x16ad5a34;
pub const CURRENT_TIME: u32 = 0xe953000d;
pub const GET_VERSION: u32 = 0x232b940b;
pub const VERSION: u32 = 0x5a0491e5;
pub const LOOKUP_BLOCK: u32 = 0xfac8f71e;

/// Masterchain workchain id
pub const MASTERCHAIN: i32 = -1;
/// Shard prefix covering the whole workchain
pub const SHARD_ALL: i64 = i64::MIN;

/// `lookupBlock` mode bit selecting the utime field
const LOOKUP_BY_UTIME: u32 = 4;

#[derive(Debug, Default)]
pub struct TlWriter {
    buf: Vec<u8>,
}

impl TlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i64(&mut self, value: i64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn int256(&mut self, value: &[u8; 32]) -> &mut Self {
        self.buf.extend_from_slice(value);
        self
    }

    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        let header = if data.len() <= 253 {
            self.buf.push(data.len() as u8);
            1
        } else {
            self.buf.push(0xfe);
            self.buf.extend_from_slice(&(data.len() as u32).to_le_bytes()[..3]);
            4
        };
        self.buf.extend_from_slice(data);

        let padding = (4 - (header + data.len()) % 4) % 4;
        self.buf.extend(std::iter::repeat(0u8).take(padding));
        self
    }

    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

#[derive(Debug)]
pub struct TlReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> TlReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> AdnlResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| AdnlError::tl(format!("need {} bytes at offset {}", len, self.pos)))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> AdnlResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u32(&mut self) -> AdnlResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> AdnlResult<i32> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    pub fn i64(&mut self) -> AdnlResult<i64> {
        Ok(i64::from_le_bytes(self.array()?))
    }

    pub fn int256(&mut self) -> AdnlResult<[u8; 32]> {
        self.array()
    }

    pub fn bytes(&mut self) -> AdnlResult<&'a [u8]> {
        let first = self.take(1)?[0];
        let (header, len) = match first {
            0..=253 => (1, first as usize),
            0xfe => {
                let raw = self.take(3)?;
                (4, u32::from_le_bytes([raw[0], raw[1], raw[2], 0]) as usize)
            }
            _ => return Err(AdnlError::tl("unsupported byte string length prefix")),
        };
        let data = self.take(len)?;
        self.take((4 - (header + len) % 4) % 4)?;
        Ok(data)
    }

    pub fn string(&mut self) -> AdnlResult<String> {
        Ok(String::from_utf8_lossy(self.bytes()?).into_owned())
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

pub fn ping(random_id: i64) -> Vec<u8> {
    TlWriter::new().u32(TCP_PING).i64(random_id).finish()
}

/// Returns the id echoed by `tcp.pong`
pub fn parse_pong(payload: &[u8]) -> AdnlResult<i64> {
    let mut reader = TlReader::new(payload);
    expect_constructor(&mut reader, TCP_PONG)?;
    reader.i64()
}

/// `adnl.message.query` carrying `liteServer.query` around `request`
pub fn adnl_query(query_id: &[u8; 32], request: &LiteRequest) -> Vec<u8> {
    let lite = TlWriter::new().u32(LITE_QUERY).bytes(&request.encode()).finish();
    TlWriter::new().u32(ADNL_MESSAGE_QUERY).int256(query_id).bytes(&lite).finish()
}

/// Split `adnl.message.answer` into query id and answer body
pub fn parse_adnl_answer(payload: &[u8]) -> AdnlResult<([u8; 32], Vec<u8>)> {
    let mut reader = TlReader::new(payload);
    expect_constructor(&mut reader, ADNL_MESSAGE_ANSWER)?;
    let query_id = reader.int256()?;
    let answer = reader.bytes()?.to_vec();
    Ok((query_id, answer))
}

fn expect_constructor(reader: &mut TlReader<'_>, expected: u32) -> AdnlResult<()> {
    match reader.u32()? {
        id if id == expected => Ok(()),
        LITE_ERROR => {
            let code = reader.i32()?;
            let message = reader.string()?;
            Err(AdnlError::LiteServer { code, message })
        }
        other => Err(AdnlError::UnexpectedAnswer(other)),
    }
}

/// Lite-server functions used by the prober
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteRequest {
    GetMasterchainInfo,
    GetTime,
    GetVersion,
    /// Masterchain block generated at or before the given unix time
    LookupBlockByUtime(u32),
}

impl LiteRequest {
    pub fn encode(&self) -> Vec<u8> {
        let mut writer = TlWriter::new();
        match self {
            LiteRequest::GetMasterchainInfo => writer.u32(GET_MASTERCHAIN_INFO),
            LiteRequest::GetTime => writer.u32(GET_TIME),
            LiteRequest::GetVersion => writer.u32(GET_VERSION),
            LiteRequest::LookupBlockByUtime(utime) => writer
                .u32(LOOKUP_BLOCK)
                .u32(LOOKUP_BY_UTIME)
                .i32(MASTERCHAIN)
                .i64(SHARD_ALL)
                .i32(0)
                .i32(*utime as i32),
        };
        writer.finish()
    }

    /// Decode a request body, as a server would
    pub fn decode(data: &[u8]) -> AdnlResult<Self> {
        let mut reader = TlReader::new(data);
        match reader.u32()? {
            GET_MASTERCHAIN_INFO => Ok(LiteRequest::GetMasterchainInfo),
            GET_TIME => Ok(LiteRequest::GetTime),
            GET_VERSION => Ok(LiteRequest::GetVersion),
            LOOKUP_BLOCK => {
                let mode = reader.u32()?;
                let _workchain = reader.i32()?;
                let _shard = reader.i64()?;
                let _seqno = reader.i32()?;
                if mode & 2 != 0 {
                    reader.i64()?;
                }
                if mode & LOOKUP_BY_UTIME == 0 {
                    return Err(AdnlError::tl("lookupBlock without utime"));
                }
                Ok(LiteRequest::LookupBlockByUtime(reader.i32()? as u32))
            }
            other => Err(AdnlError::UnexpectedAnswer(other)),
        }
    }
}

/// `tonNode.blockIdExt`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockIdExt {
    pub workchain: i32,
    pub shard: i64,
    pub seqno: u32,
    pub root_hash: [u8; 32],
    pub file_hash: [u8; 32],
}

impl BlockIdExt {
    fn read(reader: &mut TlReader<'_>) -> AdnlResult<Self> {
        Ok(Self {
            workchain: reader.i32()?,
            shard: reader.i64()?,
            seqno: reader.i32()? as u32,
            root_hash: reader.int256()?,
            file_hash: reader.int256()?,
        })
    }

    pub fn write(&self, writer: &mut TlWriter) {
        writer
            .i32(self.workchain)
            .i64(self.shard)
            .i32(self.seqno as i32)
            .int256(&self.root_hash)
            .int256(&self.file_hash);
    }
}

/// The `last` block of `liteServer.masterchainInfo`
pub fn parse_masterchain_info(answer: &[u8]) -> AdnlResult<BlockIdExt> {
    let mut reader = TlReader::new(answer);
    expect_constructor(&mut reader, MASTERCHAIN_INFO)?;
    BlockIdExt::read(&mut reader)
}

pub fn parse_current_time(answer: &[u8]) -> AdnlResult<u32> {
    let mut reader = TlReader::new(answer);
    expect_constructor(&mut reader, CURRENT_TIME)?;
    Ok(reader.i32()? as u32)
}

pub fn parse_version(answer: &[u8]) -> AdnlResult<LiteServerVersion> {
    let mut reader = TlReader::new(answer);
    expect_constructor(&mut reader, VERSION)?;
    Ok(LiteServerVersion {
        mode: reader.u32()?,
        version: reader.i32()? as u32,
        capabilities: reader.i64()? as u64,
        now: reader.i32()? as u32,
    })
}

/// Any answer other than `liteServer.error` means the block was found
pub fn check_block_header(answer: &[u8]) -> AdnlResult<()> {
    let mut reader = TlReader::new(answer);
    match reader.u32()? {
        LITE_ERROR => {
            let code = reader.i32()?;
            let message = reader.string()?;
            Err(AdnlError::LiteServer { code, message })
        }
        _ => Ok(()),
    }
}

pub fn lite_error(code: i32, message: &str) -> Vec<u8> {
    TlWriter::new().u32(LITE_ERROR).i32(code).bytes(message.as_bytes()).finish()
}
