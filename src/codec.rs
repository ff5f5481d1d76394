// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Object codec for stored records.
//!
//! # Format
//! ```text
//! [version: u8][kind: u8][bincode payload]
//! ```
//!
//! Only the kinds in [`RecordKind`] can be encoded; the [`Registered`] bound
//! enforces that at compile time. The codec holds no state, so concurrent
//! callers need no lock.

use bincode::config::Config;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;
use crate::types::{BlockRecord, PreBlockRecord, SnapshotInfo, SnapshotStats, TopStatus};

pub const CODEC_VERSION: u8 = 1;
const HEADER_LEN: usize = 2;
const MAX_RECORD_SIZE: usize = 16 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordKind {
    BlockRecord = 1,
    SnapshotStats = 2,
    TopStatus = 3,
    PreBlockRecord = 4,
    SnapshotInfo = 5,
    Bytes = 6,
    BigInt = 7,
    U64 = 8,
}

impl RecordKind {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(RecordKind::BlockRecord),
            2 => Some(RecordKind::SnapshotStats),
            3 => Some(RecordKind::TopStatus),
            4 => Some(RecordKind::PreBlockRecord),
            5 => Some(RecordKind::SnapshotInfo),
            6 => Some(RecordKind::Bytes),
            7 => Some(RecordKind::BigInt),
            8 => Some(RecordKind::U64),
            _ => None,
        }
    }
}

/// A type in the fixed codec registry.
pub trait Registered: Serialize + DeserializeOwned {
    const KIND: RecordKind;
}

impl Registered for BlockRecord {
    const KIND: RecordKind = RecordKind::BlockRecord;
}

impl Registered for SnapshotStats {
    const KIND: RecordKind = RecordKind::SnapshotStats;
}

impl Registered for TopStatus {
    const KIND: RecordKind = RecordKind::TopStatus;
}

impl Registered for PreBlockRecord {
    const KIND: RecordKind = RecordKind::PreBlockRecord;
}

impl Registered for SnapshotInfo {
    const KIND: RecordKind = RecordKind::SnapshotInfo;
}

impl Registered for Vec<u8> {
    const KIND: RecordKind = RecordKind::Bytes;
}

impl Registered for u128 {
    const KIND: RecordKind = RecordKind::BigInt;
}

impl Registered for u64 {
    const KIND: RecordKind = RecordKind::U64;
}

fn config() -> impl Config {
    bincode::config::standard().with_limit::<MAX_RECORD_SIZE>()
}

pub fn serialize<T: Registered>(value: &T) -> Result<Vec<u8>, CodecError> {
    let payload = bincode::serde::encode_to_vec(value, config())
        .map_err(|e| CodecError::Serialization(e.to_string()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.push(CODEC_VERSION);
    out.push(T::KIND as u8);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Reads the header without decoding the payload.
pub fn peek_kind(bytes: &[u8]) -> Result<RecordKind, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::Deserialization(format!(
            "buffer of {} bytes is shorter than the header",
            bytes.len()
        )));
    }
    if bytes[0] != CODEC_VERSION {
        return Err(CodecError::Deserialization(format!(
            "unsupported codec version {}",
            bytes[0]
        )));
    }
    RecordKind::from_u8(bytes[1])
        .ok_or_else(|| CodecError::Deserialization(format!("unregistered record kind {}", bytes[1])))
}

pub fn deserialize<T: Registered>(bytes: &[u8]) -> Result<T, CodecError> {
    let kind = peek_kind(bytes)?;
    if kind != T::KIND {
        return Err(CodecError::Deserialization(format!(
            "expected {:?}, found {:?}",
            T::KIND,
            kind
        )));
    }

    let payload = &bytes[HEADER_LEN..];
    let (value, read) = bincode::serde::decode_from_slice::<T, _>(payload, config())
        .map_err(|e| CodecError::Deserialization(e.to_string()))?;
    if read != payload.len() {
        return Err(CodecError::Deserialization(format!(
            "{} trailing bytes after {:?}",
            payload.len() - read,
            kind
        )));
    }
    Ok(value)
}
