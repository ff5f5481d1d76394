// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Block record definitions.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::types::enums::SnapshotKind;
use crate::types::flags::BlockFlags;
use crate::types::Hash256;

/// Embedded ownership evidence: a public key or the raw signed block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub kind: SnapshotKind,
    pub data: Vec<u8>,
}

impl SnapshotInfo {
    pub fn public_key(data: Vec<u8>) -> Self {
        Self {
            kind: SnapshotKind::PublicKey,
            data,
        }
    }

    pub fn block_data(data: Vec<u8>) -> Self {
        Self {
            kind: SnapshotKind::BlockData,
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub hashlow: Hash256,
    pub hash: Hash256,
    pub amount: u64,
    pub fee: u64,
    pub height: u64,
    pub timestamp: u64,
    pub difficulty: u128,
    pub flags: BlockFlags,
    pub block_type: u64,
    pub ref_link: Option<Hash256>,
    pub max_diff_link: Option<Hash256>,
    pub remark: Option<Vec<u8>>,
    pub snapshot: bool,
    pub snapshot_info: Option<SnapshotInfo>,
}

impl BlockRecord {
    /// A payload with no bytes counts as absent.
    pub fn has_snapshot_payload(&self) -> bool {
        self.snapshot_info.as_ref().is_some_and(|info| !info.is_empty())
    }

    /// Strips ownership and marks the record as part of a snapshot.
    pub fn mark_snapshot(&mut self) {
        self.flags.remove(BlockFlags::OURS);
        self.snapshot = true;
    }

    pub fn remark_bytes(&self) -> &[u8] {
        self.remark.as_deref().unwrap_or(&[])
    }
}

/// Block record layout written before snapshots existed.
///
/// Difficulty is kept as minimal big-endian bytes and flags as a raw integer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreBlockRecord {
    pub hashlow: Hash256,
    pub hash: Hash256,
    pub amount: u64,
    pub fee: u64,
    pub height: u64,
    pub timestamp: u64,
    pub difficulty: Vec<u8>,
    pub flags: u32,
    pub block_type: u64,
    pub ref_link: Option<Hash256>,
    pub max_diff_link: Option<Hash256>,
    pub remark: Option<Vec<u8>>,
    pub snapshot: bool,
    pub snapshot_info: Option<SnapshotInfo>,
}

impl PreBlockRecord {
    pub fn from_record(record: &BlockRecord) -> Self {
        let difficulty = record.difficulty.to_be_bytes();
        let first = difficulty.iter().position(|b| *b != 0).unwrap_or(difficulty.len());
        Self {
            hashlow: record.hashlow,
            hash: record.hash,
            amount: record.amount,
            fee: record.fee,
            height: record.height,
            timestamp: record.timestamp,
            difficulty: difficulty[first..].to_vec(),
            flags: record.flags.bits(),
            block_type: record.block_type,
            ref_link: record.ref_link,
            max_diff_link: record.max_diff_link,
            remark: record.remark.clone(),
            snapshot: record.snapshot,
            snapshot_info: record.snapshot_info.clone(),
        }
    }
}

impl TryFrom<PreBlockRecord> for BlockRecord {
    type Error = CodecError;

    fn try_from(pre: PreBlockRecord) -> Result<Self, Self::Error> {
        if pre.difficulty.len() > 16 {
            return Err(CodecError::Deserialization(format!(
                "difficulty of {} bytes exceeds 128 bits",
                pre.difficulty.len()
            )));
        }
        let mut difficulty = [0u8; 16];
        difficulty[16 - pre.difficulty.len()..].copy_from_slice(&pre.difficulty);

        Ok(Self {
            hashlow: pre.hashlow,
            hash: pre.hash,
            amount: pre.amount,
            fee: pre.fee,
            height: pre.height,
            timestamp: pre.timestamp,
            difficulty: u128::from_be_bytes(difficulty),
            flags: BlockFlags::from_bits_retain(pre.flags),
            block_type: pre.block_type,
            ref_link: pre.ref_link,
            max_diff_link: pre.max_diff_link,
            remark: pre.remark,
            snapshot: pre.snapshot,
            snapshot_info: pre.snapshot_info,
        })
    }
}
