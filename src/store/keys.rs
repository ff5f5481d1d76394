// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Key layout shared by the index, snapshot and ledger stores.

use crate::types::{AccountId, Hash256, ACCOUNT_ID_LEN};

pub const SETTING_STATS: u8 = 0x10;
pub const TIME_HASH_INFO: u8 = 0x20;
pub const HASH_BLOCK_INFO: u8 = 0x30;
/// Exclusive upper bound of the block-info key range.
pub const SUMS_BLOCK_INFO: u8 = 0x40;
pub const OURS_BLOCK_INFO: u8 = 0x50;
pub const SETTING_TOP_STATUS: u8 = 0x60;
pub const SNAPSHOT_BOOT: u8 = 0x70;
pub const BLOCK_HEIGHT: u8 = 0x80;
pub const SNAPSHOT_PRESEED: u8 = 0x90;
pub const TX_HISTORY: u8 = 0xa0;

/// Address store singletons and prefixes.
pub mod address {
    pub const ADDRESS_SIZE: u8 = 0x10;
    pub const AMOUNT_SUM: u8 = 0x20;
    pub const ADDRESS: u8 = 0x30;
}

pub const BLOCK_INFO_KEY_LEN: usize = 1 + 32;

pub fn block_info_key(hashlow: &Hash256) -> Vec<u8> {
    let mut key = Vec::with_capacity(BLOCK_INFO_KEY_LEN);
    key.push(HASH_BLOCK_INFO);
    key.extend_from_slice(hashlow);
    key
}

/// The low hash of a `[HASH_BLOCK_INFO][32 bytes]` key.
pub fn block_info_hash(key: &[u8]) -> Option<Hash256> {
    if key.len() != BLOCK_INFO_KEY_LEN || key[0] != HASH_BLOCK_INFO {
        return None;
    }
    let mut hashlow = [0u8; 32];
    hashlow.copy_from_slice(&key[1..]);
    Some(hashlow)
}

/// Kinds of keys found in a snapshot store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotKey {
    BlockInfo(Hash256),
    PreSeed,
    AddressSize,
    AmountSum,
    Account(AccountId),
    Unknown,
}

impl SnapshotKey {
    pub fn classify(key: &[u8]) -> Self {
        match key.len() {
            1 => match key[0] {
                SNAPSHOT_PRESEED => SnapshotKey::PreSeed,
                address::ADDRESS_SIZE => SnapshotKey::AddressSize,
                address::AMOUNT_SUM => SnapshotKey::AmountSum,
                _ => SnapshotKey::Unknown,
            },
            ACCOUNT_ID_LEN => {
                let mut id = [0u8; ACCOUNT_ID_LEN];
                id.copy_from_slice(key);
                SnapshotKey::Account(id)
            }
            _ => block_info_hash(key).map_or(SnapshotKey::Unknown, SnapshotKey::BlockInfo),
        }
    }
}
