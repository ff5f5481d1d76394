// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Account address derivation and Base58Check text form.

use crate::crypto::hash::{hash160, sha256d};
use crate::error::{Result, SnapshotError};
use crate::types::{AccountId, Hash256, ACCOUNT_ID_LEN};

const CHECKSUM_LEN: usize = 4;

/// Account id of a compressed public key: RIPEMD-160 of SHA-256.
pub fn account_id(public_key: &[u8]) -> AccountId {
    hash160(public_key)
}

/// Places an account id at offset 8 of a zeroed 32-byte word.
pub fn account_word(id: &AccountId) -> Hash256 {
    let mut word = [0u8; 32];
    word[8..8 + ACCOUNT_ID_LEN].copy_from_slice(id);
    word
}

pub fn to_base58(id: &AccountId) -> String {
    let checksum = sha256d(id);
    let mut payload = Vec::with_capacity(ACCOUNT_ID_LEN + CHECKSUM_LEN);
    payload.extend_from_slice(id);
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    bs58::encode(payload).into_string()
}

pub fn from_base58(text: &str) -> Result<AccountId> {
    let payload = bs58::decode(text)
        .into_vec()
        .map_err(|e| SnapshotError::InvalidAddress(e.to_string()))?;
    if payload.len() != ACCOUNT_ID_LEN + CHECKSUM_LEN {
        return Err(SnapshotError::InvalidAddress(format!(
            "expected {} bytes, found {}",
            ACCOUNT_ID_LEN + CHECKSUM_LEN,
            payload.len()
        )));
    }

    let (body, checksum) = payload.split_at(ACCOUNT_ID_LEN);
    if sha256d(body)[..CHECKSUM_LEN] != *checksum {
        return Err(SnapshotError::InvalidAddress("checksum mismatch".into()));
    }

    let mut id = [0u8; ACCOUNT_ID_LEN];
    id.copy_from_slice(body);
    Ok(id)
}

pub fn check_address(text: &str) -> bool {
    from_base58(text).is_ok()
}
