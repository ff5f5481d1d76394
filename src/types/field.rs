// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! 32-byte amount/hash field codec.
//!
//! Layout: `[0,8)` little-endian amount, `[8,32)` hash payload. The payload is
//! either a 24-byte block reference or a 20-byte account id followed by four
//! zero bytes, selected by an [`AddressingMode`] that travels next to the
//! bytes, never inside them. Decoding with the wrong mode does not fail: it
//! silently yields a different hash. [`TaggedField`] carries the mode
//! explicitly and is the form to use whenever a field crosses a store or
//! network boundary.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::fmt;
use thiserror::Error;

use crate::types::address;
use crate::types::enums::{AddressingMode, FieldType};
use crate::types::{AccountId, Hash256, ACCOUNT_ID_LEN};

pub const FIELD_SIZE: usize = 32;
pub const BLOCK_REF_LEN: usize = 24;

const HASH_OFFSET: usize = 8;

/// Low 192 bits of a block hash.
pub type BlockRef = [u8; BLOCK_REF_LEN];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FieldError {
    #[error("Tagged field must be {expected} bytes, found {found}")]
    Length { expected: usize, found: usize },
    #[error("Unknown addressing mode tag {0}")]
    UnknownMode(u8),
    #[error("Account field has non-zero padding")]
    NonZeroPadding,
}

/// Decoded hash payload of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldHash {
    Block(BlockRef),
    Account(AccountId),
}

impl FieldHash {
    pub fn mode(&self) -> AddressingMode {
        match self {
            FieldHash::Block(_) => AddressingMode::BlockHash,
            FieldHash::Account(_) => AddressingMode::Account,
        }
    }

    /// Keeps bytes `[8,32)` of a 256-bit block hash word.
    pub fn from_block_hash(hash: &Hash256) -> Self {
        let mut block_ref = [0u8; BLOCK_REF_LEN];
        block_ref.copy_from_slice(&hash[HASH_OFFSET..]);
        FieldHash::Block(block_ref)
    }

    /// Accepts 24 or 32 bytes in block-hash mode and 20 bytes in account mode.
    pub fn from_slice(bytes: &[u8], mode: AddressingMode) -> Option<Self> {
        match (mode, bytes.len()) {
            (AddressingMode::BlockHash, BLOCK_REF_LEN) => {
                let mut block_ref = [0u8; BLOCK_REF_LEN];
                block_ref.copy_from_slice(bytes);
                Some(FieldHash::Block(block_ref))
            }
            (AddressingMode::BlockHash, FIELD_SIZE) => {
                let mut word = [0u8; FIELD_SIZE];
                word.copy_from_slice(bytes);
                Some(Self::from_block_hash(&word))
            }
            (AddressingMode::Account, ACCOUNT_ID_LEN) => {
                let mut id = [0u8; ACCOUNT_ID_LEN];
                id.copy_from_slice(bytes);
                Some(FieldHash::Account(id))
            }
            _ => None,
        }
    }

    /// 32-byte hash word: eight zero bytes, then the payload, zero padded.
    pub fn to_word(&self) -> Hash256 {
        let mut word = [0u8; FIELD_SIZE];
        match self {
            FieldHash::Block(block_ref) => word[HASH_OFFSET..].copy_from_slice(block_ref),
            FieldHash::Account(id) => word[HASH_OFFSET..HASH_OFFSET + ACCOUNT_ID_LEN].copy_from_slice(id),
        }
        word
    }
}

pub fn encode(amount: u64, hash: &FieldHash) -> [u8; FIELD_SIZE] {
    let mut out = [0u8; FIELD_SIZE];
    LittleEndian::write_u64(&mut out[..HASH_OFFSET], amount);
    match hash {
        FieldHash::Block(block_ref) => out[HASH_OFFSET..].copy_from_slice(block_ref),
        FieldHash::Account(id) => out[HASH_OFFSET..HASH_OFFSET + ACCOUNT_ID_LEN].copy_from_slice(id),
    }
    out
}

/// Splits a field with the given mode. Never fails, even for the wrong mode.
pub fn decode(bytes: &[u8; FIELD_SIZE], mode: AddressingMode) -> (u64, FieldHash) {
    let amount = LittleEndian::read_u64(&bytes[..HASH_OFFSET]);
    let hash = match mode {
        AddressingMode::BlockHash => {
            let mut block_ref = [0u8; BLOCK_REF_LEN];
            block_ref.copy_from_slice(&bytes[HASH_OFFSET..]);
            FieldHash::Block(block_ref)
        }
        AddressingMode::Account => {
            let mut id = [0u8; ACCOUNT_ID_LEN];
            id.copy_from_slice(&bytes[HASH_OFFSET..HASH_OFFSET + ACCOUNT_ID_LEN]);
            FieldHash::Account(id)
        }
    };
    (amount, hash)
}

/// A value-transfer reference with lazily split or lazily packed contents.
///
/// One of `raw` / `parsed` is populated at construction; the other is filled
/// on first access and never changes afterwards.
#[derive(Clone)]
pub struct Field {
    field_type: FieldType,
    mode: AddressingMode,
    raw: OnceCell<[u8; FIELD_SIZE]>,
    parsed: OnceCell<(u64, FieldHash)>,
}

impl Field {
    pub fn from_raw(bytes: [u8; FIELD_SIZE], field_type: FieldType, mode: AddressingMode) -> Self {
        Self {
            field_type,
            mode,
            raw: OnceCell::from(bytes),
            parsed: OnceCell::new(),
        }
    }

    pub fn new(amount: u64, hash: FieldHash, field_type: FieldType) -> Self {
        Self {
            field_type,
            mode: hash.mode(),
            raw: OnceCell::new(),
            parsed: OnceCell::from((amount, hash)),
        }
    }

    /// Zero-amount reference to a block, used for DAG back-links.
    pub fn from_block_hash(hash: &Hash256, field_type: FieldType) -> Self {
        Self::new(0, FieldHash::from_block_hash(hash), field_type)
    }

    pub fn from_account(id: AccountId, amount: u64, field_type: FieldType) -> Self {
        Self::new(amount, FieldHash::Account(id), field_type)
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn mode(&self) -> AddressingMode {
        self.mode
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed.get().is_some()
    }

    fn parts(&self) -> &(u64, FieldHash) {
        self.parsed.get_or_init(|| {
            let raw = self.raw.get().copied().unwrap_or([0u8; FIELD_SIZE]);
            decode(&raw, self.mode)
        })
    }

    pub fn amount(&self) -> u64 {
        self.parts().0
    }

    pub fn hash(&self) -> FieldHash {
        self.parts().1
    }

    pub fn to_bytes(&self) -> [u8; FIELD_SIZE] {
        *self.raw.get_or_init(|| {
            let (amount, hash) = self.parts();
            encode(*amount, hash)
        })
    }

    pub fn tagged(&self) -> TaggedField {
        TaggedField {
            mode: self.mode,
            bytes: self.to_bytes(),
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.field_type == other.field_type && self.mode == other.mode && self.to_bytes() == other.to_bytes()
    }
}

impl Eq for Field {}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("field_type", &self.field_type)
            .field("mode", &self.mode)
            .field("amount", &self.amount())
            .field("hash", &hex::encode(self.hash().to_word()))
            .finish()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hash() {
            FieldHash::Account(id) => write!(f, "Address [{}]", address::to_base58(&id)),
            FieldHash::Block(_) => write!(f, "Block Hash [{}]", hex::encode(self.hash().to_word())),
        }
    }
}

/// Field bytes paired with their addressing mode: `[mode][32 bytes]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedField {
    pub mode: AddressingMode,
    pub bytes: [u8; FIELD_SIZE],
}

impl TaggedField {
    pub const SIZE: usize = 1 + FIELD_SIZE;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = self.mode as u8;
        out[1..].copy_from_slice(&self.bytes);
        out
    }

    /// Strict decode: rejects unknown modes and account fields with dirty padding.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, FieldError> {
        if buf.len() != Self::SIZE {
            return Err(FieldError::Length {
                expected: Self::SIZE,
                found: buf.len(),
            });
        }
        let mode = AddressingMode::from_u8(buf[0]).ok_or(FieldError::UnknownMode(buf[0]))?;
        let mut bytes = [0u8; FIELD_SIZE];
        bytes.copy_from_slice(&buf[1..]);
        if mode == AddressingMode::Account && bytes[HASH_OFFSET + ACCOUNT_ID_LEN..].iter().any(|b| *b != 0) {
            return Err(FieldError::NonZeroPadding);
        }
        Ok(Self { mode, bytes })
    }

    pub fn into_field(self, field_type: FieldType) -> Field {
        Field::from_raw(self.bytes, field_type, self.mode)
    }
}
