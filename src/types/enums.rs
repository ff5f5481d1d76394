// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Ledger Enums.

use serde::{Deserialize, Serialize};

/// Four-bit kind of each 32-byte field inside a raw block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FieldType {
    Nonce = 0x0,
    Head = 0x1,
    In = 0x2,
    Out = 0x3,
    SignIn = 0x4,
    SignOut = 0x5,
    PublicKey0 = 0x6,
    PublicKey1 = 0x7,
    HeadTest = 0x8,
    Remark = 0x9,
    Reserve1 = 0xA,
    Reserve2 = 0xB,
    InputAccount = 0xC,
    OutputAccount = 0xD,
    Coinbase = 0xE,
    /// Balance carried over a snapshot cut-over.
    Snapshot = 0xF,
}

impl FieldType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x0 => Some(FieldType::Nonce),
            0x1 => Some(FieldType::Head),
            0x2 => Some(FieldType::In),
            0x3 => Some(FieldType::Out),
            0x4 => Some(FieldType::SignIn),
            0x5 => Some(FieldType::SignOut),
            0x6 => Some(FieldType::PublicKey0),
            0x7 => Some(FieldType::PublicKey1),
            0x8 => Some(FieldType::HeadTest),
            0x9 => Some(FieldType::Remark),
            0xA => Some(FieldType::Reserve1),
            0xB => Some(FieldType::Reserve2),
            0xC => Some(FieldType::InputAccount),
            0xD => Some(FieldType::OutputAccount),
            0xE => Some(FieldType::Coinbase),
            0xF => Some(FieldType::Snapshot),
            _ => None,
        }
    }

    /// Addressing mode a transfer field of this kind is written with, if it is a transfer.
    pub fn transfer_mode(self) -> Option<AddressingMode> {
        match self {
            FieldType::In | FieldType::Out => Some(AddressingMode::BlockHash),
            FieldType::InputAccount | FieldType::OutputAccount | FieldType::Coinbase => Some(AddressingMode::Account),
            _ => None,
        }
    }
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Nonce
    }
}

/// How bytes [8,32) of a field are interpreted. Never stored inside the field itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AddressingMode {
    /// Legacy: 24-byte block reference.
    BlockHash = 0,
    /// 20-byte hashed public key, 4 bytes of zero padding.
    Account = 1,
}

impl AddressingMode {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(AddressingMode::BlockHash),
            1 => Some(AddressingMode::Account),
            _ => None,
        }
    }
}

/// What the embedded snapshot payload of a block record holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SnapshotKind {
    /// Compressed secp256k1 public key of the owner.
    PublicKey = 0,
    /// Raw historical block bytes carrying the output signature.
    BlockData = 1,
}
