// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Raw block view used to check signature ownership.
//!
//! # Layout
//! A block is 16 fields of 32 bytes. Field 0 is the header:
//! ```text
//! [0,8)   transport header
//! [8,16)  field types, u64 LE, field i in bits 4i..4i+4
//! [16,24) timestamp, u64 LE
//! [24,32) fee, u64 LE
//! ```
//! The output signature is the first pair of consecutive `SignOut` fields
//! (r then s). It signs `sha256d(fields[0..r) ++ compressed public key)`.

use byteorder::{ByteOrder, LittleEndian};
use k256::ecdsa::Signature;

use crate::crypto::hash::sha256d;
use crate::crypto::{KeyPair, OwnerKey};
use crate::error::{Result, SnapshotError};
use crate::types::field::{Field, FIELD_SIZE};
use crate::types::FieldType;

pub const BLOCK_FIELDS: usize = 16;
pub const BLOCK_SIZE: usize = BLOCK_FIELDS * FIELD_SIZE;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawBlock {
    data: Vec<u8>,
}

impl RawBlock {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != BLOCK_SIZE {
            return Err(SnapshotError::InvalidBlock(format!(
                "expected {} bytes, found {}",
                BLOCK_SIZE,
                bytes.len()
            )));
        }
        Ok(Self { data: bytes.to_vec() })
    }

    /// Empty block with the given field types; all non-header fields zeroed.
    pub fn new(types: &[FieldType; BLOCK_FIELDS], timestamp: u64, fee: u64) -> Self {
        let mut data = vec![0u8; BLOCK_SIZE];
        let nibbles = types
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, t)| acc | ((*t as u64) << (4 * i)));
        LittleEndian::write_u64(&mut data[8..16], nibbles);
        LittleEndian::write_u64(&mut data[16..24], timestamp);
        LittleEndian::write_u64(&mut data[24..32], fee);
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn field(&self, index: usize) -> Option<&[u8]> {
        if index >= BLOCK_FIELDS {
            return None;
        }
        Some(&self.data[index * FIELD_SIZE..(index + 1) * FIELD_SIZE])
    }

    pub fn set_field(&mut self, index: usize, bytes: &[u8; FIELD_SIZE]) -> Result<()> {
        if index == 0 || index >= BLOCK_FIELDS {
            return Err(SnapshotError::InvalidBlock(format!("field {} is not writable", index)));
        }
        self.data[index * FIELD_SIZE..(index + 1) * FIELD_SIZE].copy_from_slice(bytes);
        Ok(())
    }

    pub fn field_type(&self, index: usize) -> Option<FieldType> {
        if index >= BLOCK_FIELDS {
            return None;
        }
        let nibbles = LittleEndian::read_u64(&self.data[8..16]);
        FieldType::from_u8(((nibbles >> (4 * index)) & 0xF) as u8)
    }

    pub fn timestamp(&self) -> u64 {
        LittleEndian::read_u64(&self.data[16..24])
    }

    pub fn fee(&self) -> u64 {
        LittleEndian::read_u64(&self.data[24..32])
    }

    /// Index of the r half of the output signature.
    pub fn out_signature_index(&self) -> Option<usize> {
        (1..BLOCK_FIELDS - 1).find(|&i| {
            self.field_type(i) == Some(FieldType::SignOut) && self.field_type(i + 1) == Some(FieldType::SignOut)
        })
    }

    pub fn out_signature(&self) -> Option<Signature> {
        let index = self.out_signature_index()?;
        Signature::from_slice(&self.data[index * FIELD_SIZE..(index + 2) * FIELD_SIZE]).ok()
    }

    /// Double-hashed digest the output signature covers for `public_key`.
    pub fn signing_digest(&self, public_key: &[u8]) -> Option<[u8; 32]> {
        let index = self.out_signature_index()?;
        let mut message = Vec::with_capacity(index * FIELD_SIZE + public_key.len());
        message.extend_from_slice(&self.data[..index * FIELD_SIZE]);
        message.extend_from_slice(public_key);
        Some(sha256d(&message))
    }

    pub fn sign_output(&mut self, key: &KeyPair) -> Result<()> {
        let index = self
            .out_signature_index()
            .ok_or_else(|| SnapshotError::InvalidBlock("no output signature fields".into()))?;
        let digest = self
            .signing_digest(&key.compressed_public_key())
            .ok_or_else(|| SnapshotError::InvalidBlock("no output signature fields".into()))?;

        let signature = key.sign_prehash(&digest)?;
        let rs = signature.to_bytes();
        self.data[index * FIELD_SIZE..(index + 2) * FIELD_SIZE].copy_from_slice(&rs);
        Ok(())
    }

    /// Transfer fields, each decoded with the mode its field type implies.
    pub fn transfers(&self) -> Vec<Field> {
        (1..BLOCK_FIELDS)
            .filter_map(|i| {
                let field_type = self.field_type(i)?;
                let mode = field_type.transfer_mode()?;
                let mut bytes = [0u8; FIELD_SIZE];
                bytes.copy_from_slice(self.field(i)?);
                Some(Field::from_raw(bytes, field_type, mode))
            })
            .collect()
    }
}
