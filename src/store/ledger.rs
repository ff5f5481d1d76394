// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Destination ledger stores fed by reconciliation.
//!
//! # Block store layout
//! ```text
//! [HASH_BLOCK_INFO][hashlow]            -> codec BlockRecord
//! [OURS_BLOCK_INFO][index u32 BE][hash] -> empty
//! [TX_HISTORY][hash][seq u64 BE]        -> TxHistory
//! [SNAPSHOT_PRESEED]                    -> opaque bytes
//! [SETTING_STATS] / [SETTING_TOP_STATUS] -> codec records
//! ```
//!
//! # Address store layout
//! ```text
//! [ADDRESS][account id] -> balance, u64 LE
//! [ADDRESS_SIZE]        -> forwarded verbatim
//! [AMOUNT_SUM]          -> codec u64
//! ```

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use crate::codec;
use crate::error::{CodecError, Result};
use crate::store::keys::{self, address};
use crate::store::KvStore;
use crate::types::{AccountId, BlockRecord, FieldType, Hash256, SnapshotStats, TopStatus};

pub trait BlockSink {
    fn save_block_info(&mut self, record: &BlockRecord) -> Result<()>;
    fn save_our_block(&mut self, key_index: u32, hash: &Hash256) -> Result<()>;
    fn save_tx_history(&mut self, entry: &TxHistory) -> Result<()>;
    fn save_pre_seed(&mut self, pre_seed: &[u8]) -> Result<()>;
}

pub trait AddressSink {
    fn save_address(&mut self, id: &AccountId, balance: &[u8]) -> Result<()>;
    fn save_address_size(&mut self, value: &[u8]) -> Result<()>;
    fn save_amount_sum(&mut self, value: &[u8]) -> Result<()>;
    /// Global sum last stored with `save_amount_sum`, zero when unset.
    fn get_all_balance(&self) -> Result<u64>;
}

/// One transaction history row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxHistory {
    pub from: Hash256,
    pub to: Hash256,
    pub field_type: FieldType,
    pub amount: u64,
    pub timestamp: u64,
    pub fee: u64,
    pub remark: Vec<u8>,
}

impl TxHistory {
    /// A snapshot transfer from `hash` to itself.
    pub fn snapshot(hash: Hash256, amount: u64, timestamp: u64, remark: &[u8]) -> Self {
        Self {
            from: hash,
            to: hash,
            field_type: FieldType::Snapshot,
            amount,
            timestamp,
            fee: 0,
            remark: remark.to_vec(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 + 32 + 1 + 8 * 3 + 4 + self.remark.len());
        buf.extend_from_slice(&self.from);
        buf.extend_from_slice(&self.to);
        buf.push(self.field_type as u8);
        buf.extend_from_slice(&self.amount.to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(&self.fee.to_le_bytes());
        buf.extend_from_slice(&(self.remark.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.remark);
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, CodecError> {
        let truncated = |e: std::io::Error| CodecError::Deserialization(format!("tx history: {}", e));
        let mut cursor = Cursor::new(bytes);

        let mut from = [0u8; 32];
        let mut to = [0u8; 32];
        cursor.read_exact(&mut from).map_err(truncated)?;
        cursor.read_exact(&mut to).map_err(truncated)?;
        let tag = cursor.read_u8().map_err(truncated)?;
        let field_type = FieldType::from_u8(tag)
            .ok_or_else(|| CodecError::Deserialization(format!("tx history: unknown field type {}", tag)))?;
        let amount = cursor.read_u64::<LittleEndian>().map_err(truncated)?;
        let timestamp = cursor.read_u64::<LittleEndian>().map_err(truncated)?;
        let fee = cursor.read_u64::<LittleEndian>().map_err(truncated)?;
        let remark_len = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
        let mut remark = vec![0u8; remark_len];
        cursor.read_exact(&mut remark).map_err(truncated)?;

        if cursor.position() as usize != bytes.len() {
            return Err(CodecError::Deserialization("tx history: trailing bytes".into()));
        }

        Ok(Self {
            from,
            to,
            field_type,
            amount,
            timestamp,
            fee,
            remark,
        })
    }
}

fn prefix_scan<S: KvStore>(store: &S, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
    let mut out = Vec::new();
    for item in store.iter_from(prefix)? {
        let (key, value) = item?;
        if !key.starts_with(prefix) {
            break;
        }
        out.push((key, value));
    }
    Ok(out)
}

pub struct LedgerBlockStore<S> {
    store: S,
}

impl<S: KvStore> LedgerBlockStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn block_info(&self, hashlow: &Hash256) -> Result<Option<BlockRecord>> {
        match self.store.get(&keys::block_info_key(hashlow))? {
            Some(bytes) => Ok(Some(codec::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Ownership mappings in key-index order.
    pub fn our_blocks(&self) -> Result<Vec<(u32, Hash256)>> {
        let rows = prefix_scan(&self.store, &[keys::OURS_BLOCK_INFO])?;
        Ok(rows
            .into_iter()
            .filter(|(key, _)| key.len() == 1 + 4 + 32)
            .map(|(key, _)| {
                let index = u32::from_be_bytes([key[1], key[2], key[3], key[4]]);
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&key[5..]);
                (index, hash)
            })
            .collect())
    }

    pub fn tx_history(&self, hash: &Hash256) -> Result<Vec<TxHistory>> {
        let rows = prefix_scan(&self.store, &tx_prefix(hash))?;
        let mut out = Vec::with_capacity(rows.len());
        for (_, value) in rows {
            out.push(TxHistory::from_bytes(&value)?);
        }
        Ok(out)
    }

    pub fn tx_history_len(&self) -> Result<usize> {
        Ok(prefix_scan(&self.store, &[keys::TX_HISTORY])?.len())
    }

    pub fn pre_seed(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.store.get(&[keys::SNAPSHOT_PRESEED])?)
    }

    pub fn save_stats(&mut self, stats: &SnapshotStats) -> Result<()> {
        let bytes = codec::serialize(stats)?;
        self.store.put(&[keys::SETTING_STATS], &bytes)?;
        Ok(())
    }

    pub fn stats(&self) -> Result<Option<SnapshotStats>> {
        match self.store.get(&[keys::SETTING_STATS])? {
            Some(bytes) => Ok(Some(codec::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn save_top_status(&mut self, status: &TopStatus) -> Result<()> {
        let bytes = codec::serialize(status)?;
        self.store.put(&[keys::SETTING_TOP_STATUS], &bytes)?;
        Ok(())
    }

    pub fn top_status(&self) -> Result<Option<TopStatus>> {
        match self.store.get(&[keys::SETTING_TOP_STATUS])? {
            Some(bytes) => Ok(Some(codec::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }
}

fn tx_prefix(hash: &Hash256) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(1 + 32);
    prefix.push(keys::TX_HISTORY);
    prefix.extend_from_slice(hash);
    prefix
}

impl<S: KvStore> BlockSink for LedgerBlockStore<S> {
    fn save_block_info(&mut self, record: &BlockRecord) -> Result<()> {
        let bytes = codec::serialize(record)?;
        self.store.put(&keys::block_info_key(&record.hashlow), &bytes)?;
        Ok(())
    }

    fn save_our_block(&mut self, key_index: u32, hash: &Hash256) -> Result<()> {
        let mut key = Vec::with_capacity(1 + 4 + 32);
        key.push(keys::OURS_BLOCK_INFO);
        key.extend_from_slice(&key_index.to_be_bytes());
        key.extend_from_slice(hash);
        self.store.put(&key, &[])?;
        Ok(())
    }

    fn save_tx_history(&mut self, entry: &TxHistory) -> Result<()> {
        let mut key = tx_prefix(&entry.from);
        let seq = prefix_scan(&self.store, &key)?.len() as u64;
        key.extend_from_slice(&seq.to_be_bytes());
        self.store.put(&key, &entry.to_bytes())?;
        Ok(())
    }

    fn save_pre_seed(&mut self, pre_seed: &[u8]) -> Result<()> {
        self.store.put(&[keys::SNAPSHOT_PRESEED], pre_seed)?;
        Ok(())
    }
}

pub struct LedgerAddressStore<S> {
    store: S,
}

impl<S: KvStore> LedgerAddressStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn balance(&self, id: &AccountId) -> Result<Option<u64>> {
        match self.store.get(&address_key(id))? {
            Some(bytes) => {
                let mut cursor = Cursor::new(&bytes);
                let balance = cursor
                    .read_u64::<LittleEndian>()
                    .map_err(|e| CodecError::Deserialization(format!("balance: {}", e)))?;
                Ok(Some(balance))
            }
            None => Ok(None),
        }
    }

    pub fn address_size(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.store.get(&[address::ADDRESS_SIZE])?)
    }
}

fn address_key(id: &AccountId) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + id.len());
    key.push(address::ADDRESS);
    key.extend_from_slice(id);
    key
}

impl<S: KvStore> AddressSink for LedgerAddressStore<S> {
    fn save_address(&mut self, id: &AccountId, balance: &[u8]) -> Result<()> {
        self.store.put(&address_key(id), balance)?;
        Ok(())
    }

    fn save_address_size(&mut self, value: &[u8]) -> Result<()> {
        self.store.put(&[address::ADDRESS_SIZE], value)?;
        Ok(())
    }

    fn save_amount_sum(&mut self, value: &[u8]) -> Result<()> {
        self.store.put(&[address::AMOUNT_SUM], value)?;
        Ok(())
    }

    fn get_all_balance(&self) -> Result<u64> {
        match self.store.get(&[address::AMOUNT_SUM])? {
            Some(bytes) => Ok(codec::deserialize::<u64>(&bytes)?),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    #[test]
    fn test_tx_history_sequence_per_hash() {
        let mut blocks = LedgerBlockStore::new(MemStore::new());
        let hash = [3u8; 32];
        blocks.save_tx_history(&TxHistory::snapshot(hash, 10, 1, b"a")).unwrap();
        blocks.save_tx_history(&TxHistory::snapshot(hash, 20, 2, b"b")).unwrap();
        blocks.save_tx_history(&TxHistory::snapshot([4u8; 32], 30, 3, b"")).unwrap();

        let rows = blocks.tx_history(&hash).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, 10);
        assert_eq!(rows[1].remark, b"b".to_vec());
        assert_eq!(blocks.tx_history_len().unwrap(), 3);
    }

    #[test]
    fn test_tx_history_rejects_truncated_row() {
        let bytes = TxHistory::snapshot([1u8; 32], 5, 6, b"remark").to_bytes();
        assert!(TxHistory::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn test_all_balance_defaults_to_zero() {
        let mut addresses = LedgerAddressStore::new(MemStore::new());
        assert_eq!(addresses.get_all_balance().unwrap(), 0);

        addresses.save_amount_sum(&codec::serialize(&77u64).unwrap()).unwrap();
        assert_eq!(addresses.get_all_balance().unwrap(), 77);
    }
}
