// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Store interfaces.
//!
//! The ordered key-value engine is external; passes only need ordered
//! iteration from a seek key, point reads and writes.

pub mod keys;
pub mod ledger;
pub mod mem;

use crate::error::StoreError;

pub type KvPair = (Vec<u8>, Vec<u8>);

/// Ascending-key iterator over a store. An `Err` item ends the iteration.
pub type KvIter<'a> = Box<dyn Iterator<Item = Result<KvPair, StoreError>> + 'a>;

pub trait KvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Entries with `key >= start`, ascending.
    fn iter_from(&self, start: &[u8]) -> Result<KvIter<'_>, StoreError>;

    fn iter_all(&self) -> Result<KvIter<'_>, StoreError> {
        self.iter_from(&[])
    }
}

pub use keys::SnapshotKey;
pub use ledger::{AddressSink, BlockSink, LedgerAddressStore, LedgerBlockStore, TxHistory};
pub use mem::MemStore;
