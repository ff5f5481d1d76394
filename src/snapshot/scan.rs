// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Partial-failure tolerant scan over the block-info key range.
//!
//! Each block-info entry comes out as a [`ScanItem`]: either a decoded
//! record or a skip carrying the raw key, value and decode error. Store
//! faults end the scan with an `Err` item.

use crate::codec;
use crate::error::{CodecError, StoreError};
use crate::store::keys::{self, HASH_BLOCK_INFO, SUMS_BLOCK_INFO};
use crate::store::{KvIter, KvStore};
use crate::types::{BlockRecord, Hash256, PreBlockRecord};

/// Stored block record layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordLayout {
    Current,
    Legacy,
}

impl RecordLayout {
    pub fn from_legacy_flag(legacy: bool) -> Self {
        if legacy {
            RecordLayout::Legacy
        } else {
            RecordLayout::Current
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<BlockRecord, CodecError> {
        match self {
            RecordLayout::Current => codec::deserialize::<BlockRecord>(bytes),
            RecordLayout::Legacy => BlockRecord::try_from(codec::deserialize::<PreBlockRecord>(bytes)?),
        }
    }
}

#[derive(Debug)]
pub enum ScanItem {
    Decoded {
        key: Vec<u8>,
        hashlow: Hash256,
        record: BlockRecord,
    },
    Skipped {
        key: Vec<u8>,
        value: Vec<u8>,
        error: CodecError,
    },
}

/// Ascending scan of `[HASH_BLOCK_INFO, SUMS_BLOCK_INFO)`.
///
/// Keys in the range that are not `[HASH_BLOCK_INFO][32 bytes]` (for
/// example account ids that happen to start with a tag byte) are passed
/// over without being reported.
pub struct BlockInfoScan<'a> {
    inner: KvIter<'a>,
    layout: RecordLayout,
    done: bool,
}

impl<'a> BlockInfoScan<'a> {
    pub fn new<S: KvStore>(store: &'a S, layout: RecordLayout) -> Result<Self, StoreError> {
        Ok(Self {
            inner: store.iter_from(&[HASH_BLOCK_INFO])?,
            layout,
            done: false,
        })
    }
}

impl<'a> Iterator for BlockInfoScan<'a> {
    type Item = Result<ScanItem, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let (key, value) = match self.inner.next()? {
                Ok(pair) => pair,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            if key.first().map_or(true, |tag| *tag >= SUMS_BLOCK_INFO) {
                self.done = true;
                break;
            }
            let Some(hashlow) = keys::block_info_hash(&key) else {
                continue;
            };

            return Some(Ok(match self.layout.decode(&value) {
                Ok(record) => ScanItem::Decoded { key, hashlow, record },
                Err(error) => ScanItem::Skipped { key, value, error },
            }));
        }
        None
    }
}
