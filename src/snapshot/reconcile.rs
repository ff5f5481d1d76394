// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Snapshot store -> destination ledger, with ownership attribution.
//!
//! Ownership is decided by walking the key list in order and stopping at
//! the first key that matches. Two keys that both match the same entry
//! always attribute it to the one with the lower index.
//!
//! Accumulators live in the reconciler and start at zero; build a new
//! [`SnapshotReconciler`] per pass.

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, error, info, warn};

use crate::config::SnapshotConfig;
use crate::crypto::block::RawBlock;
use crate::crypto::OwnerKey;
use crate::error::{Result, SnapshotError};
use crate::snapshot::scan::{BlockInfoScan, RecordLayout, ScanItem};
use crate::store::keys::{SnapshotKey, SNAPSHOT_PRESEED};
use crate::store::{AddressSink, BlockSink, KvStore, TxHistory};
use crate::types::address::account_word;
use crate::types::{AccountId, BlockFlags, BlockRecord, SnapshotKind};

/// Totals and counters of one reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Sum of balances attributed to a supplied key.
    pub our_balance: u64,
    /// Sum of every balance replayed, owned or not.
    pub all_balance: u64,
    /// Global sum read back from the address store after forwarding the
    /// stored amount-sum counter.
    pub address_store_balance: Option<u64>,
    pub owned_blocks: u64,
    pub owned_accounts: u64,
    pub block_entries: u64,
    pub account_entries: u64,
    /// Entries that failed to decode and were left out of every total.
    pub skipped: u64,
    /// Sink writes dropped because the record could not be encoded.
    pub unwritable: u64,
}

pub struct SnapshotReconciler<'k, K> {
    keys: &'k [K],
    snapshot_time: u64,
    tx_remark: Vec<u8>,
    verify_amount_sum: bool,
    report: ReconcileReport,
}

impl<'k, K: OwnerKey> SnapshotReconciler<'k, K> {
    pub fn new(keys: &'k [K], config: &SnapshotConfig) -> Self {
        Self {
            keys,
            snapshot_time: config.snapshot_time,
            tx_remark: config.tx_remark.as_bytes().to_vec(),
            verify_amount_sum: config.verify_amount_sum,
            report: ReconcileReport::default(),
        }
    }

    pub fn our_balance(&self) -> u64 {
        self.report.our_balance
    }

    pub fn all_balance(&self) -> u64 {
        self.report.all_balance
    }

    /// Both passes, then [`finish`](Self::finish).
    pub fn run<S, B, A>(mut self, snapshot: &S, blocks: &mut B, addresses: &mut A) -> Result<ReconcileReport>
    where
        S: KvStore,
        B: BlockSink,
        A: AddressSink,
    {
        self.reconcile_blocks(snapshot, blocks)?;
        self.reconcile_addresses(snapshot, blocks, addresses)?;
        Ok(self.finish())
    }

    /// Pass A: block-info records, then the pre-seed.
    pub fn reconcile_blocks<S: KvStore, B: BlockSink>(&mut self, snapshot: &S, blocks: &mut B) -> Result<()> {
        for item in BlockInfoScan::new(snapshot, RecordLayout::Current)? {
            match item? {
                ScanItem::Decoded { hashlow, record, .. } => self.replay_block(hashlow, record, blocks)?,
                ScanItem::Skipped { key, value, error } => {
                    self.report.skipped += 1;
                    error!(
                        "Skipping undecodable snapshot entry {}: {} (value {})",
                        hex::encode(&key),
                        error,
                        hex::encode(&value)
                    );
                }
            }
        }

        if let Some(pre_seed) = snapshot.get(&[SNAPSHOT_PRESEED])? {
            blocks.save_pre_seed(&pre_seed)?;
        }

        info!(
            "Block pass done: {} entries, {} owned, our balance {}, all balance {}",
            self.report.block_entries, self.report.owned_blocks, self.report.our_balance, self.report.all_balance
        );
        Ok(())
    }

    fn replay_block<B: BlockSink>(&mut self, hashlow: [u8; 32], mut record: BlockRecord, blocks: &mut B) -> Result<()> {
        self.report.block_entries += 1;

        let owner = self.block_owner(&record);
        record.flags.set(BlockFlags::OURS, owner.is_some());
        if owner.is_some() {
            self.report.our_balance = add(self.report.our_balance, record.amount, "our balance")?;
            self.report.owned_blocks += 1;
        }
        self.report.all_balance = add(self.report.all_balance, record.amount, "all balance")?;

        if let Some(index) = owner {
            blocks.save_our_block(index, &hashlow)?;
        }
        let history = TxHistory::snapshot(hashlow, record.amount, self.snapshot_time, record.remark_bytes());
        self.tolerate(blocks.save_tx_history(&history), &hashlow)?;
        self.tolerate(blocks.save_block_info(&record), &hashlow)
    }

    /// Index of the first key proving ownership of the record's payload.
    fn block_owner(&self, record: &BlockRecord) -> Option<u32> {
        let info = record.snapshot_info.as_ref().filter(|info| !info.is_empty())?;
        match info.kind {
            SnapshotKind::PublicKey => self.first_match(|key| key.compressed_public_key()[..] == info.data[..]),
            SnapshotKind::BlockData => {
                let block = match RawBlock::parse(&info.data) {
                    Ok(block) => block,
                    Err(e) => {
                        debug!("Unparseable block payload for {}: {}", hex::encode(record.hashlow), e);
                        return None;
                    }
                };
                let signature = block.out_signature()?;
                self.first_match(|key| {
                    block
                        .signing_digest(&key.compressed_public_key())
                        .is_some_and(|digest| key.verify_prehash(&digest, &signature))
                })
            }
        }
    }

    fn first_match(&self, matches: impl Fn(&K) -> bool) -> Option<u32> {
        for (index, key) in self.keys.iter().enumerate() {
            if matches(key) {
                return Some(index as u32);
            }
        }
        None
    }

    /// Pass B: account balances and the two counter singletons.
    pub fn reconcile_addresses<S, B, A>(&mut self, snapshot: &S, blocks: &mut B, addresses: &mut A) -> Result<()>
    where
        S: KvStore,
        B: BlockSink,
        A: AddressSink,
    {
        let mut account_sum: u64 = 0;

        for item in snapshot.iter_all()? {
            let (key, value) = item?;
            match SnapshotKey::classify(&key) {
                SnapshotKey::AddressSize => addresses.save_address_size(&value)?,
                SnapshotKey::AmountSum => {
                    addresses.save_amount_sum(&value)?;
                    match addresses.get_all_balance() {
                        Ok(sum) => self.report.address_store_balance = Some(sum),
                        Err(SnapshotError::Codec(e)) => warn!("Stored amount sum is unreadable: {}", e),
                        Err(e) => return Err(e),
                    }
                }
                SnapshotKey::Account(id) => {
                    let Some(balance) = read_balance(&value) else {
                        self.report.skipped += 1;
                        error!(
                            "Skipping account {} with malformed balance {}",
                            hex::encode(id),
                            hex::encode(&value)
                        );
                        continue;
                    };
                    account_sum = add(account_sum, balance, "account sum")?;
                    self.replay_account(&id, balance, &value, blocks, addresses)?;
                }
                SnapshotKey::BlockInfo(_) | SnapshotKey::PreSeed | SnapshotKey::Unknown => {}
            }
        }

        if self.verify_amount_sum {
            if let Some(stored) = self.report.address_store_balance {
                if stored != account_sum {
                    warn!("Stored amount sum {} differs from account balances {}", stored, account_sum);
                }
            }
        }

        info!(
            "Address pass done: {} accounts, {} owned, our balance {}, all balance {}",
            self.report.account_entries, self.report.owned_accounts, self.report.our_balance, self.report.all_balance
        );
        Ok(())
    }

    fn replay_account<B: BlockSink, A: AddressSink>(
        &mut self,
        id: &AccountId,
        balance: u64,
        raw_balance: &[u8],
        blocks: &mut B,
        addresses: &mut A,
    ) -> Result<()> {
        self.report.account_entries += 1;
        let word = account_word(id);

        if let Some(index) = self.first_match(|key| key.account_id() == *id) {
            self.report.our_balance = add(self.report.our_balance, balance, "our balance")?;
            self.report.owned_accounts += 1;
            blocks.save_our_block(index, &word)?;
        }
        self.report.all_balance = add(self.report.all_balance, balance, "all balance")?;

        addresses.save_address(id, raw_balance)?;
        let history = TxHistory::snapshot(word, balance, self.snapshot_time, &self.tx_remark);
        self.tolerate(blocks.save_tx_history(&history), &word)
    }

    /// Drops a single sink write on a codec fault; store faults propagate.
    fn tolerate(&mut self, result: Result<()>, hash: &[u8; 32]) -> Result<()> {
        match result {
            Err(SnapshotError::Codec(e)) => {
                self.report.unwritable += 1;
                error!("Dropping write for {}: {}", hex::encode(hash), e);
                Ok(())
            }
            other => other,
        }
    }

    pub fn finish(self) -> ReconcileReport {
        self.report
    }
}

fn add(total: u64, amount: u64, what: &'static str) -> Result<u64> {
    total.checked_add(amount).ok_or(SnapshotError::BalanceOverflow(what))
}

fn read_balance(value: &[u8]) -> Option<u64> {
    (value.len() == 8).then(|| LittleEndian::read_u64(value))
}
