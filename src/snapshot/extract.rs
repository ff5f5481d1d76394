// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Live block index -> snapshot store.

use tracing::{debug, error, info, warn};

use crate::codec;
use crate::config::SnapshotConfig;
use crate::error::{Result, SnapshotError};
use crate::snapshot::scan::{BlockInfoScan, RecordLayout, ScanItem};
use crate::store::keys::SNAPSHOT_PRESEED;
use crate::store::KvStore;
use crate::types::{BlockRecord, SnapshotInfo, SnapshotStats};

/// Outcome of one extraction pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Block-info entries visited, decodable or not.
    pub scanned: u64,
    pub written: u64,
    /// Zero-amount entries without a payload, left unwritten.
    pub skipped_zero: u64,
    /// Entries whose stored bytes failed to decode.
    pub corrupt: u64,
    /// Non-zero entries whose raw block was absent from the content store.
    pub missing_content: u64,
    /// Entries the codec failed to re-encode.
    pub unwritable: u64,
    pub height: u64,
    pub next_time: u64,
    pub pre_seed_copied: bool,
    pub stats: SnapshotStats,
}

pub struct SnapshotExtractor<'a, I, B, S> {
    index: &'a I,
    blocks: &'a B,
    snapshot: &'a mut S,
    layout: RecordLayout,
}

impl<'a, I: KvStore, B: KvStore, S: KvStore> SnapshotExtractor<'a, I, B, S> {
    /// `blocks` maps a block's low hash to its raw 512-byte content.
    pub fn new(index: &'a I, blocks: &'a B, snapshot: &'a mut S, config: &SnapshotConfig) -> Self {
        Self {
            index,
            blocks,
            snapshot,
            layout: RecordLayout::from_legacy_flag(config.legacy_layout),
        }
    }

    pub fn run(mut self) -> Result<ExtractReport> {
        let mut report = ExtractReport::default();

        for item in BlockInfoScan::new(self.index, self.layout)? {
            report.scanned += 1;
            let (key, hashlow, mut record) = match item? {
                ScanItem::Decoded { key, hashlow, record } => (key, hashlow, record),
                ScanItem::Skipped { key, value, error } => {
                    report.corrupt += 1;
                    error!(
                        "Skipping undecodable block info {}: {} (value {})",
                        hex::encode(&key),
                        error,
                        hex::encode(&value)
                    );
                    continue;
                }
            };

            if record.height >= report.height {
                report.height = record.height;
                report.next_time = record.timestamp;
            }

            if record.has_snapshot_payload() {
                record.mark_snapshot();
            } else if record.amount != 0 {
                match self.blocks.get(&hashlow)? {
                    Some(raw) => record.snapshot_info = Some(SnapshotInfo::block_data(raw)),
                    None => {
                        report.missing_content += 1;
                        warn!("No raw block for {}, balance kept without ownership proof", hex::encode(hashlow));
                        record.snapshot_info = None;
                    }
                }
                record.mark_snapshot();
            } else {
                // Leaves whatever the snapshot store already holds for this key.
                report.skipped_zero += 1;
                debug!("Zero balance without payload, not rewritten: {}", hex::encode(hashlow));
                continue;
            }

            if self.write(&key, &record)? {
                report.written += 1;
                accumulate(&mut report.stats, &record)?;
            } else {
                report.unwritable += 1;
            }
        }

        if let Some(pre_seed) = self.index.get(&[SNAPSHOT_PRESEED])? {
            self.snapshot.put(&[SNAPSHOT_PRESEED], &pre_seed)?;
            report.pre_seed_copied = true;
        }

        info!(
            "Snapshot extracted: {} scanned, {} written, {} corrupt, height {}",
            report.scanned, report.written, report.corrupt, report.height
        );
        Ok(report)
    }

    /// Returns false when the record could not be encoded.
    fn write(&mut self, key: &[u8], record: &BlockRecord) -> Result<bool> {
        match codec::serialize(record) {
            Ok(bytes) => {
                self.snapshot.put(key, &bytes)?;
                Ok(true)
            }
            Err(e) => {
                error!("Cannot encode block info {}: {}", hex::encode(key), e);
                Ok(false)
            }
        }
    }
}

fn accumulate(stats: &mut SnapshotStats, record: &BlockRecord) -> Result<()> {
    stats.nblocks += 1;
    if record.flags.is_main() {
        stats.nmain += 1;
    }
    stats.max_difficulty = stats.max_difficulty.max(record.difficulty);
    stats.total_amount = stats
        .total_amount
        .checked_add(record.amount)
        .ok_or(SnapshotError::BalanceOverflow("snapshot stats"))?;
    Ok(())
}
