// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration for extraction and reconciliation passes.

use serde::{Deserialize, Serialize};

/// Remark attached to tx history rows replayed from account balances.
pub const SNAPSHOT_REMARK: &str = "snapshot";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Index entries are stored in the pre-snapshot (legacy) record layout.
    pub legacy_layout: bool,
    /// Timestamp stamped on every replayed tx history row.
    pub snapshot_time: u64,
    /// Remark for tx history rows produced from account balances.
    pub tx_remark: String,
    /// Warn when the stored amount sum disagrees with the scanned account balances.
    pub verify_amount_sum: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            legacy_layout: false,
            snapshot_time: 0,
            tx_remark: SNAPSHOT_REMARK.to_string(),
            verify_amount_sum: true,
        }
    }
}

impl SnapshotConfig {
    pub fn with_snapshot_time(mut self, snapshot_time: u64) -> Self {
        self.snapshot_time = snapshot_time;
        self
    }

    pub fn with_legacy_layout(mut self, legacy_layout: bool) -> Self {
        self.legacy_layout = legacy_layout;
        self
    }
}
