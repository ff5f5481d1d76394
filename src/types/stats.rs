// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Chain statistics records.

use serde::{Deserialize, Serialize};

use crate::types::Hash256;

/// Summary of the records an extraction pass wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub nblocks: u64,
    pub nmain: u64,
    pub max_difficulty: u128,
    pub total_amount: u64,
}

/// Top-of-chain pointer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopStatus {
    pub top: Option<Hash256>,
    pub top_diff: u128,
    pub pre_top: Option<Hash256>,
    pub pre_top_diff: u128,
}
