// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! ledger-snapshot: balance-only snapshots of a block-DAG ledger.
//!
//! A 32-byte amount/hash field codec, a versioned record codec, and the
//! two passes that turn a live block index into a snapshot and replay it
//! into fresh ledger stores with key ownership attached.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod snapshot;
pub mod store;
pub mod telemetry;
pub mod types;

pub use config::SnapshotConfig;
pub use error::{CodecError, Result, SnapshotError, StoreError};
pub use snapshot::{ExtractReport, ReconcileReport, SnapshotExtractor, SnapshotReconciler};

#[cfg(test)]
pub mod tests;
