// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Snapshot extraction and reconciliation.
//!
//! ```text
//! block index --SnapshotExtractor--> snapshot store --SnapshotReconciler--> ledger stores
//! ```

pub mod digest;
pub mod extract;
pub mod reconcile;
pub mod scan;

pub use digest::snapshot_digest;
pub use extract::{ExtractReport, SnapshotExtractor};
pub use reconcile::{ReconcileReport, SnapshotReconciler};
pub use scan::{BlockInfoScan, RecordLayout, ScanItem};
