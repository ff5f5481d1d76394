// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod address;
pub mod enums;
pub mod field;
pub mod flags;
pub mod record;
pub mod stats;

pub const ACCOUNT_ID_LEN: usize = 20;

/// 256-bit block hash word.
pub type Hash256 = [u8; 32];

/// 160-bit hashed public key.
pub type AccountId = [u8; ACCOUNT_ID_LEN];

pub use enums::{AddressingMode, FieldType, SnapshotKind};
pub use field::{Field, FieldHash, TaggedField};
pub use flags::BlockFlags;
pub use record::{BlockRecord, PreBlockRecord, SnapshotInfo};
pub use stats::{SnapshotStats, TopStatus};
