// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use ledger_snapshot::StoreError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Invalid magic bytes in header")]
    InvalidMagic,
    #[error("Unsupported log version {0}")]
    UnsupportedVersion(u32),
    #[error("Checksum mismatch at offset {offset}: expected {expected}, found {found}")]
    ChecksumMismatch { offset: u64, expected: u64, found: u64 },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

impl From<PersistenceError> for StoreError {
    fn from(e: PersistenceError) -> Self {
        match e {
            PersistenceError::IoError(e) => StoreError::Io(e),
            other => StoreError::Corrupted(other.to_string()),
        }
    }
}
