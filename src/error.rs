// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

/// Object codec failures. Serialization errors drop a single write;
/// deserialization errors skip a single entry.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store corrupted: {0}")]
    Corrupted(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("Balance overflow in {0}")]
    BalanceOverflow(&'static str),
    #[error("Invalid block data: {0}")]
    InvalidBlock(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid key material: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, SnapshotError>;
