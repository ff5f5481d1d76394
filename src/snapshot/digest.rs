// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::error::Result;
use crate::store::KvStore;

/// BLAKE3 over every entry in key order: `[key_len u64 LE][key][value_len u64 LE][value]`.
///
/// Equal stores give equal digests on any node.
pub fn snapshot_digest<S: KvStore>(store: &S) -> Result<[u8; 32]> {
    let mut hasher = blake3::Hasher::new();
    for item in store.iter_all()? {
        let (key, value) = item?;
        hasher.update(&(key.len() as u64).to_le_bytes());
        hasher.update(&key);
        hasher.update(&(value.len() as u64).to_le_bytes());
        hasher.update(&value);
    }
    Ok(*hasher.finalize().as_bytes())
}
