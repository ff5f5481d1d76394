// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! secp256k1 key pairs and the ownership checks run against them.

pub mod block;
pub mod hash;

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey};

use crate::error::{Result, SnapshotError};
use crate::types::address;
use crate::types::AccountId;

pub const COMPRESSED_KEY_LEN: usize = 33;

/// A candidate owner in a reconciliation key list.
pub trait OwnerKey {
    fn compressed_public_key(&self) -> [u8; COMPRESSED_KEY_LEN];

    /// ECDSA verification over an already double-hashed digest.
    fn verify_prehash(&self, digest: &[u8; 32], signature: &Signature) -> bool;

    fn account_id(&self) -> AccountId {
        address::account_id(&self.compressed_public_key())
    }
}

#[derive(Clone)]
pub struct KeyPair {
    signing: SigningKey,
}

impl KeyPair {
    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self> {
        let signing = SigningKey::from_slice(secret).map_err(|e| SnapshotError::InvalidKey(e.to_string()))?;
        Ok(Self { signing })
    }

    pub fn sign_prehash(&self, digest: &[u8; 32]) -> Result<Signature> {
        let signature: Signature = self
            .signing
            .sign_prehash(digest)
            .map_err(|e| SnapshotError::InvalidKey(e.to_string()))?;
        Ok(signature)
    }
}

impl OwnerKey for KeyPair {
    fn compressed_public_key(&self) -> [u8; COMPRESSED_KEY_LEN] {
        let point = self.signing.verifying_key().to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_KEY_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    fn verify_prehash(&self, digest: &[u8; 32], signature: &Signature) -> bool {
        // k256 only accepts low-S signatures
        let signature = signature.normalize_s().unwrap_or_else(|| signature.clone());
        self.signing.verifying_key().verify_prehash(digest, &signature).is_ok()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.compressed_public_key()))
            .finish()
    }
}
