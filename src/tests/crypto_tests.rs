// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::crypto::block::{RawBlock, BLOCK_SIZE};
use crate::crypto::hash::{hash160, sha256, sha256d};
use crate::crypto::{KeyPair, OwnerKey, COMPRESSED_KEY_LEN};
use crate::tests::fixtures;
use crate::types::field::FieldHash;
use crate::types::{address, AddressingMode, FieldType};

#[test]
fn test_compressed_public_key_shape() {
    let key = fixtures::key(1);
    let public = key.compressed_public_key();
    assert_eq!(public.len(), COMPRESSED_KEY_LEN);
    assert!(public[0] == 0x02 || public[0] == 0x03);
    assert_ne!(public, fixtures::key(2).compressed_public_key());
}

#[test]
fn test_account_id_is_hash160_of_public_key() {
    let key = fixtures::key(3);
    assert_eq!(key.account_id(), hash160(&key.compressed_public_key()));
    assert_eq!(key.account_id(), address::account_id(&key.compressed_public_key()));
}

#[test]
fn test_double_hash() {
    assert_eq!(sha256d(b"abc"), sha256(&sha256(b"abc")));
}

#[test]
fn test_invalid_secret_rejected() {
    assert!(KeyPair::from_secret_bytes(&[0u8; 32]).is_err());
    assert!(KeyPair::from_secret_bytes(&[1u8; 7]).is_err());
}

#[test]
fn test_signed_block_verifies_only_for_signer() {
    let signer = fixtures::key(2);
    let other = fixtures::key(5);
    let block = fixtures::signed_block(&signer);

    assert_eq!(block.out_signature_index(), Some(3));
    let signature = block.out_signature().unwrap();

    let digest = block.signing_digest(&signer.compressed_public_key()).unwrap();
    assert!(signer.verify_prehash(&digest, &signature));

    // the digest binds the candidate key, so another key fails on its own digest too
    let other_digest = block.signing_digest(&other.compressed_public_key()).unwrap();
    assert!(!other.verify_prehash(&other_digest, &signature));
    assert!(!other.verify_prehash(&digest, &signature));
}

#[test]
fn test_block_header_and_transfers() {
    let signer = fixtures::key(2);
    let block = fixtures::signed_block(&signer);

    assert_eq!(block.as_bytes().len(), BLOCK_SIZE);
    assert_eq!(block.timestamp(), fixtures::BLOCK_TIME);
    assert_eq!(block.fee(), 0);
    assert_eq!(block.field_type(0), Some(FieldType::Head));
    assert_eq!(block.field_type(4), Some(FieldType::SignOut));

    let transfers = block.transfers();
    assert_eq!(transfers.len(), 2);
    assert_eq!(transfers[0].mode(), AddressingMode::BlockHash);
    assert_eq!(transfers[0].amount(), 5);
    assert_eq!(transfers[0].hash(), FieldHash::from_block_hash(&fixtures::hashlow(9)));
    assert_eq!(transfers[1].mode(), AddressingMode::Account);
    assert_eq!(transfers[1].amount(), 7);
    assert_eq!(transfers[1].hash(), FieldHash::Account(signer.account_id()));
}

#[test]
fn test_raw_block_bounds() {
    assert!(RawBlock::parse(&[0u8; 100]).is_err());

    let mut block = RawBlock::parse(&[0u8; BLOCK_SIZE]).unwrap();
    assert!(block.set_field(0, &[1u8; 32]).is_err());
    assert!(block.set_field(16, &[1u8; 32]).is_err());
    assert!(block.field(16).is_none());

    // all-nonce block has no output signature
    assert_eq!(block.out_signature_index(), None);
    assert!(block.signing_digest(&[2u8; 33]).is_none());
    assert!(block.sign_output(&fixtures::key(1)).is_err());
}

#[test]
fn test_tampered_block_fails_verification() {
    let signer = fixtures::key(4);
    let mut block = fixtures::signed_block(&signer);
    let signature = block.out_signature().unwrap();

    block.set_field(2, &[0xFFu8; 32]).unwrap();
    let digest = block.signing_digest(&signer.compressed_public_key()).unwrap();
    assert!(!signer.verify_prehash(&digest, &signature));
}
