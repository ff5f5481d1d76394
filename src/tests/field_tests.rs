// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use proptest::prelude::*;

use crate::types::address;
use crate::types::field::{self, FieldError, FieldHash, BLOCK_REF_LEN, FIELD_SIZE};
use crate::types::{AddressingMode, Field, FieldType, TaggedField, ACCOUNT_ID_LEN};

proptest! {
    #[test]
    fn prop_account_mode_roundtrip(amount in any::<u64>(), id in any::<[u8; ACCOUNT_ID_LEN]>()) {
        let bytes = field::encode(amount, &FieldHash::Account(id));
        prop_assert_eq!(&bytes[28..], &[0u8; 4]);
        prop_assert_eq!(field::decode(&bytes, AddressingMode::Account), (amount, FieldHash::Account(id)));
    }

    #[test]
    fn prop_block_mode_roundtrip(amount in any::<u64>(), block_ref in any::<[u8; BLOCK_REF_LEN]>()) {
        let bytes = field::encode(amount, &FieldHash::Block(block_ref));
        prop_assert_eq!(field::decode(&bytes, AddressingMode::BlockHash), (amount, FieldHash::Block(block_ref)));
    }

    #[test]
    fn prop_reencode_is_byte_identical(raw in any::<[u8; FIELD_SIZE]>()) {
        let field = Field::from_raw(raw, FieldType::In, AddressingMode::BlockHash);
        let rebuilt = Field::new(field.amount(), field.hash(), FieldType::In);
        prop_assert_eq!(rebuilt.to_bytes(), raw);
    }
}

#[test]
fn test_amount_is_little_endian() {
    let bytes = field::encode(0x0102_0304_0506_0708, &FieldHash::Block([0u8; BLOCK_REF_LEN]));
    assert_eq!(&bytes[..8], &[8, 7, 6, 5, 4, 3, 2, 1]);
}

#[test]
fn test_raw_field_parses_lazily_once() {
    let raw = field::encode(42, &FieldHash::Account([9u8; ACCOUNT_ID_LEN]));
    let field = Field::from_raw(raw, FieldType::OutputAccount, AddressingMode::Account);
    assert!(!field.is_parsed());

    assert_eq!(field.amount(), 42);
    assert!(field.is_parsed());
    assert_eq!(field.hash(), FieldHash::Account([9u8; ACCOUNT_ID_LEN]));
    assert_eq!(field.to_bytes(), raw);
}

#[test]
fn test_block_hash_keeps_low_192_bits() {
    let mut hash = [0u8; 32];
    for (i, b) in hash.iter_mut().enumerate() {
        *b = i as u8;
    }
    let field = Field::from_block_hash(&hash, FieldType::Out);

    assert_eq!(field.amount(), 0);
    assert_eq!(field.mode(), AddressingMode::BlockHash);
    assert_eq!(&field.to_bytes()[8..], &hash[8..]);
    assert_eq!(&field.hash().to_word()[8..], &hash[8..]);
}

#[test]
fn test_block_field_read_as_account_loses_tail() {
    let mut block_ref = [0x11u8; BLOCK_REF_LEN];
    block_ref[BLOCK_REF_LEN - 1] = 0xEE;
    let written = FieldHash::Block(block_ref);
    let bytes = field::encode(500, &written);

    // wrong mode: no error, same amount, different hash
    let (amount, read) = field::decode(&bytes, AddressingMode::Account);
    assert_eq!(amount, 500);
    assert_ne!(read, written);
    assert_ne!(read.to_word(), written.to_word());
    assert_ne!(field::encode(amount, &read), bytes);
}

#[test]
fn test_account_field_read_as_block_changes_kind() {
    let written = FieldHash::Account([0x22u8; ACCOUNT_ID_LEN]);
    let bytes = field::encode(7, &written);

    let (amount, read) = field::decode(&bytes, AddressingMode::BlockHash);
    assert_eq!(amount, 7);
    assert_ne!(read, written);
    assert_eq!(read.mode(), AddressingMode::BlockHash);
    let FieldHash::Block(block_ref) = read else {
        panic!("decoded as {:?}", read);
    };
    assert_eq!(&block_ref[..ACCOUNT_ID_LEN], &[0x22u8; ACCOUNT_ID_LEN]);
}

#[test]
fn test_from_slice_lengths() {
    assert!(FieldHash::from_slice(&[1u8; 24], AddressingMode::BlockHash).is_some());
    assert!(FieldHash::from_slice(&[1u8; 32], AddressingMode::BlockHash).is_some());
    assert!(FieldHash::from_slice(&[1u8; 20], AddressingMode::Account).is_some());
    assert!(FieldHash::from_slice(&[1u8; 20], AddressingMode::BlockHash).is_none());
    assert!(FieldHash::from_slice(&[1u8; 24], AddressingMode::Account).is_none());
}

#[test]
fn test_tagged_field_carries_mode() {
    let field = Field::from_account([3u8; ACCOUNT_ID_LEN], 99, FieldType::InputAccount);
    let wire = field.tagged().to_bytes();
    assert_eq!(wire[0], AddressingMode::Account as u8);

    let restored = TaggedField::from_bytes(&wire).unwrap().into_field(FieldType::InputAccount);
    assert_eq!(restored, field);
    assert_eq!(restored.hash(), FieldHash::Account([3u8; ACCOUNT_ID_LEN]));
}

#[test]
fn test_tagged_field_rejects_bad_input() {
    let mut wire = [0u8; TaggedField::SIZE];
    wire[0] = 7;
    assert_eq!(TaggedField::from_bytes(&wire), Err(FieldError::UnknownMode(7)));

    wire[0] = AddressingMode::Account as u8;
    wire[TaggedField::SIZE - 1] = 1;
    assert_eq!(TaggedField::from_bytes(&wire), Err(FieldError::NonZeroPadding));

    assert_eq!(
        TaggedField::from_bytes(&wire[..10]),
        Err(FieldError::Length { expected: TaggedField::SIZE, found: 10 })
    );
}

#[test]
fn test_display_forms() {
    let id = [5u8; ACCOUNT_ID_LEN];
    let account = Field::from_account(id, 1, FieldType::OutputAccount);
    assert_eq!(account.to_string(), format!("Address [{}]", address::to_base58(&id)));

    let block = Field::from_block_hash(&[0xAB; 32], FieldType::In);
    let expected = format!("Block Hash [{}{}]", "00".repeat(8), "ab".repeat(24));
    assert_eq!(block.to_string(), expected);
}
