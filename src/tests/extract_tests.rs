// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::codec;
use crate::config::SnapshotConfig;
use crate::snapshot::SnapshotExtractor;
use crate::store::keys::{block_info_key, SNAPSHOT_PRESEED};
use crate::store::{KvStore, MemStore};
use crate::tests::fixtures;
use crate::types::{BlockFlags, BlockRecord, PreBlockRecord, SnapshotKind};

fn stored(snapshot: &MemStore, n: u8) -> Option<BlockRecord> {
    snapshot
        .get(&block_info_key(&fixtures::hashlow(n)))
        .unwrap()
        .map(|bytes| codec::deserialize(&bytes).unwrap())
}

#[test]
fn test_payload_record_is_stripped_and_written() {
    let key = fixtures::key(1);
    let mut record = fixtures::with_public_key(fixtures::record(1, 100), &key);
    record.flags = BlockFlags::OURS | BlockFlags::MAIN;

    let mut index = MemStore::new();
    fixtures::put_record(&mut index, &record);
    let blocks = MemStore::new();
    let mut snapshot = MemStore::new();

    let report = SnapshotExtractor::new(&index, &blocks, &mut snapshot, &SnapshotConfig::default())
        .run()
        .unwrap();
    assert_eq!(report.written, 1);

    let written = stored(&snapshot, 1).unwrap();
    assert!(!written.flags.is_ours());
    assert!(written.flags.is_main());
    assert!(written.snapshot);
    assert_eq!(written.snapshot_info, record.snapshot_info);
}

#[test]
fn test_raw_block_attached_for_balance_without_payload() {
    let block = fixtures::signed_block(&fixtures::key(2));
    let mut index = MemStore::new();
    fixtures::put_record(&mut index, &fixtures::record(3, 250));
    let mut blocks = MemStore::new();
    blocks.put(&fixtures::hashlow(3), block.as_bytes()).unwrap();
    let mut snapshot = MemStore::new();

    SnapshotExtractor::new(&index, &blocks, &mut snapshot, &SnapshotConfig::default())
        .run()
        .unwrap();

    let info = stored(&snapshot, 3).unwrap().snapshot_info.unwrap();
    assert_eq!(info.kind, SnapshotKind::BlockData);
    assert_eq!(info.data, block.as_bytes());
}

#[test]
fn test_zero_amount_without_payload_is_not_written() {
    let mut index = MemStore::new();
    fixtures::put_record(&mut index, &fixtures::record(1, 0));
    // a zero balance with a payload still counts
    fixtures::put_record(&mut index, &fixtures::with_public_key(fixtures::record(2, 0), &fixtures::key(1)));
    let blocks = MemStore::new();
    let mut snapshot = MemStore::new();

    let report = SnapshotExtractor::new(&index, &blocks, &mut snapshot, &SnapshotConfig::default())
        .run()
        .unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.skipped_zero, 1);
    assert_eq!(report.written, 1);
    assert!(stored(&snapshot, 1).is_none());
    assert!(stored(&snapshot, 2).unwrap().snapshot);
}

#[test]
fn test_missing_content_keeps_balance() {
    let mut index = MemStore::new();
    let mut record = fixtures::record(4, 900);
    record.flags = BlockFlags::OURS;
    fixtures::put_record(&mut index, &record);
    let blocks = MemStore::new();
    let mut snapshot = MemStore::new();

    let report = SnapshotExtractor::new(&index, &blocks, &mut snapshot, &SnapshotConfig::default())
        .run()
        .unwrap();
    assert_eq!(report.missing_content, 1);
    assert_eq!(report.written, 1);

    let written = stored(&snapshot, 4).unwrap();
    assert_eq!(written.amount, 900);
    assert!(written.snapshot_info.is_none());
    assert!(!written.flags.is_ours());
}

#[test]
fn test_corrupt_entry_is_skipped() {
    let key = fixtures::key(1);
    let mut index = MemStore::new();
    fixtures::put_record(&mut index, &fixtures::with_public_key(fixtures::record(1, 10), &key));
    index.put(&block_info_key(&fixtures::hashlow(2)), &[1, 1, 0xFF]).unwrap();
    fixtures::put_record(&mut index, &fixtures::with_public_key(fixtures::record(3, 30), &key));
    // last key in scan order, so it cannot be what moved the watermark
    index.put(&block_info_key(&fixtures::hashlow(9)), &[0xFF; 4]).unwrap();
    let blocks = MemStore::new();
    let mut snapshot = MemStore::new();

    let report = SnapshotExtractor::new(&index, &blocks, &mut snapshot, &SnapshotConfig::default())
        .run()
        .unwrap();

    assert_eq!(report.scanned, 4);
    assert_eq!(report.corrupt, 2);
    assert_eq!(report.written, 2);
    assert_eq!(report.stats.total_amount, 40);
    assert_eq!(report.height, 3);
    assert_eq!(report.next_time, fixtures::BLOCK_TIME + 3);
    assert!(stored(&snapshot, 2).is_none());
    assert!(stored(&snapshot, 9).is_none());
}

#[test]
fn test_height_watermark_tracks_highest_record() {
    let key = fixtures::key(1);
    let mut index = MemStore::new();
    let mut high = fixtures::with_public_key(fixtures::record(1, 10), &key);
    high.height = 50;
    high.timestamp = 9_000;
    let mut low = fixtures::with_public_key(fixtures::record(2, 10), &key);
    low.height = 20;
    low.timestamp = 10_000;
    // zero-amount records are not written but still move the watermark
    let mut unwritten = fixtures::record(3, 0);
    unwritten.height = 50;
    unwritten.timestamp = 9_500;
    for record in [&high, &low, &unwritten] {
        fixtures::put_record(&mut index, record);
    }
    let blocks = MemStore::new();
    let mut snapshot = MemStore::new();

    let report = SnapshotExtractor::new(&index, &blocks, &mut snapshot, &SnapshotConfig::default())
        .run()
        .unwrap();
    assert_eq!(report.height, 50);
    assert_eq!(report.next_time, 9_500);
}

#[test]
fn test_legacy_layout_migration() {
    let key = fixtures::key(1);
    let mut record = fixtures::with_public_key(fixtures::record(5, 77), &key);
    record.difficulty = 0xABCD;
    let mut index = MemStore::new();
    index
        .put(
            &block_info_key(&record.hashlow),
            &codec::serialize(&PreBlockRecord::from_record(&record)).unwrap(),
        )
        .unwrap();
    let blocks = MemStore::new();
    let mut snapshot = MemStore::new();

    let config = SnapshotConfig::default().with_legacy_layout(true);
    let report = SnapshotExtractor::new(&index, &blocks, &mut snapshot, &config).run().unwrap();
    assert_eq!(report.written, 1);

    // snapshot entries are always in the current layout
    let written = stored(&snapshot, 5).unwrap();
    assert_eq!(written.difficulty, 0xABCD);
    assert_eq!(written.amount, 77);

    // the same bytes read without the flag are corrupt
    let mut again = MemStore::new();
    let report = SnapshotExtractor::new(&index, &blocks, &mut again, &SnapshotConfig::default())
        .run()
        .unwrap();
    assert_eq!(report.corrupt, 1);
}

#[test]
fn test_pre_seed_and_stats() {
    let key = fixtures::key(1);
    let mut index = MemStore::new();
    let mut main = fixtures::with_public_key(fixtures::record(1, 10), &key);
    main.flags = BlockFlags::MAIN;
    fixtures::put_record(&mut index, &main);
    fixtures::put_record(&mut index, &fixtures::with_public_key(fixtures::record(2, 15), &key));
    index.put(&[SNAPSHOT_PRESEED], b"entropy").unwrap();
    let blocks = MemStore::new();
    let mut snapshot = MemStore::new();

    let report = SnapshotExtractor::new(&index, &blocks, &mut snapshot, &SnapshotConfig::default())
        .run()
        .unwrap();

    assert!(report.pre_seed_copied);
    assert_eq!(snapshot.get(&[SNAPSHOT_PRESEED]).unwrap(), Some(b"entropy".to_vec()));
    assert_eq!(report.stats.nblocks, 2);
    assert_eq!(report.stats.nmain, 1);
    assert_eq!(report.stats.total_amount, 25);
    assert_eq!(report.stats.max_difficulty, 1002);
}
