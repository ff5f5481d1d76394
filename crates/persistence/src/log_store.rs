// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Append-only, checksummed key-value log.
//!
//! # Format
//! ```text
//! [magic "LSKV"][version u32 LE]
//! repeated: [key_len u32 LE][value_len u32 LE][crc64 u64 LE][key][value]
//! ```
//! The checksum covers both lengths, the key and the value. The whole log
//! is replayed into an ordered map on open; later entries for a key win.
//! A final entry cut short by a crash, or whose checksum fails, is
//! truncated away. A checksum failure anywhere else is corruption.

use byteorder::{ByteOrder, LittleEndian};
use crc64fast::Digest;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use ledger_snapshot::store::{KvIter, KvStore};
use ledger_snapshot::StoreError;

use crate::error::{PersistenceError, Result};

const MAGIC: [u8; 4] = *b"LSKV";
const VERSION: u32 = 1;
const FILE_HEADER_SIZE: u64 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
struct FrameHeader {
    key_len: u32,
    value_len: u32,
    checksum: u64,
}

impl FrameHeader {
    const SIZE: usize = 4 + 4 + 8;

    fn new(key: &[u8], value: &[u8]) -> Self {
        let key_len = key.len() as u32;
        let value_len = value.len() as u32;
        Self {
            key_len,
            value_len,
            checksum: checksum(key_len, value_len, key, value),
        }
    }

    fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        LittleEndian::write_u32(&mut buf[0..4], self.key_len);
        LittleEndian::write_u32(&mut buf[4..8], self.value_len);
        LittleEndian::write_u64(&mut buf[8..16], self.checksum);
        buf
    }

    fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            key_len: LittleEndian::read_u32(&buf[0..4]),
            value_len: LittleEndian::read_u32(&buf[4..8]),
            checksum: LittleEndian::read_u64(&buf[8..16]),
        }
    }

    fn frame_len(&self) -> u64 {
        Self::SIZE as u64 + self.key_len as u64 + self.value_len as u64
    }
}

fn checksum(key_len: u32, value_len: u32, key: &[u8], value: &[u8]) -> u64 {
    let mut digest = Digest::new();
    digest.write(&key_len.to_le_bytes());
    digest.write(&value_len.to_le_bytes());
    digest.write(key);
    digest.write(value);
    digest.sum64()
}

fn write_file_header<W: Write>(mut writer: W) -> Result<()> {
    writer.write_all(&MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    Ok(())
}

fn write_frame<W: Write>(mut writer: W, key: &[u8], value: &[u8]) -> Result<()> {
    let header = FrameHeader::new(key, value);
    writer.write_all(&header.to_bytes())?;
    writer.write_all(key)?;
    writer.write_all(value)?;
    Ok(())
}

/// Fills `buf` completely, or returns false on a clean or partial end of file.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Replays a log, returning the live map and the length of its valid prefix.
fn replay(file: &File, file_len: u64) -> Result<(BTreeMap<Vec<u8>, Vec<u8>>, u64)> {
    let mut reader = BufReader::new(file);

    let mut head = [0u8; FILE_HEADER_SIZE as usize];
    if !read_full(&mut reader, &mut head)? || head[0..4] != MAGIC {
        return Err(PersistenceError::InvalidMagic);
    }
    let version = LittleEndian::read_u32(&head[4..8]);
    if version != VERSION {
        return Err(PersistenceError::UnsupportedVersion(version));
    }

    let mut map = BTreeMap::new();
    let mut offset = FILE_HEADER_SIZE;
    loop {
        let mut raw = [0u8; FrameHeader::SIZE];
        if !read_full(&mut reader, &mut raw)? {
            break;
        }
        let header = FrameHeader::from_bytes(&raw);
        if offset + header.frame_len() > file_len {
            break;
        }

        let mut key = vec![0u8; header.key_len as usize];
        let mut value = vec![0u8; header.value_len as usize];
        if !read_full(&mut reader, &mut key)? || !read_full(&mut reader, &mut value)? {
            break;
        }

        let found = checksum(header.key_len, header.value_len, &key, &value);
        if found != header.checksum {
            if offset + header.frame_len() == file_len {
                break;
            }
            return Err(PersistenceError::ChecksumMismatch {
                offset,
                expected: header.checksum,
                found,
            });
        }

        offset += header.frame_len();
        map.insert(key, value);
    }

    Ok((map, offset))
}

/// Ordered key-value store persisted as an append-only log.
pub struct FileKvStore {
    path: PathBuf,
    map: BTreeMap<Vec<u8>, Vec<u8>>,
    file: File,
}

impl FileKvStore {
    /// Opens or creates the log at `path`, truncating a torn tail.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            let mut file = OpenOptions::new().create_new(true).write(true).open(&path)?;
            write_file_header(&mut file)?;
            file.sync_data()?;
        }

        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let file_len = file.metadata()?.len();
        let (map, valid_len) = replay(&file, file_len)?;

        if valid_len < file_len {
            warn!(
                "Truncating {} torn bytes from {}",
                file_len - valid_len,
                path.display()
            );
            file.set_len(valid_len)?;
            file.sync_data()?;
        }
        drop(file);

        let file = OpenOptions::new().append(true).open(&path)?;
        info!("Opened {} with {} keys", path.display(), map.len());
        Ok(Self { path, map, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Appends and syncs one entry.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut frame = Vec::with_capacity(FrameHeader::SIZE + key.len() + value.len());
        write_frame(&mut frame, key, value)?;
        self.file.write_all(&frame)?;
        self.file.sync_data()?;
        self.map.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    /// Rewrites the log with only the live entries, swapping it in by rename.
    pub fn compact(&mut self) -> Result<()> {
        let tmp_path = self.path.with_extension("compact.tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            let mut buf = Vec::new();
            write_file_header(&mut buf)?;
            for (key, value) in &self.map {
                write_frame(&mut buf, key, value)?;
            }
            tmp.write_all(&buf)?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        self.file = OpenOptions::new().append(true).open(&self.path)?;
        info!("Compacted {} to {} keys", self.path.display(), self.map.len());
        Ok(())
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &[u8]) -> std::result::Result<Option<Vec<u8>>, StoreError> {
        Ok(self.map.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> std::result::Result<(), StoreError> {
        Ok(self.insert(key, value)?)
    }

    fn iter_from(&self, start: &[u8]) -> std::result::Result<KvIter<'_>, StoreError> {
        Ok(Box::new(
            self.map
                .range(start.to_vec()..)
                .map(|(k, v)| Ok((k.clone(), v.clone()))),
        ))
    }
}
