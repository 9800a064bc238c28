//! A single on-disk segment holding a contiguous run of log entries.
//!
//! # File Format
//!
//! A segment file is an 8-byte header followed by record frames, all
//! little-endian, with no padding between frames:
//!
//! ```text
//! [first_index:u64][frame][frame]...
//!
//! frame: [len:u32][data:len bytes][fnv1a64(data):u64]
//! ```
//!
//! The `i`-th frame holds the entry at `first_index + i`. There is no footer;
//! the file length delimits the last frame. The in-memory offset table maps
//! `index - first_index` to the byte offset of the frame's `len` field and is
//! rebuilt by scanning the file when it is not already resident.

use std::fs::{self, File, OpenOptions};
use std::hash::Hasher;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use fnv::FnvHasher;
use rafter_types::Index;

use crate::error::StorageError;
use crate::filename::SegmentName;

/// Size of the segment header: the `u64` first index.
pub(crate) const HEADER_SIZE: u64 = 8;

/// Framing bytes around each record: length prefix plus checksum trailer.
const FRAME_OVERHEAD: u64 = 4 + 8;

/// 64-bit FNV-1a over the record data alone.
fn checksum(data: &[u8]) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(data);
    hasher.finish()
}

/// One live segment. The file handle is writable only while the segment is
/// the log's active writer; sealing replaces it with a read-only handle.
#[derive(Debug)]
pub(crate) struct Segment {
    dir: PathBuf,
    name: SegmentName,
    last_index: Index,
    file: File,
    offsets: Option<Vec<u64>>,
}

impl Segment {
    /// Creates a fresh, empty segment file and writes its header.
    ///
    /// The new segment starts with a resident (empty) offset table and a
    /// writable handle, ready to serve as the log's writer.
    pub fn create(dir: &Path, first_index: Index) -> Result<Self, StorageError> {
        let name = SegmentName::unsealed(first_index);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(dir.join(name.to_string()))?;
        file.write_all(&first_index.as_u64().to_le_bytes())?;

        Ok(Self {
            dir: dir.to_path_buf(),
            name,
            last_index: first_index - 1,
            file,
            offsets: Some(Vec::new()),
        })
    }

    /// Opens an existing segment file.
    ///
    /// The filename determines the recovery path: a sealed name carries the
    /// last index, an unsealed name forces a scan to recover it from the
    /// file contents.
    pub fn open(dir: &Path, raw_name: &str) -> Result<Self, StorageError> {
        let name = SegmentName::parse(raw_name)?;
        let mut file = OpenOptions::new().read(true).open(dir.join(raw_name))?;

        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)?;
        let stored = Index::new(u64::from_le_bytes(header));
        if stored != name.first_index {
            return Err(StorageError::HeaderMismatch {
                name: raw_name.to_string(),
                expected: name.first_index,
                actual: stored,
            });
        }

        let mut segment = Self {
            dir: dir.to_path_buf(),
            name,
            last_index: name.last_index.unwrap_or(name.first_index - 1),
            file,
            offsets: None,
        };

        if !name.is_sealed() {
            segment.ensure_offsets()?;
            let entries = segment
                .offsets
                .as_ref()
                .expect("offset table is resident after a scan")
                .len() as u64;
            segment.last_index = segment.first_index() + entries - 1;
        }

        Ok(segment)
    }

    pub fn first_index(&self) -> Index {
        self.name.first_index
    }

    pub fn last_index(&self) -> Index {
        self.last_index
    }

    pub fn is_sealed(&self) -> bool {
        self.name.is_sealed()
    }

    fn path(&self) -> PathBuf {
        self.dir.join(self.name.to_string())
    }

    /// Builds the offset table from the file contents if it is not resident.
    ///
    /// The scan starts after the header and walks frame to frame. Stopping
    /// exactly at end-of-file is a clean finish; a partial trailing frame is
    /// torn-write corruption and fails the scan. For sealed segments the
    /// recovered entry count must also agree with the last index encoded in
    /// the filename.
    fn ensure_offsets(&mut self) -> Result<(), StorageError> {
        if self.offsets.is_some() {
            return Ok(());
        }

        let file_len = self.file.metadata()?.len();
        let mut offsets = Vec::new();
        let mut pos = HEADER_SIZE;
        let mut len_buf = [0u8; 4];
        while pos < file_len {
            if pos + 4 > file_len {
                return Err(self.torn_frame(pos));
            }
            self.file.seek(SeekFrom::Start(pos))?;
            self.file.read_exact(&mut len_buf)?;
            let len = u64::from(u32::from_le_bytes(len_buf));
            if pos + FRAME_OVERHEAD + len > file_len {
                return Err(self.torn_frame(pos));
            }
            offsets.push(pos);
            pos += FRAME_OVERHEAD + len;
        }

        if let Some(last) = self.name.last_index {
            let declared = (last - self.first_index()) + 1;
            if offsets.len() as u64 != declared {
                return Err(self.torn_frame(file_len));
            }
        }

        self.offsets = Some(offsets);
        Ok(())
    }

    fn torn_frame(&self, offset: u64) -> StorageError {
        StorageError::TornFrame {
            name: self.name.to_string(),
            offset,
        }
    }

    /// Reads the entry at `index`, verifying its checksum.
    pub fn read(&mut self, index: Index) -> Result<Bytes, StorageError> {
        if index < self.first_index() || index > self.last_index {
            return Err(StorageError::IndexOutOfSegment {
                index,
                first: self.first_index(),
                last: self.last_index,
            });
        }
        self.ensure_offsets()?;

        let offset = self
            .offsets
            .as_ref()
            .expect("offset table is resident after ensure_offsets")
            [(index - self.first_index()) as usize];

        self.file.seek(SeekFrom::Start(offset))?;
        let mut len_buf = [0u8; 4];
        self.file.read_exact(&mut len_buf)?;
        let len = u32::from_le_bytes(len_buf) as usize;

        let mut data = vec![0u8; len];
        self.file.read_exact(&mut data)?;

        let mut sum_buf = [0u8; 8];
        self.file.read_exact(&mut sum_buf)?;
        let stored = u64::from_le_bytes(sum_buf);
        let computed = checksum(&data);
        if stored != computed {
            return Err(StorageError::CorruptEntry {
                index,
                stored,
                computed,
            });
        }

        Ok(Bytes::from(data))
    }

    /// Appends one record frame and extends the offset table.
    ///
    /// Returns the number of bytes written. The frame is written with a
    /// single `write_all`; on an I/O error the logical state (offset table,
    /// last index) is left unchanged, though the file may carry torn bytes
    /// that the next scan will reject.
    pub fn append(&mut self, data: &[u8], sync: bool) -> Result<u64, StorageError> {
        let len = u32::try_from(data.len()).map_err(|_| StorageError::EntryTooLarge {
            size: data.len(),
        })?;

        let offset = self.file.seek(SeekFrom::End(0))?;
        let mut frame = Vec::with_capacity(FRAME_OVERHEAD as usize + data.len());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(data);
        frame.extend_from_slice(&checksum(data).to_le_bytes());
        self.file.write_all(&frame)?;
        if sync {
            self.file.sync_all()?;
        }

        self.offsets
            .as_mut()
            .expect("a writer segment keeps its offset table resident")
            .push(offset);
        self.last_index = self.last_index + 1;
        Ok(frame.len() as u64)
    }

    /// Discards the entry at `index` and everything after it.
    ///
    /// The file is truncated to the entry's stored offset, then a sealed
    /// segment is renamed to encode the new last index (rename after
    /// truncate, so the name never promises more than the file holds).
    /// Returns the new file length.
    pub fn rewind_to(&mut self, index: Index) -> Result<u64, StorageError> {
        if index < self.first_index() || index > self.last_index {
            return Err(StorageError::IndexOutOfSegment {
                index,
                first: self.first_index(),
                last: self.last_index,
            });
        }
        self.ensure_offsets()?;

        let keep = (index - self.name.first_index) as usize;
        let new_len = self
            .offsets
            .as_ref()
            .expect("offset table is resident after ensure_offsets")[keep];

        if self.is_sealed() {
            // Sealed segments hold a read-only handle; truncate through a
            // transient write handle instead.
            let file = OpenOptions::new().write(true).open(self.path())?;
            file.set_len(new_len)?;
        } else {
            self.file.set_len(new_len)?;
        }

        self.offsets
            .as_mut()
            .expect("offset table is resident after ensure_offsets")
            .truncate(keep);
        self.last_index = index - 1;

        if self.is_sealed() {
            let old_path = self.path();
            self.name = SegmentName::sealed(self.name.first_index, self.last_index);
            fs::rename(old_path, self.path())?;
        }

        Ok(new_len)
    }

    /// Seals the segment: renames the file to encode its last index and
    /// swaps the writable handle for a read-only one. The rename is the
    /// commit point that marks the segment cleanly closed.
    ///
    /// Callers must not seal an empty segment; its sealed name would encode
    /// an empty range.
    pub fn seal(&mut self, sync: bool) -> Result<(), StorageError> {
        if sync {
            self.file.sync_all()?;
        }
        let old_path = self.path();
        self.name = SegmentName::sealed(self.name.first_index, self.last_index);
        fs::rename(old_path, self.path())?;
        self.file = OpenOptions::new().read(true).open(self.path())?;
        Ok(())
    }

    /// Closes the handle and unlinks the file.
    pub fn delete(self) -> Result<(), StorageError> {
        let path = self.path();
        drop(self.file);
        fs::remove_file(path)?;
        Ok(())
    }
}
