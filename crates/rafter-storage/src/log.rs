//! The segmented log: an ordered collection of segments plus the append
//! state for the active writer.
//!
//! # Concurrency
//!
//! The log is single-writer and performs no internal locking. Reads take
//! `&mut self` because they move a segment's file cursor; callers that share
//! a [`Log`] across threads must serialize every operation behind one lock
//! (the store adapter does exactly that).

use std::fs;
use std::io;
use std::path::PathBuf;

use bytes::Bytes;
use rafter_types::Index;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::StorageError;
use crate::segment::{Segment, HEADER_SIZE};

/// Append state for the active writer segment.
///
/// Segments are owned by the log's segment list; the writer is a capability
/// over the last segment, tracking where the next append lands and how large
/// the file has grown for the rollover decision.
#[derive(Debug)]
struct Writer {
    first_index: Index,
    next_index: Index,
    file_size: u64,
}

impl Writer {
    fn new(first_index: Index) -> Self {
        Self {
            first_index,
            next_index: first_index,
            file_size: HEADER_SIZE,
        }
    }

    /// Whether the next append should go to a fresh segment instead.
    fn is_full(&self, config: &Config) -> bool {
        if config.max_segment_items > 0
            && self.next_index - self.first_index >= config.max_segment_items
        {
            return true;
        }
        if config.max_segment_file_size > 0 && self.file_size >= config.max_segment_file_size {
            return true;
        }
        false
    }
}

/// A persistent, ordered, append-only log of opaque byte entries indexed by
/// a dense, 1-based, monotonically increasing [`Index`].
///
/// Entries live in segment files covering contiguous index ranges; at most
/// one segment (always the highest) is actively written. Dropping a `Log`
/// without calling [`Log::close`] leaves the active segment unsealed, which
/// is the crash path: the next open recovers it by scanning the file.
#[derive(Debug)]
pub struct Log {
    dir: PathBuf,
    config: Config,
    segments: Vec<Segment>,
    writer: Option<Writer>,
}

impl Log {
    /// Opens the log in `dir`.
    ///
    /// Every file in the directory must be a segment (subdirectories are
    /// skipped); segments are sorted by first index and must cover one
    /// contiguous range. With `create_if_missing`, a missing or empty
    /// directory opens as an empty log; otherwise an empty directory fails
    /// with [`StorageError::NoLog`].
    pub fn open(
        dir: impl Into<PathBuf>,
        config: Config,
        create_if_missing: bool,
    ) -> Result<Self, StorageError> {
        let dir = dir.into();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries.collect::<Result<Vec<_>, _>>()?,
            Err(err) if err.kind() == io::ErrorKind::NotFound && create_if_missing => {
                fs::create_dir_all(&dir)?;
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };
        if entries.is_empty() && !create_if_missing {
            return Err(StorageError::NoLog { dir });
        }

        let mut segments = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.file_type()?.is_dir() {
                continue;
            }
            let raw_name = entry.file_name();
            segments.push(Segment::open(&dir, &raw_name.to_string_lossy())?);
        }
        segments.sort_by_key(Segment::first_index);

        for pair in segments.windows(2) {
            let expected = pair[0].last_index() + 1;
            if pair[1].first_index() != expected {
                return Err(StorageError::DiscontiguousSegments {
                    expected,
                    actual: pair[1].first_index(),
                });
            }
        }

        debug!(
            dir = %dir.display(),
            segments = segments.len(),
            "opened segmented log"
        );
        Ok(Self {
            dir,
            config,
            segments,
            writer: None,
        })
    }

    /// The index of the earliest stored entry, or `None` while the live set
    /// is empty.
    pub fn first_index(&self) -> Option<Index> {
        self.segments.first().map(Segment::first_index)
    }

    /// The index of the latest stored entry, or `None` while the live set
    /// is empty.
    pub fn last_index(&self) -> Option<Index> {
        self.segments.last().map(Segment::last_index)
    }

    /// Number of live segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Appends one entry and returns its assigned index.
    ///
    /// Rolls over to a fresh segment first when the active writer reports
    /// full under the configured limits.
    pub fn append(&mut self, data: &[u8]) -> Result<Index, StorageError> {
        if self
            .writer
            .as_ref()
            .is_some_and(|writer| writer.is_full(&self.config))
        {
            self.seal_writer()?;
        }

        if self.writer.is_none() {
            let first_index = self
                .segments
                .last()
                .map_or(Index::ONE, |segment| segment.last_index() + 1);
            let segment = Segment::create(&self.dir, first_index)?;
            debug!(first_index = %first_index, "started new writer segment");
            self.segments.push(segment);
            self.writer = Some(Writer::new(first_index));
        }

        let writer = self
            .writer
            .as_mut()
            .expect("writer was installed just above");
        let segment = self
            .segments
            .last_mut()
            .expect("an active writer implies a live segment");

        let written = segment.append(data, self.config.sync_policy.sync_on_append())?;
        let index = writer.next_index;
        writer.next_index = index + 1;
        writer.file_size += written;
        Ok(index)
    }

    /// Reads the entry at `index`.
    pub fn read(&mut self, index: Index) -> Result<Bytes, StorageError> {
        let Some(first) = self.first_index() else {
            return Err(StorageError::AfterRange { index });
        };
        if index < first {
            return Err(StorageError::BeforeRange { index, first });
        }

        let position = self
            .segments
            .partition_point(|segment| segment.last_index() < index);
        match self.segments.get_mut(position) {
            Some(segment) if index <= segment.last_index() => segment.read(index),
            _ => Err(StorageError::AfterRange { index }),
        }
    }

    /// Deletes every entry with an index below `index`.
    ///
    /// Only whole segments are removed, so the resulting first index may
    /// still be below `index`. The log is never allowed to become empty this
    /// way: `index >= last_index()` fails with
    /// [`StorageError::WouldEmptyLog`].
    pub fn delete_to(&mut self, index: Index) -> Result<(), StorageError> {
        let last = self.last_index().ok_or(StorageError::WouldEmptyLog)?;
        if index >= last {
            return Err(StorageError::WouldEmptyLog);
        }

        while self
            .segments
            .first()
            .is_some_and(|segment| segment.last_index() < index)
        {
            let segment = self.segments.remove(0);
            info!(
                first_index = %segment.first_index(),
                last_index = %segment.last_index(),
                "deleting log prefix segment"
            );
            segment.delete()?;
        }
        Ok(())
    }

    /// Discards every entry with an index at or above `index`, making
    /// `index` the next index to be appended.
    ///
    /// Rewinding to `last_index() + 1` is a no-op. Rewinding at or below
    /// `first_index()` would empty the log and fails; rewinding past
    /// `last_index() + 1` fails with [`StorageError::BeyondRange`].
    pub fn rewind_to(&mut self, index: Index) -> Result<(), StorageError> {
        let (first, last) = match (self.first_index(), self.last_index()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(StorageError::WouldEmptyLog),
        };
        if index > last + 1 {
            return Err(StorageError::BeyondRange { index, last });
        }
        if index <= first {
            return Err(StorageError::WouldEmptyLog);
        }
        if index == last + 1 {
            return Ok(());
        }

        if let Some(writer) = self.writer.as_mut() {
            if index >= writer.first_index {
                // The target lives inside the active writer.
                let segment = self
                    .segments
                    .last_mut()
                    .expect("an active writer implies a live segment");
                let file_size = segment.rewind_to(index)?;
                writer.next_index = index;
                writer.file_size = file_size;
                return Ok(());
            }
            // The target predates the writer; its segment is dropped below.
            self.writer = None;
        }

        while self
            .segments
            .last()
            .is_some_and(|segment| segment.first_index() >= index)
        {
            let segment = self
                .segments
                .pop()
                .expect("loop condition guarantees a segment");
            info!(
                first_index = %segment.first_index(),
                last_index = %segment.last_index(),
                "deleting log suffix segment"
            );
            segment.delete()?;
        }

        let tail = self
            .segments
            .last_mut()
            .expect("rewind target is above the log's first index");
        if tail.last_index() + 1 == index {
            // Landed exactly on a segment boundary.
            return Ok(());
        }
        tail.rewind_to(index)?;
        Ok(())
    }

    /// Seals the active writer and closes every segment handle.
    ///
    /// An entry-less writer segment is deleted rather than sealed; sealing
    /// it would persist a name encoding an empty range. A reopen after
    /// `close` observes the identical logical log.
    pub fn close(mut self) -> Result<(), StorageError> {
        if let Some(writer) = self.writer.take() {
            if writer.next_index == writer.first_index {
                let segment = self
                    .segments
                    .pop()
                    .expect("an active writer implies a live segment");
                segment.delete()?;
            } else {
                self.seal_writer_segment()?;
            }
        }
        self.segments.clear();
        Ok(())
    }

    fn seal_writer(&mut self) -> Result<(), StorageError> {
        self.writer = None;
        self.seal_writer_segment()
    }

    fn seal_writer_segment(&mut self) -> Result<(), StorageError> {
        let segment = self
            .segments
            .last_mut()
            .expect("sealing requires a live segment");
        segment.seal(self.config.sync_policy.sync_on_seal())?;
        debug!(
            first_index = %segment.first_index(),
            last_index = %segment.last_index(),
            "sealed segment"
        );
        Ok(())
    }
}
