//! Error types for log storage operations.

use std::io;
use std::path::PathBuf;

use rafter_types::Index;

/// Errors that can occur while operating on a segmented log.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    /// Filesystem I/O error.
    #[error("filesystem error: {0}")]
    Io(#[from] io::Error),

    /// The directory exists but holds no segments and creation was not
    /// permitted.
    #[error("directory {} does not contain a log", .dir.display())]
    NoLog { dir: PathBuf },

    /// A file in the log directory does not follow the segment naming scheme.
    #[error("file name {name:?} is not a segment name")]
    BadSegmentName { name: String },

    /// The segment header disagrees with the first index encoded in the
    /// filename.
    #[error("segment {name} header claims first index {actual}, filename encodes {expected}")]
    HeaderMismatch {
        name: String,
        expected: Index,
        actual: Index,
    },

    /// A partial record frame at the end of a segment file.
    #[error("segment {name} has a torn frame at byte {offset}")]
    TornFrame { name: String, offset: u64 },

    /// Adjacent segments do not cover a contiguous index range.
    #[error("segment starting at {actual} is not contiguous with its predecessor (expected {expected})")]
    DiscontiguousSegments { expected: Index, actual: Index },

    /// Record checksum mismatch - the entry data is corrupted.
    #[error(
        "corrupted entry at index {index}: checksum mismatch (stored {stored:#018x}, computed {computed:#018x})"
    )]
    CorruptEntry {
        index: Index,
        stored: u64,
        computed: u64,
    },

    /// A segment was asked for an index outside its range.
    #[error("segment {first}-{last} does not contain index {index}")]
    IndexOutOfSegment {
        index: Index,
        first: Index,
        last: Index,
    },

    /// Read below the log's current range.
    #[error("index {index} is not available, the earliest available index is {first}")]
    BeforeRange { index: Index, first: Index },

    /// Read above the log's current range.
    #[error("index {index} is after any available index")]
    AfterRange { index: Index },

    /// A delete or rewind would reduce the log to empty.
    #[error("operation would leave the log empty")]
    WouldEmptyLog,

    /// Rewind target exceeds the end of the log.
    #[error("cannot rewind to {index}, past the end of the log (last index {last})")]
    BeyondRange { index: Index, last: Index },

    /// Append payload exceeds what a record's length field can describe.
    #[error("entry of {size} bytes exceeds the maximum record size")]
    EntryTooLarge { size: usize },
}
