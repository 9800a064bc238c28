//! Error types for the consensus-facing store.

use rafter_storage::StorageError;
use rafter_types::Index;

/// Errors surfaced across the consensus contract.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The requested entry has been deleted from the head of the log.
    ///
    /// Consensus layers treat this as a distinguished condition (the entry
    /// is gone because of a snapshot, not because of corruption).
    #[error("log entry not found")]
    LogNotFound,

    /// The log assigned an index different from the one the caller asserted,
    /// meaning caller and log disagree about the next index.
    #[error("log assigned index {actual}, caller expected {expected}")]
    IndexMismatch { expected: Index, actual: Index },

    /// A delete range that is neither a prefix nor a suffix of the log.
    #[error("cannot delete range {min}-{max}: it would punch a hole in the log")]
    UnsupportedHole { min: u64, max: u64 },

    /// Entry encoding or decoding failed.
    #[error("entry codec error: {0}")]
    Codec(#[from] bincode::Error),

    /// The underlying storage engine failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
