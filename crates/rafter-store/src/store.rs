//! The storage-backed implementation of the consensus log contract.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use rafter_storage::{Config, Log, StorageError};
use rafter_types::{Index, LogEntry};
use tracing::{info, warn};

use crate::error::StoreError;

/// The log operations a consensus layer expects from its stable storage.
///
/// Indices at this boundary are plain `u64`s in the consensus convention:
/// 0 means "no entries". All operations are safe to call from multiple
/// threads; implementations serialize internally.
pub trait LogStore {
    /// Index of the earliest stored entry, or 0 when the log is empty.
    fn first_index(&self) -> Result<u64, StoreError>;

    /// Index of the latest stored entry, or 0 when the log is empty.
    fn last_index(&self) -> Result<u64, StoreError>;

    /// Fetches and decodes the entry at `index`.
    fn get_log(&self, index: u64) -> Result<LogEntry, StoreError>;

    /// Encodes and appends one entry. The index the log assigns must equal
    /// `entry.index`.
    fn store_log(&self, entry: &LogEntry) -> Result<(), StoreError>;

    /// Appends a batch of entries in order.
    fn store_logs(&self, entries: &[LogEntry]) -> Result<(), StoreError>;

    /// Deletes the inclusive index range `min..=max`, which must be either a
    /// prefix or a suffix of the log.
    fn delete_range(&self, min: u64, max: u64) -> Result<(), StoreError>;
}

/// A [`LogStore`] over a segmented on-disk [`Log`].
///
/// The engine underneath is single-writer; a mutex serializes every
/// operation, which also covers the file-cursor movement reads perform.
#[derive(Debug)]
pub struct RaftLogStore {
    log: Mutex<Log>,
}

impl RaftLogStore {
    /// Opens the store over the log directory at `dir`.
    pub fn open(
        dir: impl Into<PathBuf>,
        config: Config,
        create_if_missing: bool,
    ) -> Result<Self, StoreError> {
        let log = Log::open(dir, config, create_if_missing)?;
        info!(
            first_index = log.first_index().map_or(0, Index::as_u64),
            last_index = log.last_index().map_or(0, Index::as_u64),
            "opened raft log store"
        );
        Ok(Self {
            log: Mutex::new(log),
        })
    }

    /// Seals the active segment and closes the store.
    pub fn close(self) -> Result<(), StoreError> {
        let log = self.log.into_inner().expect("lock poisoned");
        log.close()?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Log> {
        self.log.lock().expect("lock poisoned")
    }
}

impl LogStore for RaftLogStore {
    fn first_index(&self) -> Result<u64, StoreError> {
        Ok(self.lock().first_index().map_or(0, Index::as_u64))
    }

    fn last_index(&self) -> Result<u64, StoreError> {
        Ok(self.lock().last_index().map_or(0, Index::as_u64))
    }

    fn get_log(&self, index: u64) -> Result<LogEntry, StoreError> {
        let data = match self.lock().read(Index::new(index)) {
            Ok(data) => data,
            Err(StorageError::BeforeRange { .. }) => return Err(StoreError::LogNotFound),
            Err(err) => {
                warn!(index, error = %err, "failed to read log entry");
                return Err(err.into());
            }
        };
        Ok(bincode::deserialize(&data)?)
    }

    fn store_log(&self, entry: &LogEntry) -> Result<(), StoreError> {
        let encoded = bincode::serialize(entry)?;
        let assigned = self.lock().append(&encoded)?;
        if assigned != entry.index {
            return Err(StoreError::IndexMismatch {
                expected: entry.index,
                actual: assigned,
            });
        }
        Ok(())
    }

    fn store_logs(&self, entries: &[LogEntry]) -> Result<(), StoreError> {
        for entry in entries {
            self.store_log(entry)?;
        }
        Ok(())
    }

    fn delete_range(&self, min: u64, max: u64) -> Result<(), StoreError> {
        let mut log = self.lock();
        let first = log.first_index().map_or(0, Index::as_u64);
        let last = log.last_index().map_or(0, Index::as_u64);

        if min <= first {
            // Prefix: the range is inclusive, the log's delete bound is not.
            log.delete_to(Index::new(max.saturating_add(1)))?;
            return Ok(());
        }
        if max >= last {
            // Suffix: min becomes the next index to be written.
            log.rewind_to(Index::new(min))?;
            return Ok(());
        }
        Err(StoreError::UnsupportedHole { min, max })
    }
}
