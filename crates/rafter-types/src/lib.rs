//! # rafter-types: Core types for the rafter log store
//!
//! This crate contains the types shared across the rafter system:
//! - Log positions ([`Index`])
//! - The consensus layer's entry structure ([`LogEntry`], [`EntryKind`])

use std::fmt::Display;
use std::ops::{Add, Sub};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ============================================================================
// Index - Copy (cheap 8-byte value)
// ============================================================================

/// Position of an entry within the log.
///
/// Indices are dense (no gaps), strictly increasing, and 1-based: the first
/// entry ever appended to an empty log has index 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Index(u64);

impl Index {
    /// The index assigned to the first entry of an empty log.
    pub const ONE: Index = Index(1);

    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<u64> for Index {
    type Output = Index;

    fn add(self, rhs: u64) -> Self::Output {
        Index(self.0 + rhs)
    }
}

impl Sub<u64> for Index {
    type Output = Index;

    fn sub(self, rhs: u64) -> Self::Output {
        Index(self.0 - rhs)
    }
}

/// The distance between two indices.
impl Sub<Index> for Index {
    type Output = u64;

    fn sub(self, rhs: Index) -> Self::Output {
        self.0 - rhs.0
    }
}

impl From<u64> for Index {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Index> for u64 {
    fn from(index: Index) -> Self {
        index.0
    }
}

// ============================================================================
// Log Entries - what the consensus layer stores
// ============================================================================

/// Kind of a consensus log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// A state machine command.
    Command,
    /// A no-op entry committed by a new leader.
    Noop,
    /// A barrier entry used to wait for preceding entries to apply.
    Barrier,
    /// A cluster membership change.
    Configuration,
}

/// A single consensus log entry.
///
/// The storage engine treats entries as opaque bytes; this structure exists
/// at the adapter boundary, where entries are encoded before an append and
/// decoded after a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// The index the caller expects this entry to be stored at.
    pub index: Index,
    /// The election term in which the entry was created.
    pub term: u64,
    /// What the entry represents.
    pub kind: EntryKind,
    /// The entry payload (zero-copy Bytes).
    pub data: Bytes,
}

impl LogEntry {
    pub fn new(index: Index, term: u64, kind: EntryKind, data: Bytes) -> Self {
        Self {
            index,
            term,
            kind,
            data,
        }
    }

    /// Creates a command entry, the common case.
    pub fn command(index: Index, term: u64, data: Bytes) -> Self {
        Self::new(index, term, EntryKind::Command, data)
    }
}
