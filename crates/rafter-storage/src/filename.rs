//! Segment file naming.
//!
//! The filename encodes a segment's recovery state:
//!
//! - `NNNNNNNNNNNNNNNNNNNN` - an unsealed segment, still being written or
//!   never cleanly closed; only the first index is known from the name.
//! - `NNNNNNNNNNNNNNNNNNNN-MMMMMMMMMMMMMMMMMMMM` - a sealed segment covering
//!   `[first, last]`.
//!
//! Both halves are 20-digit zero-padded decimal so names sort in index order.

use std::fmt::{self, Display};

use rafter_types::Index;

use crate::error::StorageError;

/// A parsed segment filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SegmentName {
    pub first_index: Index,
    /// Present only for sealed segments.
    pub last_index: Option<Index>,
}

impl SegmentName {
    pub fn unsealed(first_index: Index) -> Self {
        Self {
            first_index,
            last_index: None,
        }
    }

    pub fn sealed(first_index: Index, last_index: Index) -> Self {
        Self {
            first_index,
            last_index: Some(last_index),
        }
    }

    /// Parses a directory entry name. Parsing is strict: anything that is
    /// not `<u64>` or `<u64>-<u64>` is rejected.
    pub fn parse(name: &str) -> Result<Self, StorageError> {
        let bad = || StorageError::BadSegmentName {
            name: name.to_string(),
        };

        let (first, last) = match name.split_once('-') {
            Some((first, last)) => (first, Some(last)),
            None => (name, None),
        };

        let first_index = first.parse::<u64>().map_err(|_| bad())?;
        if first_index == 0 {
            // Indices are 1-based; no segment can start at 0.
            return Err(bad());
        }
        let last_index = match last {
            Some(last) => {
                let last_index = last.parse::<u64>().map_err(|_| bad())?;
                if last_index < first_index {
                    // A sealed name encoding an empty or negative range.
                    return Err(bad());
                }
                Some(Index::new(last_index))
            }
            None => None,
        };

        Ok(Self {
            first_index: Index::new(first_index),
            last_index,
        })
    }

    pub fn is_sealed(&self) -> bool {
        self.last_index.is_some()
    }
}

impl Display for SegmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_index {
            Some(last) => write!(f, "{:020}-{:020}", self.first_index.as_u64(), last.as_u64()),
            None => write!(f, "{:020}", self.first_index.as_u64()),
        }
    }
}
