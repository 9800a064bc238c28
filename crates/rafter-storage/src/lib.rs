//! rafter-storage: Segmented append-only log storage
//!
//! This crate implements the durable log that backs a consensus-replicated
//! state machine: opaque byte entries addressed by a dense, 1-based 64-bit
//! index, stored across segment files that roll over at configurable limits.
//!
//! # Segment Format
//!
//! Each segment file is an 8-byte header followed by back-to-back record
//! frames, all little-endian:
//!
//! ```text
//! [first_index:u64][len:u32][data:bytes][fnv1a64:u64][len:u32][data]...
//!       8B             4B      variable      8B
//! ```
//!
//! - **`first_index`**: the index of the file's first entry, also encoded in
//!   the filename
//! - **len**: size of the entry data in bytes
//! - **data**: the entry, preserved byte-for-byte
//! - **fnv1a64**: 64-bit FNV-1a of the data, for corruption detection
//!
//! # File Layout
//!
//! ```text
//! log_dir/
//!   00000000000000000001-00000000000000000003   # sealed, entries 1-3
//!   00000000000000000004-00000000000000000006   # sealed, entries 4-6
//!   00000000000000000007                        # unsealed (active writer)
//! ```
//!
//! A segment is renamed to its sealed form when it is cleanly closed; the
//! rename is the commit point. A segment left with an unsealed name (after a
//! crash) recovers its last index by scanning the file on the next open.
//!
//! # Example
//!
//! ```ignore
//! use rafter_storage::{Config, Log};
//! use rafter_types::Index;
//!
//! let mut log = Log::open("/var/lib/rafter", Config::default(), true)?;
//!
//! log.append(b"first")?;
//! log.append(b"second")?;
//! log.append(b"third")?;
//! let data = log.read(Index::new(2))?;
//!
//! log.delete_to(Index::new(2))?;  // drop the prefix below 2 (whole segments only)
//! log.rewind_to(Index::new(3))?;  // discard the suffix from 3; 3 is written next
//! log.close()?;
//! ```

// Modules
mod config;
mod error;
mod filename;
mod log;
mod segment;

// Re-exports
pub use config::{Config, SyncPolicy};
pub use error::StorageError;
pub use log::Log;
