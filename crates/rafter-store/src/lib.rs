//! rafter-store: Consensus-facing log store
//!
//! This crate adapts the segmented storage engine in `rafter-storage` to the
//! contract a consensus library expects from its stable log: look up the
//! index range, fetch an entry by index, store entries the caller has
//! already numbered, and delete a contiguous range from either end.
//!
//! Entries cross this boundary as [`rafter_types::LogEntry`] values and are
//! stored as opaque bincode-encoded bytes; the engine underneath never
//! interprets them.
//!
//! # Example
//!
//! ```ignore
//! use bytes::Bytes;
//! use rafter_storage::Config;
//! use rafter_store::{LogStore, RaftLogStore};
//! use rafter_types::{Index, LogEntry};
//!
//! let store = RaftLogStore::open("/var/lib/rafter", Config::default(), true)?;
//!
//! for index in 1..=3 {
//!     let entry = LogEntry::command(Index::new(index), 1, Bytes::from("set x=1"));
//!     store.store_log(&entry)?;
//! }
//! let entry = store.get_log(2)?;
//!
//! // Snapshot taken through entry 1: drop the prefix.
//! store.delete_range(1, 1)?;
//! ```

// Modules
mod error;
mod store;

// Re-exports
pub use error::StoreError;
pub use store::{LogStore, RaftLogStore};
