//! Log configuration.

/// Configuration for a segmented log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Roll over to a new segment once the active segment holds this many
    /// entries. `0` disables the item limit.
    pub max_segment_items: u64,

    /// Roll over to a new segment once the active segment's file reaches this
    /// many bytes. `0` disables the size limit.
    ///
    /// With both limits at `0` the log never rolls over and keeps a single
    /// segment.
    pub max_segment_file_size: u64,

    /// When to fsync the active segment file.
    pub sync_policy: SyncPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_segment_items: 0,
            max_segment_file_size: 32 * 1024 * 1024,
            sync_policy: SyncPolicy::Always,
        }
    }
}

/// Fsync policy for the active segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// Sync after every append and on seal. Required for a consensus log
    /// that must not lose acknowledged entries.
    #[default]
    Always,

    /// Sync only when a segment is sealed. Entries appended since the last
    /// seal may be lost on power failure.
    OnSeal,

    /// Never sync; durability is left to OS write-back.
    Never,
}

impl SyncPolicy {
    /// Whether appends should be followed by an fsync.
    pub(crate) fn sync_on_append(self) -> bool {
        matches!(self, SyncPolicy::Always)
    }

    /// Whether sealing a segment should be preceded by an fsync.
    pub(crate) fn sync_on_seal(self) -> bool {
        matches!(self, SyncPolicy::Always | SyncPolicy::OnSeal)
    }
}
