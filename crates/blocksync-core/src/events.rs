//! Change notifications
//!
//! Front ends subscribe to these instead of polling. Both channels are
//! `tokio::sync::broadcast`; sending never blocks and a send without
//! subscribers is dropped silently.

use blocksync_blocks::BlockId;
use blocksync_fs::NormalizedPath;
use std::path::PathBuf;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the oldest are dropped.
pub const EVENT_CAPACITY: usize = 64;

/// Registry mutations and persistence outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    Added(BlockId),
    Updated(BlockId),
    Removed(BlockId),
    /// A write-through save failed. Emitted once per failing call.
    SaveFailed { path: PathBuf, message: String },
}

/// Index and reconciliation outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The index was rebuilt.
    IndexReady { files: usize, occurrences: usize },
    /// Registry content was written into `files` documents.
    Pushed { id: BlockId, files: usize },
    /// Registry content was replaced with the copy found in `path`.
    Pulled { id: BlockId, path: NormalizedPath },
}

pub(crate) fn channel<T: Clone>() -> broadcast::Sender<T> {
    broadcast::channel(EVENT_CAPACITY).0
}
