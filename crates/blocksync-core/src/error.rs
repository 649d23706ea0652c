//! Error types for blocksync-core

use std::path::PathBuf;

/// Result type for blocksync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in blocksync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Writing the registry failed; the in-memory state is kept
    #[error("Failed to save block registry to {path}: {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: blocksync_fs::Error,
    },

    /// The registry file exists but cannot be understood
    #[error("Block registry at {path} is corrupt: {message}")]
    RegistryCorrupt { path: PathBuf, message: String },

    /// A record with this id is already registered
    #[error("Block {id} already exists")]
    BlockExists { id: String },

    /// A background task panicked or was cancelled by the runtime
    #[error("Background task failed: {0}")]
    Worker(String),

    // Transparent wrappers for underlying crate errors
    #[error(transparent)]
    Fs(#[from] blocksync_fs::Error),

    #[error(transparent)]
    Blocks(#[from] blocksync_blocks::Error),

    #[error(transparent)]
    Diff(#[from] blocksync_diff::Error),
}
