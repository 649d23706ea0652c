//! Error types for blocksync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from blocksync-core
    #[error(transparent)]
    Core(#[from] blocksync_core::Error),

    /// Error from blocksync-fs
    #[error(transparent)]
    Fs(#[from] blocksync_fs::Error),

    /// Error from blocksync-blocks
    #[error(transparent)]
    Blocks(#[from] blocksync_blocks::Error),

    /// Error from blocksync-diff
    #[error(transparent)]
    Diff(#[from] blocksync_diff::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
