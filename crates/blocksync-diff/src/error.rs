//! Error types for blocksync-diff

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Diff exceeds the edit distance limit of {limit}")]
    TooLarge { limit: usize },

    #[error("Diff cancelled")]
    Cancelled,
}
