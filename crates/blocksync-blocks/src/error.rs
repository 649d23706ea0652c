//! Error types for blocksync-blocks

use crate::BlockId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Block not found: {id}")]
    BlockNotFound { id: BlockId },

    #[error("Invalid range {start}..{end} for text of {len} bytes")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("Invalid block id {value:?}: expected 6 lowercase hex characters")]
    InvalidId { value: String },

    #[error("Invalid block name {name:?}")]
    InvalidName { name: String },
}
