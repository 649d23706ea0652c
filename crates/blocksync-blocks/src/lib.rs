//! Embedded content blocks for blocksync.
//!
//! A block is a named region of a plain-text document delimited by HTML
//! comment markers that carry a six-character hex id:
//!
//! ```text
//! <!-- block: Display Name [id:a1b2c3] -->
//! interior content
//! <!-- /block:a1b2c3 -->
//! ```
//!
//! This crate reads and rewrites those regions. It performs no I/O; callers
//! hand it document text and write the result back themselves.

pub mod codec;
pub mod error;
pub mod id;
pub mod line_ending;

pub use codec::{
    EmbeddedBlock, close_marker, extract_content, find_block, has_block, insert, open_marker,
    parse_all, remove_block, replace_content, validate_name, wrap,
};
pub use error::{Error, Result};
pub use id::BlockId;
pub use line_ending::{LineEnding, normalize};
