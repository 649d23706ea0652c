//! Filesystem layer for blocksync
//!
//! Provides normalized paths, byte-order-mark aware text decoding and
//! crash-safe write-to-side-file-then-rename I/O. Every file the engine
//! touches (documents and the block registry) goes through this crate.

pub mod config;
pub mod encoding;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use encoding::{TextEncoding, TextFile};
pub use error::{Error, Result};
pub use path::NormalizedPath;
