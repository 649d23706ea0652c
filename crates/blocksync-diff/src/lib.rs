//! Line diff engine for blocksync
//!
//! Explains how a block's registry version differs from a copy embedded in a
//! document. The engine is a greedy Myers search over lines, bounded by a
//! maximum edit distance and cancellable between search steps.

pub mod error;
pub mod myers;
pub mod script;
pub mod unified;

pub use error::{Error, Result};
pub use myers::{DiffLimits, diff_lines, diff_lines_with, diff_text, diff_text_with, split_lines};
pub use script::{DiffKind, DiffLine, DiffStats};
pub use unified::render_unified;
