//! Synchronization engine for blocksync
//!
//! This crate ties the Layer 0 crates together:
//!
//! - **Registry**: the durable, authoritative store of block records
//! - **Index**: which documents embed which blocks, rebuilt from a path list
//! - **Reconciler**: push registry content into documents, pull a document's
//!   copy back into the registry, report divergence
//! - **Workers**: latest-wins background rebuilds and diffs
//!
//! # Architecture
//!
//! ```text
//!                  blocksync-cli
//!                        |
//!                 blocksync-core
//!                        |
//!      +-----------------+-----------------+
//!      |                 |                 |
//! blocksync-fs   blocksync-blocks   blocksync-diff
//! ```
//!
//! # Example
//!
//! ```no_run
//! use blocksync_core::{EngineConfig, Reconciler, Result};
//! use blocksync_fs::NormalizedPath;
//!
//! fn push_everything(root: &str) -> Result<usize> {
//!     let root = NormalizedPath::new(root);
//!     let config = EngineConfig::load(&root)?;
//!     let mut reconciler = Reconciler::open(&root, &config)?;
//!
//!     let ids: Vec<_> = reconciler.diverged_blocks();
//!     let mut written = 0;
//!     for id in &ids {
//!         written += reconciler.push(id)?;
//!     }
//!     Ok(written)
//! }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod index;
pub mod reconciler;
pub mod registry;
pub mod scanner;
pub mod worker;

pub use config::{DiffConfig, EngineConfig};
pub use error::{Error, Result};
pub use events::{RegistryEvent, SyncEvent};
pub use index::{Occurrence, SyncIndex, SyncStatus};
pub use reconciler::{BlockState, DocumentBlock, Reconciler};
pub use registry::{BlockRecord, BlockRegistry};
pub use scanner::{DocumentKind, Scanner};
pub use worker::{DiffRequest, DiffResponse, DiffWorker, Generation, IndexWorker, Ticket};
