//! Shared test utilities for the blocksync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`workspace`]: [`TestWorkspace`](workspace::TestWorkspace), a scratch
//!   directory with document and registry helpers

pub mod workspace;

pub use workspace::{TestWorkspace, block_text};
