//! Command implementations for blocksync-cli

pub mod blocks;
pub mod diff;
pub mod edit;
pub mod sync;

pub use blocks::{run_create, run_list, run_remove, run_rename, run_show, run_tag, run_untag};
pub use diff::run_diff;
pub use edit::{run_insert, run_wrap};
pub use sync::{run_pull, run_push, run_status};

use blocksync_core::SyncStatus;
use colored::{ColoredString, Colorize};

/// Fixed-width status badge.
fn badge(status: SyncStatus) -> ColoredString {
    match status {
        SyncStatus::Synced => "synced  ".green(),
        SyncStatus::Diverged => "diverged".red(),
    }
}
