//! Diff command implementation

use std::path::Path;

use blocksync_blocks::BlockId;
use blocksync_diff::{DiffStats, render_unified};
use colored::Colorize;

use crate::context::Workspace;
use crate::error::{CliError, Result};

use super::blocks::unknown;

/// Run the diff command
pub fn run_diff(ws: &Workspace, id: &BlockId, file: &Path, context: usize) -> Result<()> {
    if !ws.reconciler.registry().contains(id) {
        return Err(unknown(id));
    }
    let path = ws.file(file);
    let limits = ws.config.diff.limits();
    let Some(script) = ws.reconciler.diff(id, &path, limits)? else {
        return Err(CliError::user(format!(
            "Block {id} not found in {}",
            file.display()
        )));
    };

    let stats = DiffStats::of(&script);
    if stats.is_identical() {
        println!("{}", "No differences".dimmed());
        return Ok(());
    }

    let rendered = render_unified(&script, &format!("registry/{id}"), ws.display(&path), context);
    for line in rendered.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else {
            println!("{line}");
        }
    }
    println!();
    println!(
        "{} {}, {} {}",
        stats.added.to_string().green(),
        "added".dimmed(),
        stats.removed.to_string().red(),
        "removed".dimmed()
    );
    Ok(())
}
