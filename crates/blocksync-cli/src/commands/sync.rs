//! Status, push and pull commands

use std::path::Path;

use blocksync_blocks::BlockId;
use blocksync_core::SyncStatus;
use colored::Colorize;
use serde::Serialize;

use crate::context::Workspace;
use crate::error::{CliError, Result};

use super::blocks::unknown;

#[derive(Serialize)]
struct BlockStatus<'a> {
    id: &'a BlockId,
    name: Option<&'a str>,
    files: Vec<FileStatus<'a>>,
}

#[derive(Serialize)]
struct FileStatus<'a> {
    path: &'a str,
    /// `null` for blocks the registry does not know
    status: Option<SyncStatus>,
}

/// Run the status command
pub fn run_status(ws: &Workspace, id: Option<&BlockId>, json: bool) -> Result<()> {
    let registry = ws.reconciler.registry();
    let index = ws.reconciler.index();

    let mut ids: Vec<&BlockId> = match id {
        Some(id) => {
            if !registry.contains(id) && index.occurrences(id).is_empty() {
                return Err(unknown(id));
            }
            vec![id]
        }
        None => registry.ids().chain(index.block_ids()).collect(),
    };
    ids.sort();
    ids.dedup();

    let statuses: Vec<BlockStatus<'_>> = ids
        .into_iter()
        .map(|id| {
            let name = registry.get(id).map(|r| r.name.as_str());
            let files = index
                .occurrences(id)
                .iter()
                .map(|o| FileStatus {
                    path: ws.display(&o.path),
                    status: registry.get(id).map(|r| {
                        if r.matches(&o.content) {
                            SyncStatus::Synced
                        } else {
                            SyncStatus::Diverged
                        }
                    }),
                })
                .collect();
            BlockStatus { id, name, files }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    if statuses.is_empty() {
        println!("{}", "No blocks registered or embedded".dimmed());
        return Ok(());
    }

    let mut diverged = 0;
    for block in &statuses {
        match block.name {
            Some(name) => println!("{} [{}]", name.bold(), block.id.as_str().yellow()),
            None => println!("{} [{}]", "unregistered".red().bold(), block.id.as_str().yellow()),
        }
        if block.files.is_empty() {
            println!("  {}", "not embedded".dimmed());
        }
        for file in &block.files {
            match file.status {
                Some(status) => {
                    if status == SyncStatus::Diverged {
                        diverged += 1;
                    }
                    println!("  {} {}", super::badge(status), file.path);
                }
                None => println!("  {} {}", "local   ".dimmed(), file.path),
            }
        }
    }

    println!();
    if diverged == 0 {
        println!("{}", "All embedded copies are in sync".green());
    } else {
        println!(
            "{} diverged {}; use {} or {}",
            diverged,
            if diverged == 1 { "copy" } else { "copies" },
            "blocksync push".cyan(),
            "blocksync pull".cyan()
        );
    }
    Ok(())
}

/// Run the push command
pub fn run_push(ws: &mut Workspace, id: Option<&BlockId>, all: bool) -> Result<()> {
    let ids = match id {
        Some(id) => {
            if !ws.reconciler.registry().contains(id) {
                return Err(unknown(id));
            }
            vec![id.clone()]
        }
        None if all => ws.reconciler.diverged_blocks(),
        None => return Err(CliError::user("Name a block or pass --all")),
    };

    let mut total = 0;
    for id in &ids {
        let written = ws.reconciler.push(id)?;
        let failed = ws.reconciler.is_diverged(id);
        total += written;
        if written > 0 {
            println!(
                "{} {} to {} file(s)",
                "Pushed".green(),
                id.as_str().yellow(),
                written
            );
        }
        if failed {
            println!(
                "{} some copies of {} could not be updated (run with -v for details)",
                "warning:".yellow(),
                id.as_str().yellow()
            );
        }
    }
    if total == 0 {
        println!("{}", "Already in sync".dimmed());
    }
    Ok(())
}

/// Run the pull command
pub fn run_pull(ws: &mut Workspace, id: &BlockId, file: &Path) -> Result<()> {
    if !ws.reconciler.registry().contains(id) {
        return Err(unknown(id));
    }
    let path = ws.file(file);
    if !ws.reconciler.pull(id, &path)? {
        return Err(CliError::user(format!(
            "Block {id} not found in {}",
            file.display()
        )));
    }
    println!(
        "{} {} from {}",
        "Pulled".green(),
        id.as_str().yellow(),
        ws.display(&path)
    );

    let diverged = ws
        .reconciler
        .status_of(id)
        .into_iter()
        .filter(|(_, status)| *status == SyncStatus::Diverged)
        .count();
    if diverged > 0 {
        println!(
            "{} other copies now differ; run {} to update them",
            diverged,
            format!("blocksync push {id}").cyan()
        );
    }
    Ok(())
}
