//! Registry browsing and editing commands

use std::path::Path;

use blocksync_blocks::BlockId;
use blocksync_core::BlockRecord;
use colored::Colorize;

use crate::context::Workspace;
use crate::error::{CliError, Result};

/// Run the list command
pub fn run_list(ws: &Workspace, tag: Option<&str>, search: Option<&str>, json: bool) -> Result<()> {
    let registry = ws.reconciler.registry();
    let records: Vec<&BlockRecord> = registry
        .search(search.unwrap_or_default())
        .into_iter()
        .filter(|r| tag.is_none_or(|t| r.has_tag(t)))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        if registry.is_empty() {
            println!("{}", "No blocks registered".dimmed());
            println!();
            println!("Run {} to add one.", "blocksync create".cyan());
        } else {
            println!("{}", "No matching blocks".dimmed());
        }
        return Ok(());
    }

    println!("{} ({})", "Blocks".bold(), records.len());
    for record in records {
        let files = ws.reconciler.files_containing(&record.id).len();
        let mut line = format!("  {}  {}", record.id.as_str().yellow(), record.name.bold());
        if !record.tags.is_empty() {
            line.push_str(&format!("  [{}]", record.tags.join(", ")).dimmed().to_string());
        }
        line.push_str(&format!("  {}", plural(files, "file")).dimmed().to_string());
        println!("{line}");
    }
    Ok(())
}

/// Run the show command
pub fn run_show(ws: &Workspace, id: &BlockId) -> Result<()> {
    let record = find(ws, id)?;

    println!("{} [{}]", record.name.bold(), record.id.as_str().yellow());
    println!();
    if !record.tags.is_empty() {
        println!("{}:     {}", "Tags".dimmed(), record.tags.join(", "));
    }
    if let Some(source) = &record.source_file {
        println!("{}:   {}", "Source".dimmed(), source);
    }
    println!("{}:  {}", "Created".dimmed(), record.created_at.to_rfc3339());
    println!("{}:  {}", "Updated".dimmed(), record.updated_at.to_rfc3339());
    println!();
    println!("{}", record.content);
    println!();

    let status = ws.reconciler.status_of(id);
    println!("{}:", "Embedded in".bold());
    if status.is_empty() {
        println!("  {}", "No documents".dimmed());
    }
    for (path, state) in &status {
        println!("  {} {}", super::badge(*state), ws.display(path));
    }
    Ok(())
}

/// Run the create command
pub fn run_create(
    ws: &mut Workspace,
    name: &str,
    content: Option<&str>,
    from: Option<&Path>,
    tags: Vec<String>,
) -> Result<()> {
    let (content, source) = match (content, from) {
        (Some(content), _) => (content.to_string(), None),
        (None, Some(from)) => {
            let path = ws.file(from);
            let document = blocksync_fs::io::read_document(&path)?;
            (document.text, Some(path.to_string()))
        }
        (None, None) => return Err(CliError::user("Provide the content with --content or --from")),
    };

    let id = ws
        .reconciler
        .registry_mut()
        .create(name, &content, tags, source)?;
    println!("{} block {} [{}]", "Created".green(), name.bold(), id.as_str().yellow());
    Ok(())
}

/// Run the rename command
pub fn run_rename(ws: &mut Workspace, id: &BlockId, name: &str) -> Result<()> {
    find(ws, id)?;
    ws.reconciler.registry_mut().rename(id, name)?;
    println!("{} {} to {}", "Renamed".green(), id.as_str().yellow(), name.bold());
    Ok(())
}

/// Run the tag command
pub fn run_tag(ws: &mut Workspace, id: &BlockId, tag: &str) -> Result<()> {
    find(ws, id)?;
    if ws.reconciler.registry_mut().add_tag(id, tag)? {
        println!("{} {} to {}", "Tagged".green(), tag.cyan(), id.as_str().yellow());
    } else {
        println!("{} already has tag {}", id.as_str().yellow(), tag.cyan());
    }
    Ok(())
}

/// Run the untag command
pub fn run_untag(ws: &mut Workspace, id: &BlockId, tag: &str) -> Result<()> {
    find(ws, id)?;
    if ws.reconciler.registry_mut().remove_tag(id, tag)? {
        println!("{} {} from {}", "Removed tag".green(), tag.cyan(), id.as_str().yellow());
    } else {
        println!("{} does not have tag {}", id.as_str().yellow(), tag.cyan());
    }
    Ok(())
}

/// Run the remove command
pub fn run_remove(ws: &mut Workspace, id: &BlockId) -> Result<()> {
    let files = ws.reconciler.files_containing(id).len();
    let Some(record) = ws.reconciler.registry_mut().remove(id)? else {
        return Err(unknown(id));
    };
    println!("{} block {} [{}]", "Removed".green(), record.name.bold(), id.as_str().yellow());
    if files > 0 {
        println!(
            "{} markers remain in {} and are now unregistered",
            "note:".yellow(),
            plural(files, "document")
        );
    }
    Ok(())
}

fn find<'a>(ws: &'a Workspace, id: &BlockId) -> Result<&'a BlockRecord> {
    ws.reconciler.registry().get(id).ok_or_else(|| unknown(id))
}

pub(crate) fn unknown(id: &BlockId) -> CliError {
    CliError::user(format!("Unknown block {id}"))
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
