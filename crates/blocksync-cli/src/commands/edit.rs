//! Commands that write markers into documents

use std::path::Path;

use blocksync_blocks::BlockId;
use colored::Colorize;

use crate::context::Workspace;
use crate::error::{CliError, Result};

use super::blocks::unknown;

/// Run the wrap command
pub fn run_wrap(
    ws: &mut Workspace,
    file: &Path,
    start: usize,
    end: usize,
    name: &str,
    tags: Vec<String>,
) -> Result<()> {
    let path = ws.file(file);
    let document = blocksync_fs::io::read_document(&path)?;
    let (from, to) = line_span(&document.text, start, end).ok_or_else(|| {
        CliError::user(format!(
            "Lines {start}-{end} are not a valid range in {}",
            file.display()
        ))
    })?;

    let id = ws.reconciler.wrap_selection(&path, from, to, name, tags)?;
    println!(
        "{} lines {}-{} of {} as {} [{}]",
        "Wrapped".green(),
        start,
        end,
        ws.display(&path),
        name.bold(),
        id.as_str().yellow()
    );
    Ok(())
}

/// Run the insert command
pub fn run_insert(ws: &mut Workspace, id: &BlockId, file: &Path, line: Option<usize>) -> Result<()> {
    if !ws.reconciler.registry().contains(id) {
        return Err(unknown(id));
    }
    let path = ws.file(file);
    let position = match line {
        Some(line) => {
            let document = blocksync_fs::io::read_document(&path)?;
            let offset = line_offset(&document.text, line).ok_or_else(|| {
                CliError::user(format!("Line {line} is past the end of {}", file.display()))
            })?;
            Some(offset)
        }
        None => None,
    };

    ws.reconciler.insert_block(&path, id, position)?;
    println!(
        "{} {} into {}",
        "Inserted".green(),
        id.as_str().yellow(),
        ws.display(&path)
    );
    Ok(())
}

/// Byte range covering lines `start..=end` (1-based), excluding the last
/// line's break.
fn line_span(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    if start == 0 || end < start {
        return None;
    }
    let mut offset = 0;
    let mut from = None;
    for (index, line) in text.split_inclusive('\n').enumerate() {
        let number = index + 1;
        if number == start {
            from = Some(offset);
        }
        if number == end {
            let body = line.strip_suffix('\n').unwrap_or(line);
            let body = body.strip_suffix('\r').unwrap_or(body);
            return from.map(|from| (from, offset + body.len()));
        }
        offset += line.len();
    }
    None
}

/// Byte offset where line `line` (1-based) starts. One past the last line
/// means the end of the text.
fn line_offset(text: &str, line: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let mut offset = 0;
    let mut count = 0;
    for (index, current) in text.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            return Some(offset);
        }
        offset += current.len();
        count += 1;
    }
    (line == count + 1).then_some(text.len())
}
