//! Plain-text unified rendering of an edit script

use crate::DiffLine;
use std::fmt::Write;
use std::ops::Range;

/// Renders an edit script as a unified diff with `context` lines of context
/// around each change.
///
/// Returns an empty string when the script has no changes.
pub fn render_unified(lines: &[DiffLine], old_label: &str, new_label: &str, context: usize) -> String {
    let hunks = hunk_ranges(lines, context);
    if hunks.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let _ = writeln!(out, "--- {old_label}");
    let _ = writeln!(out, "+++ {new_label}");

    for hunk in hunks {
        let before = &lines[..hunk.start];
        let body = &lines[hunk];
        let (old_start, old_count) = side_range(before, body, |l| l.left);
        let (new_start, new_count) = side_range(before, body, |l| l.right);
        let _ = writeln!(out, "@@ -{old_start},{old_count} +{new_start},{new_count} @@");
        for line in body {
            let _ = writeln!(out, "{}{}", line.kind.marker(), line.text);
        }
    }
    out
}

/// Index ranges of the script to print, merging changes whose context overlaps.
fn hunk_ranges(lines: &[DiffLine], context: usize) -> Vec<Range<usize>> {
    let mut hunks: Vec<Range<usize>> = Vec::new();
    for (i, _) in lines.iter().enumerate().filter(|(_, l)| l.is_change()) {
        let start = i.saturating_sub(context);
        let end = (i + context + 1).min(lines.len());
        match hunks.last_mut() {
            Some(last) if start <= last.end => last.end = last.end.max(end),
            _ => hunks.push(start..end),
        }
    }
    hunks
}

/// Start line and line count of one side of a hunk. An empty side starts at
/// the line before the hunk, as in GNU diff.
fn side_range(
    before: &[DiffLine],
    body: &[DiffLine],
    side: impl Fn(&DiffLine) -> Option<usize>,
) -> (usize, usize) {
    let preceding = before.iter().filter(|l| side(l).is_some()).count();
    let count = body.iter().filter(|l| side(l).is_some()).count();
    let start = if count == 0 { preceding } else { preceding + 1 };
    (start, count)
}
