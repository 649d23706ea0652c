//! Reading and rewriting marker-delimited block regions.
//!
//! Markers are found with one regex pass that tokenizes both open and close
//! markers. Pairing happens afterwards on a small stack: a close marker pairs
//! with the nearest preceding unclosed open marker carrying the same id. Once
//! a pair is emitted every pending opener is dropped, so regions never
//! overlap. Unpaired or malformed markers are ignored.
//!
//! The interior of a block runs from just after the open marker's line break
//! to just before the line break that precedes the close marker. A close
//! marker directly on the line after the open marker gives an empty interior.

use crate::line_ending::{self, LineEnding};
use crate::{BlockId, Error, Result};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Tokenizer for open and close markers.
///
/// An open marker only counts when it ends its line; the line break is part of
/// the match so the interior starts right after it.
static MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"<!--[ \t]*block:[ \t]*(?P<name>[^\r\n]+?)[ \t]*\[id:(?P<open>[0-9a-f]{6})\][ \t]*-->\r?\n",
        r"|<!--[ \t]*/block:(?P<close>[0-9a-f]{6})[ \t]*-->",
    ))
    .expect("Invalid marker regex")
});

/// A block region found in a document.
///
/// Offsets refer to the text the block was parsed from and are invalid after
/// any edit to that text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedBlock {
    pub id: BlockId,
    /// Display name from the open marker, trimmed.
    pub name: String,
    /// Interior text with `\n` line breaks.
    pub content: String,
    /// Byte range of the whole region, open marker through close marker.
    pub span: Range<usize>,
    /// Byte range of the raw interior, excluding the separator line break.
    pub content_span: Range<usize>,
    /// 1-based line of the open marker.
    pub start_line: usize,
    /// 1-based line of the close marker.
    pub end_line: usize,
}

#[derive(Clone, Copy)]
struct Opener<'a> {
    id: &'a str,
    name: &'a str,
    start: usize,
    content_start: usize,
}

/// Opening marker line, without its line break.
pub fn open_marker(id: &BlockId, name: &str) -> String {
    format!("<!-- block: {name} [id:{id}] -->")
}

/// Closing marker.
pub fn close_marker(id: &BlockId) -> String {
    format!("<!-- /block:{id} -->")
}

/// Parses every block region in `text`, in document order.
///
/// # Example
/// ```
/// use blocksync_blocks::parse_all;
///
/// let text = "intro\n<!-- block: Greeting [id:a1b2c3] -->\nHello\n<!-- /block:a1b2c3 -->\n";
/// let blocks = parse_all(text);
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].name, "Greeting");
/// assert_eq!(blocks[0].content, "Hello");
/// assert_eq!((blocks[0].start_line, blocks[0].end_line), (2, 4));
/// ```
pub fn parse_all(text: &str) -> Vec<EmbeddedBlock> {
    let mut blocks = Vec::new();
    let mut pending: Vec<Opener<'_>> = Vec::new();

    for caps in MARKER_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };

        if let Some(id) = caps.name("open") {
            pending.push(Opener {
                id: id.as_str(),
                name: caps.name("name").map_or("", |m| m.as_str()),
                start: whole.start(),
                content_start: whole.end(),
            });
        } else if let Some(id) = caps.name("close") {
            let Some(pos) = pending.iter().rposition(|o| o.id == id.as_str()) else {
                tracing::trace!(id = id.as_str(), offset = whole.start(), "Unpaired close marker");
                continue;
            };
            let opener = pending[pos];
            pending.clear();
            blocks.push(build_block(text, opener, whole.range()));
        }
    }

    blocks
}

fn build_block(text: &str, opener: Opener<'_>, close: Range<usize>) -> EmbeddedBlock {
    let content_end = interior_end(text, opener.content_start, close.start);
    let raw = &text[opener.content_start..content_end];
    EmbeddedBlock {
        id: BlockId::from_marker(opener.id),
        name: opener.name.trim().to_string(),
        content: line_ending::normalize(raw),
        span: opener.start..close.end,
        content_span: opener.content_start..content_end,
        start_line: line_at(text, opener.start),
        end_line: line_at(text, close.start),
    }
}

/// End of the raw interior: the close marker start, minus one separator line
/// break if present.
fn interior_end(text: &str, content_start: usize, close_start: usize) -> usize {
    let between = &text[content_start..close_start];
    if let Some(rest) = between.strip_suffix("\r\n") {
        content_start + rest.len()
    } else if let Some(rest) = between.strip_suffix('\n') {
        content_start + rest.len()
    } else {
        close_start
    }
}

fn line_at(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Finds the first block with the given id.
pub fn find_block(text: &str, id: &BlockId) -> Option<EmbeddedBlock> {
    parse_all(text).into_iter().find(|block| &block.id == id)
}

/// Checks if a block with the given id exists in the text.
pub fn has_block(text: &str, id: &BlockId) -> bool {
    find_block(text, id).is_some()
}

/// Normalized interior of the block with the given id.
///
/// When a malformed document repeats the id, the last pair is used, the same
/// pair the sync index reads.
pub fn extract_content(text: &str, id: &BlockId) -> Option<String> {
    parse_all(text)
        .into_iter()
        .rfind(|block| &block.id == id)
        .map(|block| block.content)
}

/// Wraps the byte range `[start, end)` of `text` in block markers.
///
/// A line break is inserted before the open marker when `start` is not at
/// the beginning of a line, and after the close marker when `end` is not at
/// the end of a line, so both markers sit on their own lines. Marker line
/// breaks follow the document's line-ending style. The selected text is kept
/// byte for byte.
///
/// # Errors
/// Returns `Error::InvalidRange` for out-of-bounds or non-char-boundary
/// offsets and `Error::InvalidName` for a name that cannot appear in a marker.
pub fn wrap(text: &str, start: usize, end: usize, id: &BlockId, name: &str) -> Result<String> {
    check_range(text, start, end)?;
    let name = validate_name(name)?;
    let eol = LineEnding::detect(text).as_str();
    let selected = &text[start..end];

    let mut out = String::with_capacity(text.len() + name.len() + 48);
    out.push_str(&text[..start]);
    if !at_line_start(text, start) {
        out.push_str(eol);
    }
    push_region(&mut out, id, name, selected, eol);
    let rest = &text[end..];
    if !rest.is_empty() && !starts_with_line_break(rest) {
        out.push_str(eol);
    }
    out.push_str(rest);
    Ok(out)
}

/// Inserts a new block holding `content` at byte `position`, or at the end of
/// the text when `position` is `None`.
///
/// The block is placed on its own lines and `content` is converted to the
/// document's line-ending style.
///
/// # Errors
/// Returns `Error::InvalidRange` for a bad position and `Error::InvalidName`
/// for an unusable name.
pub fn insert(
    text: &str,
    position: Option<usize>,
    id: &BlockId,
    name: &str,
    content: &str,
) -> Result<String> {
    let pos = position.unwrap_or(text.len());
    check_range(text, pos, pos)?;
    let name = validate_name(name)?;
    let ending = LineEnding::detect(text);
    let eol = ending.as_str();
    let body = ending.apply(content);

    let mut out = String::with_capacity(text.len() + body.len() + name.len() + 48);
    out.push_str(&text[..pos]);
    if !at_line_start(text, pos) {
        out.push_str(eol);
    }
    push_region(&mut out, id, name, &body, eol);
    let rest = &text[pos..];
    if !starts_with_line_break(rest) {
        out.push_str(eol);
    }
    out.push_str(rest);
    Ok(out)
}

/// Replaces the interior of every block with the given id.
///
/// A well-formed document holds one region per id; a document repeating the
/// id gets all its copies rewritten. Marker lines are left byte-identical.
/// The new content is written in the document's line-ending style. Replacing
/// with the current content returns the text unchanged.
///
/// # Errors
/// Returns `Error::BlockNotFound` if the text has no region for `id`.
pub fn replace_content(text: &str, id: &BlockId, new_content: &str) -> Result<String> {
    let spans: Vec<Range<usize>> = parse_all(text)
        .into_iter()
        .filter(|block| &block.id == id)
        .map(|block| block.content_span)
        .collect();
    if spans.is_empty() {
        return Err(Error::BlockNotFound { id: id.clone() });
    }
    let ending = LineEnding::detect(text);
    let body = ending.apply(new_content);

    let mut out = String::with_capacity(text.len() + (body.len() + 2) * spans.len());
    let mut cursor = 0;
    for Range { start, end } in spans {
        out.push_str(&text[cursor..start]);
        out.push_str(&body);
        if !body.is_empty() && !starts_with_line_break(&text[end..]) {
            out.push_str(ending.as_str());
        }
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

/// Removes the markers of the first block with the given id, leaving its
/// interior text in place.
///
/// # Errors
/// Returns `Error::BlockNotFound` if the text has no region for `id`.
pub fn remove_block(text: &str, id: &BlockId) -> Result<String> {
    let block = find_block(text, id).ok_or_else(|| Error::BlockNotFound { id: id.clone() })?;
    let interior = &text[block.content_span.clone()];
    let mut rest = &text[block.span.end..];
    // An empty block would otherwise leave a blank line behind.
    if interior.is_empty() && at_line_start(text, block.span.start) {
        rest = strip_line_break(rest);
    }

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..block.span.start]);
    out.push_str(interior);
    out.push_str(rest);
    Ok(out)
}

fn push_region(out: &mut String, id: &BlockId, name: &str, interior: &str, eol: &str) {
    out.push_str(&open_marker(id, name));
    out.push_str(eol);
    out.push_str(interior);
    if !interior.is_empty() {
        out.push_str(eol);
    }
    out.push_str(&close_marker(id));
}

fn check_range(text: &str, start: usize, end: usize) -> Result<()> {
    if start <= end
        && end <= text.len()
        && text.is_char_boundary(start)
        && text.is_char_boundary(end)
    {
        Ok(())
    } else {
        Err(Error::InvalidRange {
            start,
            end,
            len: text.len(),
        })
    }
}

/// Checks that `name` can appear in an open marker and returns it trimmed.
///
/// # Errors
/// Returns `Error::InvalidName` for blank names, line breaks or `-->`.
pub fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains(['\r', '\n']) || trimmed.contains("-->") {
        return Err(Error::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(trimmed)
}

fn at_line_start(text: &str, pos: usize) -> bool {
    pos == 0 || text.as_bytes()[pos - 1] == b'\n'
}

fn starts_with_line_break(text: &str) -> bool {
    text.starts_with('\n') || text.starts_with("\r\n")
}

fn strip_line_break(text: &str) -> &str {
    text.strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\n'))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(value: &str) -> BlockId {
        BlockId::parse(value).unwrap()
    }

    #[test]
    fn empty_interior_has_no_separator() {
        let text = "<!-- block: E [id:000001] -->\n<!-- /block:000001 -->";
        let block = find_block(text, &id("000001")).unwrap();
        assert_eq!(block.content, "");
        assert_eq!(block.content_span, 30..30);
    }

    #[test]
    fn open_marker_needs_line_break() {
        let text = "<!-- block: X [id:abcdef] --><!-- /block:abcdef -->";
        assert!(parse_all(text).is_empty());
    }

    #[test]
    fn close_pairs_with_nearest_matching_opener() {
        let text = "<!-- block: A [id:aaaaaa] -->\n\
                    <!-- block: A2 [id:aaaaaa] -->\n\
                    inner\n\
                    <!-- /block:aaaaaa -->\n";
        let blocks = parse_all(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "A2");
        assert_eq!(blocks[0].content, "inner");
        assert_eq!(blocks[0].start_line, 2);
    }

    #[test]
    fn pending_openers_dropped_after_pair() {
        // Nested regions are not supported: the inner pair wins and the
        // outer close marker is left unpaired.
        let text = "<!-- block: Outer [id:111111] -->\n\
                    <!-- block: Inner [id:222222] -->\n\
                    x\n\
                    <!-- /block:222222 -->\n\
                    <!-- /block:111111 -->\n";
        let blocks = parse_all(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].id, "222222");
    }

    #[test]
    fn uppercase_ids_are_not_markers() {
        let text = "<!-- block: X [id:ABCDEF] -->\nx\n<!-- /block:ABCDEF -->";
        assert!(parse_all(text).is_empty());
    }

    #[test]
    fn name_may_contain_brackets() {
        let text = "<!-- block: [draft] notes [id:0a0b0c] -->\nx\n<!-- /block:0a0b0c -->";
        assert_eq!(parse_all(text)[0].name, "[draft] notes");
    }

    #[test]
    fn spacing_inside_markers_is_flexible() {
        let text = "<!--block:Tight[id:0a0b0c]-->\nx\n<!--   /block:0a0b0c   -->";
        let blocks = parse_all(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "Tight");
    }

    #[test]
    fn repeated_id_reads_last_and_rewrites_all() {
        let text = "<!-- block: D [id:a1b2c3] -->\nold1\n<!-- /block:a1b2c3 -->\n\
                    mid\n\
                    <!-- block: D [id:a1b2c3] -->\nold2\n<!-- /block:a1b2c3 -->\n";
        assert_eq!(extract_content(text, &id("a1b2c3")).as_deref(), Some("old2"));

        let replaced = replace_content(text, &id("a1b2c3"), "Hello").unwrap();
        assert_eq!(
            replaced,
            "<!-- block: D [id:a1b2c3] -->\nHello\n<!-- /block:a1b2c3 -->\n\
             mid\n\
             <!-- block: D [id:a1b2c3] -->\nHello\n<!-- /block:a1b2c3 -->\n"
        );
        assert!(parse_all(&replaced).iter().all(|b| b.content == "Hello"));
    }

    #[test]
    fn trailing_carriage_return_does_not_survive_as_content() {
        let text = "<!-- block: R [id:0d0d0d] -->\nx\n<!-- /block:0d0d0d -->\n";
        let replaced = replace_content(text, &id("0d0d0d"), "line\r").unwrap();
        assert_eq!(replaced, "<!-- block: R [id:0d0d0d] -->\nline\n<!-- /block:0d0d0d -->\n");
        assert_eq!(extract_content(&replaced, &id("0d0d0d")).as_deref(), Some("line"));
    }

    #[test]
    fn validate_name_rejects_marker_breaking_names() {
        assert!(validate_name("  ").is_err());
        assert!(validate_name("two\nlines").is_err());
        assert!(validate_name("evil -->").is_err());
        assert_eq!(validate_name("  padded  ").unwrap(), "padded");
    }
}
