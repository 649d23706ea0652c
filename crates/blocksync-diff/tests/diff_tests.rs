//! Integration tests for the line diff engine.

use blocksync_diff::{DiffKind, DiffLine, DiffStats, diff_lines, diff_text, render_unified};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_registry_vs_document_interior() {
    let script = diff_text("Hello", "Hello world").unwrap();

    assert_eq!(
        script,
        vec![DiffLine::removed("Hello", 1), DiffLine::added("Hello world", 1)]
    );
}

#[rstest]
#[case("", "", 0, 0, 0)]
#[case("a\nb\n", "a\nb\n", 0, 0, 2)]
#[case("", "x\ny", 2, 0, 0)]
#[case("x\ny", "", 0, 2, 0)]
#[case("a\nb\nc", "a\nc\nd", 1, 1, 2)]
fn test_stats(
    #[case] old: &str,
    #[case] new: &str,
    #[case] added: usize,
    #[case] removed: usize,
    #[case] context: usize,
) {
    let stats = DiffStats::of(&diff_text(old, new).unwrap());
    assert_eq!(
        stats,
        DiffStats {
            added,
            removed,
            context
        }
    );
}

#[test]
fn test_lone_carriage_returns_are_ignored() {
    let script = diff_text("a\rb\nc\r", "ab\nc").unwrap();

    assert_eq!(
        script,
        vec![DiffLine::context("ab", 1, 1), DiffLine::context("c", 2, 2)]
    );
    assert!(DiffStats::of(&script).is_identical());
}

#[test]
fn test_line_numbers_track_both_sides() {
    let script = diff_lines(&["keep", "drop", "keep2"], &["new", "keep", "keep2"]).unwrap();

    let numbered: Vec<_> = script
        .iter()
        .map(|l| (l.kind, l.left, l.right))
        .collect();
    assert_eq!(
        numbered,
        vec![
            (DiffKind::Added, None, Some(1)),
            (DiffKind::Context, Some(1), Some(2)),
            (DiffKind::Removed, Some(2), None),
            (DiffKind::Context, Some(3), Some(3)),
        ]
    );
}

#[test]
fn test_hunk_lists_removals_before_additions() {
    let script = diff_lines(&["a", "old1", "old2", "z"], &["a", "new1", "new2", "z"]).unwrap();

    let kinds: Vec<_> = script.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DiffKind::Context,
            DiffKind::Removed,
            DiffKind::Removed,
            DiffKind::Added,
            DiffKind::Added,
            DiffKind::Context,
        ]
    );
}

#[test]
fn test_render_unified_merges_nearby_changes() {
    let old = ["one", "two", "three", "four", "five", "six", "seven", "eight"];
    let new = ["one", "TWO", "three", "four", "five", "six", "seven", "eight", "nine"];
    let script = diff_lines(&old, &new).unwrap();

    let rendered = render_unified(&script, "registry", "doc.md", 1);

    insta::assert_snapshot!(rendered.trim_end(), @r###"
--- registry
+++ doc.md
@@ -1,3 +1,3 @@
 one
-two
+TWO
 three
@@ -8,1 +8,2 @@
 eight
+nine
"###);
}

#[test]
fn test_render_unified_empty_side() {
    let script = diff_text("", "only\n").unwrap();
    assert_eq!(
        render_unified(&script, "a", "b", 3),
        "--- a\n+++ b\n@@ -0,0 +1,1 @@\n+only\n"
    );
}

#[test]
fn test_render_unified_without_changes_is_empty() {
    let script = diff_text("same\n", "same\n").unwrap();
    assert_eq!(render_unified(&script, "a", "b", 3), "");
}
