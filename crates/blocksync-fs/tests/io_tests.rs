//! Tests for atomic writes and BOM-aware document I/O

use blocksync_fs::{Error, NormalizedPath, TextEncoding, TextFile, io};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

fn leftover_temp_files(dir: &std::path::Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}

#[test]
fn write_text_creates_missing_parents() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("a").join("b").join("doc.md"));

    io::write_text(&path, "deep content").unwrap();

    assert_eq!(io::read_text(&path).unwrap(), "deep content");
}

#[test]
fn write_atomic_replaces_existing_content() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("doc.md");
    fs::write(&file_path, "old content that is longer than the new one").unwrap();

    io::write_text(&NormalizedPath::new(&file_path), "new").unwrap();

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "new");
}

#[test]
fn write_atomic_leaves_no_side_files() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("target.md"));

    io::write_text(&path, "one").unwrap();
    io::write_text(&path, "two").unwrap();

    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[test]
fn failed_write_keeps_original_file() {
    let dir = tempdir().unwrap();
    // A directory at the target path makes the final rename fail.
    let target = dir.path().join("occupied");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("keep.txt"), "kept").unwrap();

    let result = io::write_text(&NormalizedPath::new(&target), "content");

    assert!(result.is_err());
    assert_eq!(fs::read_to_string(target.join("keep.txt")).unwrap(), "kept");
    assert!(leftover_temp_files(dir.path()).is_empty());
}

#[test]
fn read_text_missing_file_is_not_found() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("missing.md"));

    let err = io::read_text(&path).unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err, Error::Io { .. }));
}

#[rstest]
#[case(TextEncoding::Utf8)]
#[case(TextEncoding::Utf8Bom)]
#[case(TextEncoding::Utf16Le)]
#[case(TextEncoding::Utf16Be)]
fn document_keeps_its_encoding(#[case] encoding: TextEncoding) {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("doc.md"));
    let original = TextFile::new("# Title\r\ncafé\r\n", encoding);

    io::write_document(&path, &original).unwrap();
    let read = io::read_document(&path).unwrap();

    assert_eq!(read, original);
    assert!(!read.text.starts_with('\u{feff}'));
}

#[test]
fn rewritten_document_keeps_bom() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("doc.md");
    fs::write(&file_path, b"\xEF\xBB\xBFhello\n").unwrap();
    let path = NormalizedPath::new(&file_path);

    let doc = io::read_document(&path).unwrap();
    io::write_document(&path, &doc.with_text("goodbye\n")).unwrap();

    assert_eq!(fs::read(&file_path).unwrap(), b"\xEF\xBB\xBFgoodbye\n");
}

#[test]
fn invalid_utf8_document_is_refused() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("binary.md");
    fs::write(&file_path, [b'o', b'k', 0xFF, 0xFE, 0xFD]).unwrap();

    let err = io::read_document(&NormalizedPath::new(&file_path)).unwrap_err();

    match err {
        Error::Decode { encoding, .. } => assert_eq!(encoding, "UTF-8"),
        other => panic!("expected decode error, got {other:?}"),
    }
}
