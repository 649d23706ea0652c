//! Document discovery tests

use blocksync_core::{EngineConfig, Scanner};
use blocksync_test_utils::TestWorkspace;
use pretty_assertions::assert_eq;

fn relative(ws: &TestWorkspace, found: &[blocksync_fs::NormalizedPath]) -> Vec<String> {
    let prefix = format!("{}/", ws.root_path());
    found
        .iter()
        .map(|p| p.as_str().trim_start_matches(&prefix).to_string())
        .collect()
}

#[test]
fn test_scan_filters_by_extension_and_ignores_directories() {
    let ws = TestWorkspace::new();
    ws.write_doc("README.md", "");
    ws.write_doc("docs/guide.markdown", "");
    ws.write_doc("docs/data.JSON", "");
    ws.write_doc("src/main.rs", "");
    ws.write_doc("Node_Modules/pkg/readme.md", "");
    ws.write_doc("target/notes.md", "");
    ws.write_doc(".blocksync/blocks.db.json", "{}");

    let scanner = Scanner::default();
    let found = scanner.scan(&[ws.root_path()]);

    assert_eq!(
        relative(&ws, &found),
        vec!["README.md", "docs/data.JSON", "docs/guide.markdown"]
    );
}

#[test]
fn test_search_roots_from_config() {
    let ws = TestWorkspace::new();
    ws.write_config("search_paths = [\"notes\", \"single.txt\", \"absent\"]\nextensions = [\"txt\"]\n");
    ws.write_doc("notes/a.txt", "");
    ws.write_doc("notes/b.md", "");
    ws.write_doc("single.txt", "");
    ws.write_doc("elsewhere.txt", "");

    let config = EngineConfig::load(&ws.root_path()).unwrap();
    let found = Scanner::from_config(&config).scan(&config.search_roots(&ws.root_path()));

    assert_eq!(relative(&ws, &found), vec!["notes/a.txt", "single.txt"]);
}

#[test]
fn test_overlapping_roots_are_deduplicated() {
    let ws = TestWorkspace::new();
    let doc = ws.write_doc("a/doc.md", "");

    let found = Scanner::default().scan(&[ws.root_path(), ws.path("a")]);

    assert_eq!(found, vec![doc]);
}
