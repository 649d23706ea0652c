//! Persistence tests for the BlockRegistry

use blocksync_blocks::BlockId;
use blocksync_core::{BlockRegistry, Error, RegistryEvent};
use blocksync_test_utils::TestWorkspace;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;

fn id(value: &str) -> BlockId {
    BlockId::parse(value).unwrap()
}

#[test]
fn test_json_file_shape() {
    let ws = TestWorkspace::new();
    let mut registry = BlockRegistry::new(ws.registry_path());
    registry
        .create_with_id(id("a1b2c3"), "Greeting", "Hello", vec!["intro".into()], None)
        .unwrap();

    let json: Value = serde_json::from_str(&ws.read_doc(".blocksync/blocks.db.json")).unwrap();

    let record = &json["blocks"]["a1b2c3"];
    assert_eq!(record["id"], "a1b2c3");
    assert_eq!(record["name"], "Greeting");
    assert_eq!(record["content"], "Hello");
    assert_eq!(record["tags"], serde_json::json!(["intro"]));
    assert!(record["createdAt"].is_string());
    assert!(record["updatedAt"].is_string());
    assert!(record.get("sourceFile").is_none());
    assert_eq!(json["meta"]["version"], 1);
    assert!(json["meta"]["updatedAt"].is_string());
}

#[test]
fn test_resave_is_byte_identical() {
    let ws = TestWorkspace::new();
    let mut registry = BlockRegistry::new(ws.registry_path());
    registry.create("Beta", "b\nb", vec![], Some("notes.md".into())).unwrap();
    registry.create("Alpha", "a", vec!["x".into()], None).unwrap();
    let before = ws.read_bytes(".blocksync/blocks.db.json");

    let loaded = BlockRegistry::load(ws.registry_path()).unwrap();
    loaded.save().unwrap();
    loaded.save().unwrap();

    assert_eq!(ws.read_bytes(".blocksync/blocks.db.json"), before);
}

#[test]
fn test_toml_registry_round_trip() {
    let ws = TestWorkspace::new();
    let path = ws.path("blocks.toml");
    let mut registry = BlockRegistry::new(path.clone());
    let created = registry
        .create("Snippet", "line one\nline two", vec!["a".into(), "b".into()], Some("doc.md".into()))
        .unwrap();

    let loaded = BlockRegistry::load(path).unwrap();

    assert_eq!(loaded.get(&created), registry.get(&created));
    assert!(ws.read_doc("blocks.toml").contains("[meta]"));
}

#[test]
fn test_missing_file_starts_empty() {
    let ws = TestWorkspace::new();
    let registry = BlockRegistry::load_or_create(ws.registry_path()).unwrap();
    assert!(registry.is_empty());
    assert!(!ws.registry_path().exists());
}

#[rstest]
#[case::not_json("{ not json")]
#[case::future_version(r#"{"blocks": {}, "meta": {"version": 2}}"#)]
#[case::misfiled_record(
    r#"{"blocks": {"aaaaaa": {"id": "bbbbbb", "name": "n", "content": "c",
       "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"}},
       "meta": {"version": 1}}"#
)]
fn test_corrupt_registry_is_an_error(#[case] content: &str) {
    let ws = TestWorkspace::new();
    ws.write_doc(".blocksync/blocks.db.json", content);

    let result = BlockRegistry::load_or_create(ws.registry_path());

    assert!(matches!(result, Err(Error::RegistryCorrupt { .. })));
    // The file is left for the user to repair.
    assert_eq!(ws.read_doc(".blocksync/blocks.db.json"), content);
}

#[test]
fn test_save_failure_keeps_memory_state() {
    let ws = TestWorkspace::new();
    ws.write_doc("blocker", "a file where a directory should be");
    let mut registry = BlockRegistry::new(ws.path("blocker/blocks.db.json"));
    let mut events = registry.subscribe();

    let result = registry.create_with_id(id("a1b2c3"), "Greeting", "Hello", vec![], None);

    assert!(matches!(result, Err(Error::SaveFailed { .. })));
    assert_eq!(registry.get(&id("a1b2c3")).unwrap().content, "Hello");
    assert_eq!(events.try_recv().unwrap(), RegistryEvent::Added(id("a1b2c3")));
    assert!(matches!(
        events.try_recv().unwrap(),
        RegistryEvent::SaveFailed { .. }
    ));

    // Later mutations keep working in memory and keep reporting the failure.
    assert!(matches!(
        registry.update(&id("a1b2c3"), "Hi"),
        Err(Error::SaveFailed { .. })
    ));
    assert_eq!(registry.get(&id("a1b2c3")).unwrap().content, "Hi");
}

#[test]
fn test_removed_id_can_be_reused() {
    let ws = TestWorkspace::new();
    let mut registry = BlockRegistry::new(ws.registry_path());
    registry
        .create_with_id(id("abcdef"), "First", "1", vec![], None)
        .unwrap();
    registry.remove(&id("abcdef")).unwrap();

    registry
        .create_with_id(id("abcdef"), "Second", "2", vec![], None)
        .unwrap();

    let reloaded = BlockRegistry::load(ws.registry_path()).unwrap();
    assert_eq!(reloaded.get(&id("abcdef")).unwrap().name, "Second");
}

#[test]
fn test_rename_and_tags_persist() {
    let ws = TestWorkspace::new();
    let mut registry = BlockRegistry::new(ws.registry_path());
    let block = registry.create("Old", "c", vec![], None).unwrap();

    assert!(registry.rename(&block, "New").unwrap());
    assert!(registry.add_tag(&block, "t").unwrap());
    assert!(matches!(registry.rename(&block, ""), Err(Error::Blocks(_))));

    let reloaded = BlockRegistry::load(ws.registry_path()).unwrap();
    let record = reloaded.get(&block).unwrap();
    assert_eq!(record.name, "New");
    assert_eq!(record.tags, vec!["t"]);
}
