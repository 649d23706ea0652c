//! Block registry
//!
//! The registry is the single source of truth for block content. It persists
//! to one document (`.blocksync/blocks.db.json` by default, or TOML when the
//! path ends in `.toml`) and writes through on every mutating call.
//!
//! A failed write does not roll the mutation back: the in-memory state stays
//! authoritative for the session, the call returns [`Error::SaveFailed`] and a
//! [`RegistryEvent::SaveFailed`] is broadcast.

mod record;

pub use record::BlockRecord;

use crate::events::{self, RegistryEvent};
use crate::{Error, Result};
use blocksync_blocks::{BlockId, normalize, validate_name};
use blocksync_fs::{ConfigStore, NormalizedPath};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::broadcast;

/// Registry file format version written by this crate.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryMeta {
    version: u32,
    /// Time of the last mutation; untouched by plain saves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl Default for RegistryMeta {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            updated_at: None,
        }
    }
}

#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default)]
    blocks: BTreeMap<BlockId, BlockRecord>,
    #[serde(default)]
    meta: RegistryMeta,
}

#[derive(Serialize)]
struct RegistryFileRef<'a> {
    blocks: &'a BTreeMap<BlockId, BlockRecord>,
    meta: &'a RegistryMeta,
}

/// Durable store of block records keyed by id
#[derive(Debug)]
pub struct BlockRegistry {
    path: NormalizedPath,
    /// Ordered by id so serialized output is stable
    blocks: BTreeMap<BlockId, BlockRecord>,
    meta: RegistryMeta,
    events: broadcast::Sender<RegistryEvent>,
}

impl BlockRegistry {
    /// Create an empty registry that will persist to `path`.
    ///
    /// Nothing is written until the first mutation or [`save`](Self::save).
    pub fn new(path: NormalizedPath) -> Self {
        Self {
            path,
            blocks: BTreeMap::new(),
            meta: RegistryMeta::default(),
            events: events::channel(),
        }
    }

    /// Load a registry from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::RegistryCorrupt` if the file cannot be parsed, uses an
    /// unknown format version, or files a record under the wrong id. I/O
    /// failures are returned as `Error::Fs`.
    pub fn load(path: NormalizedPath) -> Result<Self> {
        let file: RegistryFile = ConfigStore::new().load(&path).map_err(|e| match e {
            blocksync_fs::Error::ConfigParse { path, message, .. } => {
                Error::RegistryCorrupt { path, message }
            }
            other => Error::Fs(other),
        })?;

        if file.meta.version > FORMAT_VERSION {
            return Err(Error::RegistryCorrupt {
                path: path.to_native(),
                message: format!("unsupported format version {}", file.meta.version),
            });
        }
        if let Some((key, record)) = file.blocks.iter().find(|(key, record)| **key != record.id) {
            return Err(Error::RegistryCorrupt {
                path: path.to_native(),
                message: format!("record {} is filed under {}", record.id, key),
            });
        }

        tracing::debug!(path = %path, blocks = file.blocks.len(), "Loaded block registry");
        Ok(Self {
            path,
            blocks: file.blocks,
            meta: file.meta,
            events: events::channel(),
        })
    }

    /// Load the registry, or start an empty one if the file does not exist.
    pub fn load_or_create(path: NormalizedPath) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path, "No block registry yet, starting empty");
            Ok(Self::new(path))
        }
    }

    /// Write the registry as it is now.
    ///
    /// Saving unchanged data reproduces the file byte for byte.
    pub fn save(&self) -> Result<()> {
        let file = RegistryFileRef {
            blocks: &self.blocks,
            meta: &self.meta,
        };
        match ConfigStore::new().save(&self.path, &file) {
            Ok(()) => {
                tracing::trace!(path = %self.path, blocks = self.blocks.len(), "Saved block registry");
                Ok(())
            }
            Err(source) => {
                tracing::warn!(path = %self.path, error = %source, "Failed to save block registry");
                self.emit(RegistryEvent::SaveFailed {
                    path: self.path.to_native(),
                    message: source.to_string(),
                });
                Err(Error::SaveFailed {
                    path: self.path.to_native(),
                    source,
                })
            }
        }
    }

    /// Subscribe to registry events.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// A random id not used by any live record.
    pub fn fresh_id(&self) -> BlockId {
        BlockId::generate(|candidate| self.blocks.contains_key(candidate))
    }

    /// Register a new block under a fresh id and persist.
    ///
    /// # Errors
    ///
    /// Returns `Error::Blocks` for a name that cannot appear in a marker and
    /// `Error::SaveFailed` if the registry could not be written (the record is
    /// kept in memory).
    pub fn create(
        &mut self,
        name: &str,
        content: &str,
        tags: Vec<String>,
        source_file: Option<String>,
    ) -> Result<BlockId> {
        let id = self.fresh_id();
        self.create_with_id(id, name, content, tags, source_file)
    }

    /// Register a new block under a caller-chosen id and persist.
    ///
    /// # Errors
    ///
    /// Returns `Error::BlockExists` if a live record already uses `id`, plus
    /// the errors of [`create`](Self::create).
    pub fn create_with_id(
        &mut self,
        id: BlockId,
        name: &str,
        content: &str,
        tags: Vec<String>,
        source_file: Option<String>,
    ) -> Result<BlockId> {
        if self.blocks.contains_key(&id) {
            return Err(Error::BlockExists { id: id.to_string() });
        }
        let name = validate_name(name)?;
        let now = self.stamp();
        let record = BlockRecord::new(id.clone(), name, content, tags, source_file, now);
        self.blocks.insert(id.clone(), record);

        tracing::info!(id = %id, name, "Created block");
        self.emit(RegistryEvent::Added(id.clone()));
        self.save()?;
        Ok(id)
    }

    /// Replace a block's content. Returns `Ok(false)` if the id is unknown.
    pub fn update(&mut self, id: &BlockId, content: &str) -> Result<bool> {
        let content = normalize(content);
        self.modify(id, |record| {
            record.content = content;
            true
        })
    }

    /// Change a block's display name. Returns `Ok(false)` if the id is unknown.
    pub fn rename(&mut self, id: &BlockId, new_name: &str) -> Result<bool> {
        let new_name = validate_name(new_name)?.to_string();
        self.modify(id, |record| {
            record.name = new_name;
            true
        })
    }

    /// Add a tag. Adding a tag the block already has does not write.
    pub fn add_tag(&mut self, id: &BlockId, tag: &str) -> Result<bool> {
        self.modify(id, |record| record.add_tag(tag))
    }

    /// Remove a tag. Removing an absent tag does not write.
    pub fn remove_tag(&mut self, id: &BlockId, tag: &str) -> Result<bool> {
        self.modify(id, |record| record.remove_tag(tag))
    }

    /// Delete a record. Document occurrences are left alone.
    pub fn remove(&mut self, id: &BlockId) -> Result<Option<BlockRecord>> {
        let Some(record) = self.blocks.remove(id) else {
            return Ok(None);
        };
        self.stamp();
        tracing::info!(id = %id, name = %record.name, "Removed block; its id may be reused");
        self.emit(RegistryEvent::Removed(id.clone()));
        self.save()?;
        Ok(Some(record))
    }

    pub fn get(&self, id: &BlockId) -> Option<&BlockRecord> {
        self.blocks.get(id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.blocks.contains_key(id)
    }

    /// Records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockRecord> {
        self.blocks.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &BlockId> {
        self.blocks.keys()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All records sorted by name, case-insensitively.
    pub fn list(&self) -> Vec<&BlockRecord> {
        let mut records: Vec<_> = self.blocks.values().collect();
        records.sort_by_cached_key(|r| (r.name.to_lowercase(), r.id.clone()));
        records
    }

    /// Records whose name, content or tags contain `query`, ignoring case.
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&BlockRecord> {
        let query = query.trim();
        self.list()
            .into_iter()
            .filter(|r| query.is_empty() || r.matches_query(query))
            .collect()
    }

    /// Records carrying `tag`.
    pub fn with_tag(&self, tag: &str) -> Vec<&BlockRecord> {
        self.list().into_iter().filter(|r| r.has_tag(tag)).collect()
    }

    /// Every tag in use, sorted and de-duplicated.
    pub fn all_tags(&self) -> Vec<String> {
        self.blocks
            .values()
            .flat_map(|r| r.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Apply `change` to a record and persist if it reports a change.
    fn modify(&mut self, id: &BlockId, change: impl FnOnce(&mut BlockRecord) -> bool) -> Result<bool> {
        let now = Utc::now();
        let Some(record) = self.blocks.get_mut(id) else {
            return Ok(false);
        };
        if !change(record) {
            return Ok(false);
        }
        record.touch(now);
        self.stamp();

        tracing::debug!(id = %id, "Updated block");
        self.emit(RegistryEvent::Updated(id.clone()));
        self.save()?;
        Ok(true)
    }

    /// Advance the registry's modification time and return it.
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamped = self.meta.updated_at.map_or(now, |previous| previous.max(now));
        self.meta.updated_at = Some(stamped);
        stamped
    }

    fn emit(&self, event: RegistryEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn registry(temp: &TempDir) -> BlockRegistry {
        BlockRegistry::new(NormalizedPath::new(temp.path().join("blocks.db.json")))
    }

    #[test]
    fn test_create_and_get() {
        let temp = TempDir::new().unwrap();
        let mut reg = registry(&temp);

        let id = reg
            .create("Greeting", "Hello\r\n", vec!["intro".into()], Some("doc.md".into()))
            .unwrap();

        let record = reg.get(&id).unwrap();
        assert_eq!(record.name, "Greeting");
        assert_eq!(record.content, "Hello\n");
        assert_eq!(record.source_file.as_deref(), Some("doc.md"));
        assert!(reg.path().exists());
    }

    #[test]
    fn test_create_rejects_marker_breaking_name() {
        let temp = TempDir::new().unwrap();
        let mut reg = registry(&temp);
        assert!(matches!(
            reg.create("bad -->", "x", vec![], None),
            Err(Error::Blocks(_))
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_create_with_taken_id() {
        let temp = TempDir::new().unwrap();
        let mut reg = registry(&temp);
        let id = reg.create("A", "a", vec![], None).unwrap();
        assert!(matches!(
            reg.create_with_id(id, "B", "b", vec![], None),
            Err(Error::BlockExists { .. })
        ));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let temp = TempDir::new().unwrap();
        let mut reg = registry(&temp);
        let unknown = BlockId::parse("ffffff").unwrap();
        assert!(!reg.update(&unknown, "x").unwrap());
        assert!(!reg.path().exists());
    }

    #[test]
    fn test_update_advances_timestamp() {
        let temp = TempDir::new().unwrap();
        let mut reg = registry(&temp);
        let id = reg.create("A", "old", vec![], None).unwrap();
        let created = reg.get(&id).unwrap().updated_at;

        assert!(reg.update(&id, "new").unwrap());

        let record = reg.get(&id).unwrap();
        assert_eq!(record.content, "new");
        assert!(record.updated_at >= created);
        assert_eq!(record.created_at, created);
    }

    #[test]
    fn test_tag_noops_do_not_write() {
        let temp = TempDir::new().unwrap();
        let mut reg = registry(&temp);
        let id = reg.create("A", "a", vec!["x".into()], None).unwrap();
        let mut events = reg.subscribe();

        assert!(!reg.add_tag(&id, "x").unwrap());
        assert!(!reg.remove_tag(&id, "absent").unwrap());
        assert!(events.try_recv().is_err());

        assert!(reg.add_tag(&id, "y").unwrap());
        assert_eq!(events.try_recv().unwrap(), RegistryEvent::Updated(id));
    }

    #[test]
    fn test_remove_returns_record() {
        let temp = TempDir::new().unwrap();
        let mut reg = registry(&temp);
        let id = reg.create("A", "a", vec![], None).unwrap();

        let removed = reg.remove(&id).unwrap().unwrap();

        assert_eq!(removed.id, id);
        assert!(reg.get(&id).is_none());
        assert!(reg.remove(&id).unwrap().is_none());
    }

    #[test]
    fn test_browsing() {
        let temp = TempDir::new().unwrap();
        let mut reg = registry(&temp);
        reg.create("beta", "second", vec!["b".into(), "shared".into()], None)
            .unwrap();
        reg.create("Alpha", "first", vec!["shared".into()], None).unwrap();
        reg.create("gamma", "needle here", vec![], None).unwrap();

        let names: Vec<_> = reg.list().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta", "gamma"]);

        let found: Vec<_> = reg.search("NEEDLE").iter().map(|r| r.name.as_str()).collect();
        assert_eq!(found, vec!["gamma"]);
        assert_eq!(reg.search("").len(), 3);

        let tagged: Vec<_> = reg.with_tag("shared").iter().map(|r| r.name.as_str()).collect();
        assert_eq!(tagged, vec!["Alpha", "beta"]);
        assert_eq!(reg.all_tags(), vec!["b", "shared"]);
        assert_eq!(reg.len(), 3);
    }
}
