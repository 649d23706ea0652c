//! Cross-file synchronization index
//!
//! Maps every block id to the documents embedding it, together with the
//! content found there. The index is rebuilt wholesale from an explicit path
//! list; it never watches the filesystem.

use crate::registry::BlockRegistry;
use blocksync_blocks::{BlockId, parse_all};
use blocksync_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One embedded copy of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub block_id: BlockId,
    pub path: NormalizedPath,
    /// Interior as found in the file, normalized to `\n`
    pub content: String,
}

/// How an embedded copy compares to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Synced,
    Diverged,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Synced => write!(f, "synced"),
            Self::Diverged => write!(f, "diverged"),
        }
    }
}

/// Index of block occurrences across documents.
#[derive(Debug, Clone, Default)]
pub struct SyncIndex {
    occurrences: HashMap<BlockId, Vec<Occurrence>>,
    files_scanned: usize,
}

impl SyncIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from `paths`, polling `should_abort` before each file.
    ///
    /// Returns `None` if the scan was aborted. Unreadable files are skipped.
    pub fn scan(paths: &[NormalizedPath], mut should_abort: impl FnMut() -> bool) -> Option<Self> {
        let mut index = Self::new();
        for path in paths {
            if should_abort() {
                tracing::debug!(scanned = index.files_scanned, "Index rebuild aborted");
                return None;
            }
            index.add_file(path);
        }
        tracing::debug!(
            files = index.files_scanned,
            blocks = index.occurrences.len(),
            "Index rebuilt"
        );
        Some(index)
    }

    /// Replace the index contents with a fresh scan of `paths`.
    pub fn rebuild(&mut self, paths: &[NormalizedPath]) {
        if let Some(index) = Self::scan(paths, || false) {
            *self = index;
        }
    }

    /// Like [`rebuild`](Self::rebuild) but abortable.
    ///
    /// Returns the number of files scanned, or `None` if aborted, in which
    /// case the previous contents are left untouched.
    pub fn rebuild_with(
        &mut self,
        paths: &[NormalizedPath],
        should_abort: impl FnMut() -> bool,
    ) -> Option<usize> {
        let index = Self::scan(paths, should_abort)?;
        *self = index;
        Some(self.files_scanned)
    }

    fn add_file(&mut self, path: &NormalizedPath) {
        let document = match io::read_document(path) {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "Skipping unreadable file");
                return;
            }
        };
        self.files_scanned += 1;

        // Keep-last for duplicate ids within one file, in first-seen order.
        let mut found: Vec<(BlockId, String)> = Vec::new();
        for block in parse_all(&document.text) {
            match found.iter_mut().find(|(id, _)| *id == block.id) {
                Some(entry) => {
                    tracing::warn!(path = %path, id = %block.id, "Duplicate block markers; using the last pair");
                    entry.1 = block.content;
                }
                None => found.push((block.id, block.content)),
            }
        }

        for (block_id, content) in found {
            self.occurrences
                .entry(block_id.clone())
                .or_default()
                .push(Occurrence {
                    block_id,
                    path: path.clone(),
                    content,
                });
        }
    }

    /// Occurrences of a block in scan order.
    pub fn occurrences(&self, id: &BlockId) -> &[Occurrence] {
        self.occurrences
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Files embedding a block, in scan order.
    pub fn occurrences_of(&self, id: &BlockId) -> Vec<&NormalizedPath> {
        self.occurrences(id).iter().map(|o| &o.path).collect()
    }

    /// Per-file status of a block against the registry. Empty if the registry
    /// does not know the id.
    pub fn status_of(&self, id: &BlockId, registry: &BlockRegistry) -> Vec<(NormalizedPath, SyncStatus)> {
        let Some(record) = registry.get(id) else {
            return Vec::new();
        };
        self.occurrences(id)
            .iter()
            .map(|o| {
                let status = if record.matches(&o.content) {
                    SyncStatus::Synced
                } else {
                    SyncStatus::Diverged
                };
                (o.path.clone(), status)
            })
            .collect()
    }

    /// True if any copy of a registered block differs from the registry.
    pub fn is_diverged(&self, id: &BlockId, registry: &BlockRegistry) -> bool {
        self.status_of(id, registry)
            .iter()
            .any(|(_, status)| *status == SyncStatus::Diverged)
    }

    /// Every block id with at least one occurrence.
    pub fn block_ids(&self) -> impl Iterator<Item = &BlockId> {
        self.occurrences.keys()
    }

    /// Files read successfully in the last rebuild.
    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    /// Total number of occurrences.
    pub fn len(&self) -> usize {
        self.occurrences.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn block(id: &str, content: &str) -> String {
        format!("<!-- block: B [id:{id}] -->\n{content}\n<!-- /block:{id} -->\n")
    }

    #[test]
    fn duplicate_ids_keep_last_pair() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dup.md");
        fs::write(&path, format!("{}{}", block("aaaaaa", "first"), block("aaaaaa", "second"))).unwrap();
        let id = BlockId::parse("aaaaaa").unwrap();

        let mut index = SyncIndex::new();
        index.rebuild(&[NormalizedPath::new(&path)]);

        let found = index.occurrences(&id);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "second");
    }

    #[test]
    fn unreadable_files_are_skipped() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.md");
        let binary = temp.path().join("binary.md");
        fs::write(&good, block("bbbbbb", "x")).unwrap();
        fs::write(&binary, [0xC3u8, 0x28, 0xFF]).unwrap();

        let mut index = SyncIndex::new();
        index.rebuild(&[
            NormalizedPath::new(&binary),
            NormalizedPath::new(temp.path().join("missing.md")),
            NormalizedPath::new(&good),
        ]);

        assert_eq!(index.files_scanned(), 1);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn aborted_rebuild_keeps_previous_index() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.md");
        fs::write(&path, block("cccccc", "x")).unwrap();
        let paths = [NormalizedPath::new(&path)];

        let mut index = SyncIndex::new();
        assert_eq!(index.rebuild_with(&paths, || false), Some(1));

        fs::write(&path, "no blocks anymore").unwrap();
        assert_eq!(index.rebuild_with(&paths, || true), None);

        assert_eq!(index.len(), 1);
    }

    #[test]
    fn utf16_documents_are_indexed() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("wide.md"));
        let document = blocksync_fs::TextFile::new(block("dddddd", "wide"), blocksync_fs::TextEncoding::Utf16Le);
        io::write_document(&path, &document).unwrap();

        let mut index = SyncIndex::new();
        index.rebuild(std::slice::from_ref(&path));

        let id = BlockId::parse("dddddd").unwrap();
        assert_eq!(index.occurrences_of(&id), vec![&path]);
    }
}
