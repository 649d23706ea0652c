//! Push/pull reconciliation between the registry and documents
//!
//! The [`Reconciler`] owns the registry, the index and the list of documents
//! the index was built from. `push` makes documents match the registry,
//! `pull` makes the registry match one document. Divergence is reported, never
//! merged.

use crate::config::EngineConfig;
use crate::events::{self, SyncEvent};
use crate::scanner::Scanner;
use crate::index::{SyncIndex, SyncStatus};
use crate::registry::BlockRegistry;
use crate::Result;
use blocksync_blocks::{BlockId, extract_content, insert, normalize, parse_all, replace_content, wrap};
use blocksync_diff::{DiffLimits, DiffLine, diff_text_with};
use blocksync_fs::{NormalizedPath, io};
use serde::Serialize;
use tokio::sync::broadcast;

/// State of a block inside an open document, for editor gutters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockState {
    /// The registry does not know this id
    Local,
    Synced,
    Diverged,
}

/// A block found in an in-memory document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentBlock {
    pub id: BlockId,
    pub name: String,
    /// 1-based line of the open marker
    pub start_line: usize,
    /// 1-based line of the close marker
    pub end_line: usize,
    pub state: BlockState,
}

/// Coordinates the registry, the index and document rewrites.
#[derive(Debug)]
pub struct Reconciler {
    registry: BlockRegistry,
    index: SyncIndex,
    paths: Vec<NormalizedPath>,
    events: broadcast::Sender<SyncEvent>,
}

impl Reconciler {
    /// Create a reconciler with an empty index.
    pub fn new(registry: BlockRegistry) -> Self {
        Self {
            registry,
            index: SyncIndex::new(),
            paths: Vec::new(),
            events: events::channel(),
        }
    }

    /// Open the workspace at `root`: load (or start) its registry and index
    /// every document the configured scanner finds.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry file exists but cannot be loaded.
    pub fn open(root: &NormalizedPath, config: &EngineConfig) -> Result<Self> {
        let registry = BlockRegistry::load_or_create(config.registry_path(root))?;
        let paths = Scanner::from_config(config).scan(&config.search_roots(root));
        let mut reconciler = Self::new(registry);
        reconciler.rebuild_index(paths);
        Ok(reconciler)
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut BlockRegistry {
        &mut self.registry
    }

    pub fn index(&self) -> &SyncIndex {
        &self.index
    }

    /// Documents the index is built from.
    pub fn paths(&self) -> &[NormalizedPath] {
        &self.paths
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Rebuild the index from a new document list.
    pub fn rebuild_index(&mut self, paths: Vec<NormalizedPath>) {
        self.paths = paths;
        self.rescan();
    }

    /// Rebuild the index from the current document list.
    pub fn rescan(&mut self) {
        self.index.rebuild(&self.paths);
        self.index_ready();
    }

    /// Install an index built elsewhere (by a background worker) for `paths`.
    pub fn apply_index(&mut self, paths: Vec<NormalizedPath>, index: SyncIndex) {
        self.paths = paths;
        self.index = index;
        self.index_ready();
    }

    fn index_ready(&self) {
        self.emit(SyncEvent::IndexReady {
            files: self.index.files_scanned(),
            occurrences: self.index.len(),
        });
    }

    /// Write the registry content of `id` into every document embedding it.
    ///
    /// Returns the number of documents rewritten. Unknown ids and documents
    /// already in sync count as zero. A document that cannot be read or
    /// written is logged and skipped; the others are still updated.
    pub fn push(&mut self, id: &BlockId) -> Result<usize> {
        let Some(record) = self.registry.get(id) else {
            return Ok(0);
        };
        let content = record.content.clone();
        let targets: Vec<NormalizedPath> = self.index.occurrences_of(id).into_iter().cloned().collect();

        let mut written = 0;
        for path in &targets {
            match push_to_file(path, id, &content) {
                Ok(true) => written += 1,
                Ok(false) => tracing::debug!(path = %path, id = %id, "Already in sync"),
                Err(e) => tracing::warn!(path = %path, id = %id, error = %e, "Push skipped file"),
            }
        }

        if written > 0 {
            self.rescan();
            tracing::info!(id = %id, files = written, "Pushed block");
            self.emit(SyncEvent::Pushed {
                id: id.clone(),
                files: written,
            });
        }
        Ok(written)
    }

    /// Replace the registry content of `id` with the copy found in `path`.
    ///
    /// Returns `Ok(false)` if the file cannot be read, does not contain the
    /// block, or the registry does not know the id.
    ///
    /// # Errors
    ///
    /// Only a failed registry save is an error.
    pub fn pull(&mut self, id: &BlockId, path: &NormalizedPath) -> Result<bool> {
        let document = match io::read_document(path) {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "Pull could not read file");
                return Ok(false);
            }
        };
        let Some(content) = extract_content(&document.text, id) else {
            tracing::debug!(path = %path, id = %id, "Pull found no block in file");
            return Ok(false);
        };
        if !self.registry.update(id, &content)? {
            return Ok(false);
        }

        self.rescan();
        tracing::info!(id = %id, path = %path, "Pulled block");
        self.emit(SyncEvent::Pulled {
            id: id.clone(),
            path: path.clone(),
        });
        Ok(true)
    }

    /// Files embedding `id`, in scan order.
    pub fn files_containing(&self, id: &BlockId) -> Vec<&NormalizedPath> {
        self.index.occurrences_of(id)
    }

    pub fn status_of(&self, id: &BlockId) -> Vec<(NormalizedPath, SyncStatus)> {
        self.index.status_of(id, &self.registry)
    }

    pub fn is_diverged(&self, id: &BlockId) -> bool {
        self.index.is_diverged(id, &self.registry)
    }

    /// Registered blocks with at least one diverged copy, in id order.
    pub fn diverged_blocks(&self) -> Vec<BlockId> {
        self.registry
            .ids()
            .filter(|id| self.is_diverged(id))
            .cloned()
            .collect()
    }

    /// Blocks of an in-memory document with their state against the registry.
    pub fn document_blocks(&self, text: &str) -> Vec<DocumentBlock> {
        parse_all(text)
            .into_iter()
            .map(|block| {
                let state = match self.registry.get(&block.id) {
                    None => BlockState::Local,
                    Some(record) if record.matches(&block.content) => BlockState::Synced,
                    Some(_) => BlockState::Diverged,
                };
                DocumentBlock {
                    id: block.id,
                    name: block.name,
                    start_line: block.start_line,
                    end_line: block.end_line,
                    state,
                }
            })
            .collect()
    }

    /// Turn the byte range `[start, end)` of a document into a new block.
    ///
    /// The selection becomes the registry content, the document is rewritten
    /// with markers around it and the index is refreshed.
    ///
    /// # Errors
    ///
    /// Fails without touching the registry if the range or name is invalid or
    /// the document cannot be read or written.
    pub fn wrap_selection(
        &mut self,
        path: &NormalizedPath,
        start: usize,
        end: usize,
        name: &str,
        tags: Vec<String>,
    ) -> Result<BlockId> {
        let document = io::read_document(path)?;
        let id = self.registry.fresh_id();
        let wrapped = wrap(&document.text, start, end, &id, name)?;
        let content = normalize(&document.text[start..end]);

        io::write_document(path, &document.with_text(wrapped))?;
        self.track(path);
        let result = self
            .registry
            .create_with_id(id, name, &content, tags, Some(path.to_string()));
        self.rescan();
        result
    }

    /// Embed an existing registry block into a document at byte `position`
    /// (`None` appends).
    ///
    /// Returns `Ok(false)` if the registry does not know the id.
    pub fn insert_block(
        &mut self,
        path: &NormalizedPath,
        id: &BlockId,
        position: Option<usize>,
    ) -> Result<bool> {
        let Some(record) = self.registry.get(id) else {
            return Ok(false);
        };
        let document = io::read_document(path)?;
        let updated = insert(&document.text, position, id, &record.name, &record.content)?;

        io::write_document(path, &document.with_text(updated))?;
        self.track(path);
        self.rescan();
        Ok(true)
    }

    /// Diff the registry content of `id` (left) against its copy in `path`
    /// (right). `None` if either side is missing or the file cannot be read.
    ///
    /// # Errors
    ///
    /// Only diff failures (`TooLarge`) are errors.
    pub fn diff(
        &self,
        id: &BlockId,
        path: &NormalizedPath,
        limits: DiffLimits,
    ) -> Result<Option<Vec<DiffLine>>> {
        let Some(record) = self.registry.get(id) else {
            return Ok(None);
        };
        let document = match io::read_document(path) {
            Ok(document) => document,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "Diff could not read file");
                return Ok(None);
            }
        };
        let Some(content) = extract_content(&document.text, id) else {
            return Ok(None);
        };
        let script = diff_text_with(&record.content, &content, limits, || false)?;
        Ok(Some(script))
    }

    fn track(&mut self, path: &NormalizedPath) {
        if !self.paths.contains(path) {
            self.paths.push(path.clone());
        }
    }

    fn emit(&self, event: SyncEvent) {
        let _ = self.events.send(event);
    }
}

/// Rewrite one document. Returns false when it already matched.
fn push_to_file(path: &NormalizedPath, id: &BlockId, content: &str) -> Result<bool> {
    let document = io::read_document(path)?;
    let updated = replace_content(&document.text, id, content)?;
    if updated == document.text {
        return Ok(false);
    }
    io::write_document(path, &document.with_text(updated))?;
    Ok(true)
}
