//! Document discovery
//!
//! Walks the configured search roots and collects files whose extension marks
//! them as documents. Ignored directory names are skipped at any depth.

use crate::config::EngineConfig;
use blocksync_fs::NormalizedPath;
use std::fs;

/// Document formats blocks can be embedded in.
///
/// Markers are recognised the same way in every format; the kind only matters
/// to front ends choosing a highlighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Markdown,
    Json,
    Yaml,
    PlainText,
}

impl DocumentKind {
    /// Detect the kind from a file extension, case-insensitively.
    pub fn from_path(path: &NormalizedPath) -> Option<Self> {
        let extension = path.extension()?.to_ascii_lowercase();
        match extension.as_str() {
            "md" | "markdown" => Some(Self::Markdown),
            "json" | "jsonl" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Recursive document finder.
#[derive(Debug, Clone)]
pub struct Scanner {
    extensions: Vec<String>,
    ignore_patterns: Vec<String>,
    max_depth: usize,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl Scanner {
    pub fn new(extensions: Vec<String>, ignore_patterns: Vec<String>, max_depth: usize) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.trim_start_matches('.').to_ascii_lowercase()).collect(),
            ignore_patterns: ignore_patterns.iter().map(|p| p.to_lowercase()).collect(),
            max_depth,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.extensions.clone(),
            config.ignore_patterns.clone(),
            config.max_depth,
        )
    }

    /// All documents below `roots`, sorted and without duplicates.
    ///
    /// A root may also be a single file. Missing roots and unreadable
    /// directories are skipped.
    pub fn scan(&self, roots: &[NormalizedPath]) -> Vec<NormalizedPath> {
        self.scan_with(roots, || false).unwrap_or_default()
    }

    /// Like [`scan`](Self::scan), polling `should_abort` once per directory.
    ///
    /// Returns `None` if the walk was aborted.
    pub fn scan_with(
        &self,
        roots: &[NormalizedPath],
        mut should_abort: impl FnMut() -> bool,
    ) -> Option<Vec<NormalizedPath>> {
        let mut found = Vec::new();
        for root in roots {
            if root.is_file() {
                if self.is_document(root) {
                    found.push(root.clone());
                }
            } else if root.is_dir() {
                self.walk(root, 0, &mut found, &mut should_abort)?;
            } else {
                tracing::debug!(root = %root, "Search root does not exist");
            }
        }
        found.sort();
        found.dedup();
        tracing::debug!(documents = found.len(), "Scan complete");
        Some(found)
    }

    /// True if `path` has one of the configured extensions.
    pub fn is_document(&self, path: &NormalizedPath) -> bool {
        path.extension()
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    fn is_ignored(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.ignore_patterns.iter().any(|p| *p == name)
    }

    fn walk(
        &self,
        dir: &NormalizedPath,
        depth: usize,
        found: &mut Vec<NormalizedPath>,
        should_abort: &mut impl FnMut() -> bool,
    ) -> Option<()> {
        if should_abort() {
            tracing::debug!(dir = %dir, "Scan aborted");
            return None;
        }
        let entries = match fs::read_dir(dir.to_native()) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(dir = %dir, error = %e, "Skipping unreadable directory");
                return Some(());
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = dir.join(&name);
            // file_type does not follow symlinks, so linked directories are never entered.
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                if self.is_ignored(&name) {
                    tracing::trace!(dir = %path, "Ignored directory");
                } else if depth < self.max_depth {
                    self.walk(&path, depth + 1, found, should_abort)?;
                }
            } else if path.is_file() && self.is_document(&path) {
                found.push(path);
            }
        }
        Some(())
    }
}
