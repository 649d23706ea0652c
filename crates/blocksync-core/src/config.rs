//! Engine configuration
//!
//! Read from `.blocksync/config.toml` under the workspace root. Every field
//! has a default, so a missing file or a partial file both work.

use crate::Result;
use blocksync_diff::DiffLimits;
use blocksync_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};

/// Directory holding blocksync state inside a workspace.
pub const STATE_DIR: &str = ".blocksync";

/// Configuration file name inside [`STATE_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Registry file, relative to the workspace root.
    pub registry_path: String,
    /// Directories scanned for documents, relative to the workspace root.
    pub search_paths: Vec<String>,
    /// File extensions considered documents (without the dot).
    pub extensions: Vec<String>,
    /// Directory names skipped while scanning, compared case-insensitively.
    pub ignore_patterns: Vec<String>,
    /// Maximum directory depth below each search path.
    pub max_depth: usize,
    pub diff: DiffConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            registry_path: format!("{STATE_DIR}/blocks.db.json"),
            search_paths: vec![".".to_string()],
            extensions: ["md", "markdown", "txt", "json", "jsonl", "yaml", "yml"]
                .into_iter()
                .map(String::from)
                .collect(),
            ignore_patterns: [
                "node_modules",
                ".git",
                "dist",
                "build",
                "__pycache__",
                ".venv",
                "venv",
                "target",
                ".build",
                STATE_DIR,
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            max_depth: 20,
            diff: DiffConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub max_edit_distance: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_edit_distance: DiffLimits::DEFAULT_MAX_EDIT_DISTANCE,
        }
    }
}

impl DiffConfig {
    pub fn limits(&self) -> DiffLimits {
        DiffLimits::new(self.max_edit_distance)
    }
}

impl EngineConfig {
    /// Path of the configuration file for a workspace root.
    pub fn path_in(root: &NormalizedPath) -> NormalizedPath {
        root.join(STATE_DIR).join(CONFIG_FILE)
    }

    /// Load the workspace configuration, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        let config = ConfigStore::new().load_or_default(&Self::path_in(root))?;
        Ok(config)
    }

    /// Write this configuration into the workspace.
    pub fn save(&self, root: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(&Self::path_in(root), self)?;
        Ok(())
    }

    /// Absolute registry path for a workspace root.
    pub fn registry_path(&self, root: &NormalizedPath) -> NormalizedPath {
        resolve(root, &self.registry_path)
    }

    /// Absolute search roots for a workspace root.
    pub fn search_roots(&self, root: &NormalizedPath) -> Vec<NormalizedPath> {
        self.search_paths.iter().map(|p| resolve(root, p)).collect()
    }
}

fn resolve(root: &NormalizedPath, path: &str) -> NormalizedPath {
    if std::path::Path::new(path).is_absolute() {
        NormalizedPath::new(path)
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let root = NormalizedPath::new(temp.path());

        let config = EngineConfig::load(&root).unwrap();

        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_depth, 20);
        assert_eq!(config.diff.max_edit_distance, 4096);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let root = NormalizedPath::new(temp.path());
        std::fs::create_dir_all(temp.path().join(STATE_DIR)).unwrap();
        std::fs::write(
            temp.path().join(STATE_DIR).join(CONFIG_FILE),
            "search_paths = [\"docs\"]\n\n[diff]\nmax_edit_distance = 64\n",
        )
        .unwrap();

        let config = EngineConfig::load(&root).unwrap();

        assert_eq!(config.search_paths, vec!["docs"]);
        assert_eq!(config.diff.limits(), DiffLimits::new(64));
        assert_eq!(config.registry_path, ".blocksync/blocks.db.json");
    }

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let root = NormalizedPath::new(temp.path());
        let config = EngineConfig {
            max_depth: 3,
            ..EngineConfig::default()
        };

        config.save(&root).unwrap();

        assert_eq!(EngineConfig::load(&root).unwrap(), config);
    }

    #[test]
    fn relative_paths_resolve_against_root() {
        let root = NormalizedPath::new("/work");
        let config = EngineConfig::default();
        assert_eq!(
            config.registry_path(&root).as_str(),
            "/work/.blocksync/blocks.db.json"
        );
        assert_eq!(config.search_roots(&root), vec![NormalizedPath::new("/work")]);
    }
}
