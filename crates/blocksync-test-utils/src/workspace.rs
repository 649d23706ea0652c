//! [`TestWorkspace`] fixture for blocksync test scenarios.

use blocksync_fs::NormalizedPath;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Default registry location relative to the workspace root.
pub const REGISTRY_FILE: &str = ".blocksync/blocks.db.json";

/// Marker-wrapped block text with `\n` line breaks and a trailing newline.
pub fn block_text(id: &str, name: &str, content: &str) -> String {
    format!("<!-- block: {name} [id:{id}] -->\n{content}\n<!-- /block:{id} -->\n")
}

/// A temporary workspace directory with helpers for writing documents and
/// asserting on their contents.
///
/// # Example
///
/// ```rust,no_run
/// use blocksync_test_utils::{TestWorkspace, block_text};
///
/// let ws = TestWorkspace::new();
/// ws.write_doc("doc.md", &block_text("a1b2c3", "Greeting", "Hello world"));
/// ws.assert_file_contains("doc.md", "Hello world");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root as a [`NormalizedPath`].
    pub fn root_path(&self) -> NormalizedPath {
        NormalizedPath::new(self.root())
    }

    /// Absolute path of `rel`.
    pub fn path(&self, rel: &str) -> NormalizedPath {
        NormalizedPath::new(self.root().join(rel))
    }

    /// Path of the default registry file.
    pub fn registry_path(&self) -> NormalizedPath {
        self.path(REGISTRY_FILE)
    }

    /// Write a UTF-8 document, creating parent directories.
    pub fn write_doc(&self, rel: &str, content: &str) -> NormalizedPath {
        self.write_bytes(rel, content.as_bytes())
    }

    /// Write raw bytes, creating parent directories.
    pub fn write_bytes(&self, rel: &str, bytes: &[u8]) -> NormalizedPath {
        let full_path = self.root().join(rel);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, bytes).unwrap();
        NormalizedPath::new(full_path)
    }

    /// Read a document as UTF-8.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read_doc(&self, rel: &str) -> String {
        let full_path = self.root().join(rel);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Read raw bytes.
    pub fn read_bytes(&self, rel: &str) -> Vec<u8> {
        fs::read(self.root().join(rel)).unwrap()
    }

    /// Write `.blocksync/config.toml`.
    pub fn write_config(&self, toml: &str) {
        self.write_doc(".blocksync/config.toml", toml);
    }

    /// Assert that `rel` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, rel: &str) {
        let full_path = self.root().join(rel);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `rel` contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, rel: &str, content: &str) {
        let file_content = self.read_doc(rel);
        assert!(
            file_content.contains(content),
            "File {rel} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}
