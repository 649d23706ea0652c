//! Workspace detection
//!
//! Commands work from any directory inside a workspace: the root is the
//! nearest ancestor holding a `.blocksync` directory, like git finds `.git`.

use std::path::{Component, Path, PathBuf};

use blocksync_core::config::STATE_DIR;
use blocksync_core::{EngineConfig, Reconciler};
use blocksync_fs::NormalizedPath;

use crate::error::Result;

/// An opened workspace.
pub struct Workspace {
    pub root: NormalizedPath,
    pub config: EngineConfig,
    pub reconciler: Reconciler,
    cwd: PathBuf,
}

impl Workspace {
    /// Open the workspace for `root`, or detect it from `cwd`.
    pub fn open(root: Option<&Path>, cwd: &Path) -> Result<Self> {
        let root = match root {
            Some(root) => clean(&cwd.join(root)),
            None => detect_root(cwd),
        };
        tracing::debug!(root = %root.display(), "Opening workspace");

        let root = NormalizedPath::new(root);
        let config = EngineConfig::load(&root)?;
        let reconciler = Reconciler::open(&root, &config)?;
        Ok(Self {
            root,
            config,
            reconciler,
            cwd: cwd.to_path_buf(),
        })
    }

    /// Resolve a command-line file argument against the working directory.
    pub fn file(&self, path: &Path) -> NormalizedPath {
        NormalizedPath::new(clean(&self.cwd.join(path)))
    }

    /// Path for display, relative to the workspace root when inside it.
    pub fn display<'a>(&self, path: &'a NormalizedPath) -> &'a str {
        let root = self.root.as_str().trim_end_matches('/');
        path.as_str()
            .strip_prefix(root)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path.as_str())
    }
}

/// Nearest ancestor of `cwd` containing the state directory, else `cwd`.
pub fn detect_root(cwd: &Path) -> PathBuf {
    cwd.ancestors()
        .find(|dir| dir.join(STATE_DIR).is_dir())
        .unwrap_or(cwd)
        .to_path_buf()
}

/// Drop `.` components so paths compare equal to scanned ones.
fn clean(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
