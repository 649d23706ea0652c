//! CLI argument parsing using clap derive

use std::path::PathBuf;

use blocksync_blocks::BlockId;
use clap::{Parser, Subcommand};

/// blocksync - Keep shared text blocks in sync across documents
#[derive(Parser, Debug)]
#[command(name = "blocksync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace root (defaults to the nearest directory containing .blocksync)
    #[arg(long, global = true, env = "BLOCKSYNC_ROOT")]
    pub root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List registered blocks
    List {
        /// Only blocks carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Case-insensitive search over name, content and tags
        #[arg(long)]
        search: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show one block and where it is embedded
    Show {
        /// Block id (six hex digits)
        id: BlockId,
    },

    /// Register a new block
    ///
    /// Examples:
    ///   blocksync create Greeting --content "Hello"
    ///   blocksync create License --from LICENSE.txt -t legal
    Create {
        /// Display name
        name: String,

        /// Block content
        #[arg(long, conflicts_with = "from")]
        content: Option<String>,

        /// Read the content from a file
        #[arg(long)]
        from: Option<PathBuf>,

        /// Tags to attach
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Change a block's display name
    Rename {
        id: BlockId,
        name: String,
    },

    /// Add a tag to a block
    Tag {
        id: BlockId,
        tag: String,
    },

    /// Remove a tag from a block
    Untag {
        id: BlockId,
        tag: String,
    },

    /// Delete a block from the registry (documents are left alone)
    Remove {
        id: BlockId,
    },

    /// Show synced/diverged status of embedded copies
    Status {
        /// Only this block
        id: Option<BlockId>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Write registry content into every document embedding a block
    Push {
        /// Block to push; omit with --all to push every diverged block
        #[arg(required_unless_present = "all")]
        id: Option<BlockId>,

        /// Push every diverged block
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },

    /// Replace registry content with the copy found in a document
    Pull {
        id: BlockId,
        file: PathBuf,
    },

    /// Diff registry content against the copy in a document
    Diff {
        id: BlockId,
        file: PathBuf,

        /// Lines of context around changes
        #[arg(short = 'U', long, default_value_t = 3)]
        context: usize,
    },

    /// Turn a line range of a document into a new block
    ///
    /// Examples:
    ///   blocksync wrap README.md 10 14 "Install steps" -t docs
    Wrap {
        file: PathBuf,

        /// First line of the block (1-based)
        start: usize,

        /// Last line of the block (inclusive)
        end: usize,

        /// Display name
        name: String,

        /// Tags to attach
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Embed a registered block into a document
    Insert {
        id: BlockId,
        file: PathBuf,

        /// Insert before this line (1-based); appends when omitted
        #[arg(long)]
        line: Option<usize>,
    },
}
