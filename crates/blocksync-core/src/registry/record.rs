//! Block record type for the registry
//!
//! A record is the authoritative version of a block. Documents embed copies
//! of its content between markers carrying the record's id.

use blocksync_blocks::{BlockId, normalize};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A block in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    /// Unique identifier, also written into document markers
    pub id: BlockId,
    /// Display name shown in the open marker
    pub name: String,
    /// Canonical content with `\n` line breaks
    pub content: String,
    /// Document the block was first created from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Never moves backwards
    pub updated_at: DateTime<Utc>,
    /// Tags for filtering, without duplicates
    #[serde(default)]
    pub tags: Vec<String>,
}

impl BlockRecord {
    /// Create a record stamped with `now`.
    pub fn new(
        id: BlockId,
        name: impl Into<String>,
        content: &str,
        tags: Vec<String>,
        source_file: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut record = Self {
            id,
            name: name.into(),
            content: normalize(content),
            source_file,
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
        };
        for tag in tags {
            record.add_tag(&tag);
        }
        record
    }

    /// Add a tag. Returns false if it was already present or blank.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Remove a tag. Returns false if it was not present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag.trim());
        self.tags.len() != before
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// True when `content` equals this record's content after normalization.
    pub fn matches(&self, content: &str) -> bool {
        if content.contains('\r') || self.content.contains('\r') {
            normalize(content) == normalize(&self.content)
        } else {
            content == self.content
        }
    }

    /// Case-insensitive match over name, content and tags.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.content.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }

    /// Advance `updated_at` to `now`, never backwards.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(now);
    }
}
