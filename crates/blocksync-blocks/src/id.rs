//! Short block identifiers

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a block: exactly six lowercase hex characters (24 bits).
///
/// Ids appear verbatim in document markers, so they are kept short enough to
/// type and stable for the lifetime of the block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlockId(String);

impl BlockId {
    /// Number of hex characters in an id.
    pub const LEN: usize = 6;

    /// Parse and validate an id.
    ///
    /// # Errors
    /// Returns `Error::InvalidId` unless `value` is six lowercase hex digits.
    pub fn parse(value: &str) -> Result<Self> {
        if Self::is_valid(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(Error::InvalidId {
                value: value.to_string(),
            })
        }
    }

    /// True when `value` is a well-formed id.
    pub fn is_valid(value: &str) -> bool {
        value.len() == Self::LEN && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// A random id. May collide with existing ids; see [`BlockId::generate`].
    pub fn random() -> Self {
        // The first three bytes of a v4 UUID carry no version or variant bits.
        let bytes = Uuid::new_v4().into_bytes();
        Self(format!("{:02x}{:02x}{:02x}", bytes[0], bytes[1], bytes[2]))
    }

    /// A random id for which `is_taken` returns false.
    ///
    /// Retries until a free id is found. With 2^24 ids the expected number of
    /// retries stays negligible for any realistic registry size.
    pub fn generate(mut is_taken: impl FnMut(&BlockId) -> bool) -> Self {
        loop {
            let candidate = Self::random();
            if !is_taken(&candidate) {
                return candidate;
            }
            tracing::trace!(id = %candidate, "Block id collision, retrying");
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap text already matched by the marker grammar.
    pub(crate) fn from_marker(value: &str) -> Self {
        debug_assert!(Self::is_valid(value));
        Self(value.to_string())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BlockId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BlockId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        if Self::is_valid(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidId { value })
        }
    }
}

impl From<BlockId> for String {
    fn from(id: BlockId) -> Self {
        id.0
    }
}

impl AsRef<str> for BlockId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for BlockId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BlockId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
