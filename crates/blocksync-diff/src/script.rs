//! Edit script types

/// What happened to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffKind {
    /// Present on both sides
    Context,
    /// Only on the left (old) side
    Removed,
    /// Only on the right (new) side
    Added,
}

impl DiffKind {
    /// Prefix used in unified output.
    pub fn marker(self) -> char {
        match self {
            Self::Context => ' ',
            Self::Removed => '-',
            Self::Added => '+',
        }
    }
}

/// One entry of an edit script.
///
/// Line numbers are 1-based. `left` is set for context and removed lines,
/// `right` for context and added lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: DiffKind,
    pub text: String,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl DiffLine {
    pub fn context(text: impl Into<String>, left: usize, right: usize) -> Self {
        Self {
            kind: DiffKind::Context,
            text: text.into(),
            left: Some(left),
            right: Some(right),
        }
    }

    pub fn removed(text: impl Into<String>, left: usize) -> Self {
        Self {
            kind: DiffKind::Removed,
            text: text.into(),
            left: Some(left),
            right: None,
        }
    }

    pub fn added(text: impl Into<String>, right: usize) -> Self {
        Self {
            kind: DiffKind::Added,
            text: text.into(),
            left: None,
            right: Some(right),
        }
    }

    pub fn is_change(&self) -> bool {
        self.kind != DiffKind::Context
    }
}

/// Line counts of an edit script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub context: usize,
}

impl DiffStats {
    pub fn of(lines: &[DiffLine]) -> Self {
        lines.iter().fold(Self::default(), |mut stats, line| {
            match line.kind {
                DiffKind::Context => stats.context += 1,
                DiffKind::Removed => stats.removed += 1,
                DiffKind::Added => stats.added += 1,
            }
            stats
        })
    }

    /// Total number of edits (the edit distance).
    pub fn edits(&self) -> usize {
        self.added + self.removed
    }

    pub fn is_identical(&self) -> bool {
        self.edits() == 0
    }
}
