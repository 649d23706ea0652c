//! Greedy Myers line diff
//!
//! The forward search records, for every edit distance `d`, the furthest
//! reaching x on each diagonal `k` in `-d..=d`. Those vectors are stored back
//! to back in one flat arena: step `d` occupies `2d + 1` cells starting at
//! offset `d * d`, so the arena for a script of distance `D` holds exactly
//! `(D + 1)^2` cells. Backtracking walks the arena from the end point to
//! recover the edit script.
//!
//! Matching runs are always followed before any edit. When a deletion and an
//! insertion reach a diagonal at the same cost the path with the further x
//! wins, so each hunk lists its removed lines before its added lines.

use crate::{DiffLine, Error, Result};

/// Bounds on a single diff computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffLimits {
    /// Largest edit distance searched before giving up with `Error::TooLarge`.
    pub max_edit_distance: usize,
}

impl DiffLimits {
    pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 4096;

    pub fn new(max_edit_distance: usize) -> Self {
        Self { max_edit_distance }
    }

    pub fn unlimited() -> Self {
        Self {
            max_edit_distance: usize::MAX,
        }
    }
}

impl Default for DiffLimits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_EDIT_DISTANCE)
    }
}

/// Splits text into lines for diffing.
///
/// Every `\r` is dropped first, so lines compare equal whatever their
/// line-ending style. Only `\n` ends a line and a final line break does not
/// start an extra empty line, so empty text has zero lines.
pub fn split_lines(text: &str) -> Vec<String> {
    let stripped = text.replace('\r', "");
    let mut lines: Vec<String> = stripped.split('\n').map(str::to_owned).collect();
    if stripped.is_empty() || stripped.ends_with('\n') {
        lines.pop();
    }
    lines
}

/// Diffs two texts line by line with default limits.
pub fn diff_text(a: &str, b: &str) -> Result<Vec<DiffLine>> {
    diff_text_with(a, b, DiffLimits::default(), || false)
}

/// Diffs two texts line by line with explicit limits and an abort check.
pub fn diff_text_with(
    a: &str,
    b: &str,
    limits: DiffLimits,
    should_abort: impl FnMut() -> bool,
) -> Result<Vec<DiffLine>> {
    diff_lines_with(&split_lines(a), &split_lines(b), limits, should_abort)
}

/// Diffs two line sequences with default limits.
///
/// # Example
/// ```
/// use blocksync_diff::{DiffKind, diff_lines};
///
/// let script = diff_lines(&["a", "b", "c"], &["a", "x", "c"]).unwrap();
/// let kinds: Vec<_> = script.iter().map(|l| (l.kind, l.text.as_str())).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         (DiffKind::Context, "a"),
///         (DiffKind::Removed, "b"),
///         (DiffKind::Added, "x"),
///         (DiffKind::Context, "c"),
///     ]
/// );
/// ```
pub fn diff_lines<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> Result<Vec<DiffLine>> {
    diff_lines_with(a, b, DiffLimits::default(), || false)
}

/// Diffs two line sequences.
///
/// `should_abort` is polled once per edit distance step.
///
/// # Errors
/// - `Error::TooLarge` if the edit distance exceeds `limits.max_edit_distance`
/// - `Error::Cancelled` if `should_abort` returned true
pub fn diff_lines_with<A: AsRef<str>, B: AsRef<str>>(
    a: &[A],
    b: &[B],
    limits: DiffLimits,
    mut should_abort: impl FnMut() -> bool,
) -> Result<Vec<DiffLine>> {
    let a: Vec<&str> = a.iter().map(AsRef::as_ref).collect();
    let b: Vec<&str> = b.iter().map(AsRef::as_ref).collect();

    if a.is_empty() && b.is_empty() {
        return Ok(Vec::new());
    }
    if a.len() >= u32::MAX as usize || b.len() >= u32::MAX as usize {
        return Err(Error::TooLarge {
            limit: limits.max_edit_distance,
        });
    }

    let trace = search(&a, &b, limits, &mut should_abort)?;
    tracing::trace!(
        left = a.len(),
        right = b.len(),
        distance = trace.distance,
        cells = trace.cells.len(),
        "Diff computed"
    );
    Ok(backtrack(&a, &b, &trace))
}

/// The recorded forward search.
struct Trace {
    /// Furthest x per diagonal for each step, laid out step after step.
    cells: Vec<u32>,
    /// Edit distance of the final path.
    distance: usize,
}

impl Trace {
    /// Furthest x reached on diagonal `k` at step `d`.
    fn x(&self, d: usize, k: isize) -> usize {
        self.cells[slot(d, k)] as usize
    }
}

/// Arena index of diagonal `k` in step `d`.
fn slot(d: usize, k: isize) -> usize {
    d * d + (k + d as isize) as usize
}

/// True when the path into diagonal `k` at step `d` comes down from `k + 1`
/// (an insertion) rather than across from `k - 1` (a deletion).
fn comes_from_above(trace: &[u32], d: usize, k: isize) -> bool {
    let d_signed = d as isize;
    k == -d_signed
        || (k != d_signed && trace[slot(d - 1, k - 1)] < trace[slot(d - 1, k + 1)])
}

fn search(
    a: &[&str],
    b: &[&str],
    limits: DiffLimits,
    should_abort: &mut impl FnMut() -> bool,
) -> Result<Trace> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max_d = (a.len() + b.len()).min(limits.max_edit_distance);
    let mut cells: Vec<u32> = Vec::new();

    for d in 0..=max_d {
        if should_abort() {
            return Err(Error::Cancelled);
        }

        let d_signed = d as isize;
        let base = cells.len();
        cells.resize(base + 2 * d + 1, 0);

        for k in (-d_signed..=d_signed).step_by(2) {
            let mut x = if d == 0 {
                0
            } else if comes_from_above(&cells, d, k) {
                cells[slot(d - 1, k + 1)] as isize
            } else {
                cells[slot(d - 1, k - 1)] as isize + 1
            };
            let mut y = x - k;

            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            cells[slot(d, k)] = x as u32;

            if x >= n && y >= m {
                return Ok(Trace { cells, distance: d });
            }
        }
    }

    Err(Error::TooLarge {
        limit: limits.max_edit_distance,
    })
}

fn backtrack(a: &[&str], b: &[&str], trace: &Trace) -> Vec<DiffLine> {
    let mut script = Vec::with_capacity(a.len().max(b.len()) + trace.distance);
    let mut x = a.len();
    let mut y = b.len();

    for d in (1..=trace.distance).rev() {
        let k = x as isize - y as isize;
        let from_above = comes_from_above(&trace.cells, d, k);
        let prev_k = if from_above { k + 1 } else { k - 1 };
        let prev_x = trace.x(d - 1, prev_k);
        let prev_y = (prev_x as isize - prev_k) as usize;

        // Where the edit lands, before the snake that follows it.
        let (mid_x, mid_y) = if from_above {
            (prev_x, prev_y + 1)
        } else {
            (prev_x + 1, prev_y)
        };
        while x > mid_x && y > mid_y {
            x -= 1;
            y -= 1;
            script.push(DiffLine::context(a[x], x + 1, y + 1));
        }

        if from_above {
            script.push(DiffLine::added(b[prev_y], prev_y + 1));
        } else {
            script.push(DiffLine::removed(a[prev_x], prev_x + 1));
        }
        x = prev_x;
        y = prev_y;
    }

    while x > 0 && y > 0 {
        x -= 1;
        y -= 1;
        script.push(DiffLine::context(a[x], x + 1, y + 1));
    }

    script.reverse();
    script
}
