//! Line-level unified diff for multi-line string values.
//!
//! Lines are compared with their terminators, so a missing trailing newline
//! or a CRLF/LF swap is a real difference. A line without a terminator is
//! followed by [`NO_NEWLINE`].

use crate::diff::lcs::{align, Op};

pub const CONTEXT_LINES: usize = 3;
pub const NO_NEWLINE: &str = "\\ No newline at end of file";

/// One rendered line of a hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkLine {
    Header(String),
    Context(String),
    Removed(String),
    Added(String),
    NoNewline,
}

impl HunkLine {
    /// Display form with its one-character prefix.
    pub fn render(&self) -> String {
        match self {
            HunkLine::Header(h) => h.clone(),
            HunkLine::Context(l) => format!(" {}", l),
            HunkLine::Removed(l) => format!("-{}", l),
            HunkLine::Added(l) => format!("+{}", l),
            HunkLine::NoNewline => NO_NEWLINE.to_string(),
        }
    }
}

/// Strip the `\n` terminator and show a trailing `\r` as `^M`.
pub fn visible(line: &str) -> String {
    let body = line.strip_suffix('\n').unwrap_or(line);
    match body.strip_suffix('\r') {
        Some(rest) => format!("{}^M", rest),
        None => body.to_string(),
    }
}

/// Unified hunks between `old` and `new` with `context` lines around each
/// change. Identical inputs yield no lines.
pub fn unified_hunks(old: &str, new: &str, context: usize) -> Vec<HunkLine> {
    let a: Vec<&str> = old.split_inclusive('\n').collect();
    let b: Vec<&str> = new.split_inclusive('\n').collect();
    let ops = align(&a, &b);

    // positions[k] = (old lines, new lines) consumed before ops[k]
    let mut positions = Vec::with_capacity(ops.len() + 1);
    let (mut i, mut j) = (0usize, 0usize);
    for op in &ops {
        positions.push((i, j));
        match op {
            Op::Equal(..) => {
                i += 1;
                j += 1;
            }
            Op::Delete(_) => i += 1,
            Op::Insert(_) => j += 1,
        }
    }
    positions.push((i, j));

    let changes: Vec<usize> = ops
        .iter()
        .enumerate()
        .filter(|(_, op)| !matches!(op, Op::Equal(..)))
        .map(|(k, _)| k)
        .collect();

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for &k in &changes {
        let start = k.saturating_sub(context);
        let end = (k + context + 1).min(ops.len());
        match ranges.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => ranges.push((start, end)),
        }
    }

    let mut out = Vec::new();
    for (start, end) in ranges {
        let (old_from, new_from) = positions[start];
        let (old_to, new_to) = positions[end];
        out.push(HunkLine::Header(format!(
            "@@ -{} +{} @@",
            range_label(old_from, old_to - old_from),
            range_label(new_from, new_to - new_from)
        )));
        for op in &ops[start..end] {
            let (line, hunk_line) = match *op {
                Op::Equal(x, _) => (a[x], HunkLine::Context(visible(a[x]))),
                Op::Delete(x) => (a[x], HunkLine::Removed(visible(a[x]))),
                Op::Insert(y) => (b[y], HunkLine::Added(visible(b[y]))),
            };
            out.push(hunk_line);
            if !line.ends_with('\n') {
                out.push(HunkLine::NoNewline);
            }
        }
    }
    out
}

fn range_label(from: usize, count: usize) -> String {
    match count {
        0 => format!("{},0", from),
        1 => format!("{}", from + 1),
        n => format!("{},{}", from + 1, n),
    }
}
