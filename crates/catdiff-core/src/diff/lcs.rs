//! Longest-common-subsequence alignment shared by array diffing and
//! line-level rendering.

/// One step of an alignment between `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `a[i] == b[j]`
    Equal(usize, usize),
    /// `a[i]` has no counterpart in `b`
    Delete(usize),
    /// `b[j]` has no counterpart in `a`
    Insert(usize),
}

/// Upper bound on the DP table for the unmatched middle section. Beyond it
/// the middle is reported as a block replacement.
const MAX_TABLE_CELLS: usize = 16 * 1024 * 1024;

/// Align two sequences. Within a run of changes, deletions come before
/// insertions.
pub fn align<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Op> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let a_mid = &a[prefix..a.len() - suffix];
    let b_mid = &b[prefix..b.len() - suffix];

    let mut ops = Vec::with_capacity(a.len().max(b.len()));
    ops.extend((0..prefix).map(|i| Op::Equal(i, i)));
    align_middle(a_mid, b_mid, prefix, &mut ops);
    let a_tail = a.len() - suffix;
    let b_tail = b.len() - suffix;
    ops.extend((0..suffix).map(|k| Op::Equal(a_tail + k, b_tail + k)));
    ops
}

fn align_middle<T: PartialEq>(a: &[T], b: &[T], offset: usize, ops: &mut Vec<Op>) {
    let (n, m) = (a.len(), b.len());
    if n == 0 || m == 0 || (n + 1).saturating_mul(m + 1) > MAX_TABLE_CELLS {
        ops.extend((0..n).map(|i| Op::Delete(offset + i)));
        ops.extend((0..m).map(|j| Op::Insert(offset + j)));
        return;
    }

    // table[i][j] = LCS length of a[i..] and b[j..]
    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if a[i] == b[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            ops.push(Op::Equal(offset + i, offset + j));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            ops.push(Op::Delete(offset + i));
            i += 1;
        } else {
            ops.push(Op::Insert(offset + j));
            j += 1;
        }
    }
    ops.extend((i..n).map(|k| Op::Delete(offset + k)));
    ops.extend((j..m).map(|k| Op::Insert(offset + k)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edits(ops: &[Op]) -> Vec<Op> {
        ops.iter()
            .copied()
            .filter(|op| !matches!(op, Op::Equal(..)))
            .collect()
    }

    #[test]
    fn test_identical_sequences_are_all_equal() {
        let ops = align(&[1, 2, 3], &[1, 2, 3]);
        assert!(edits(&ops).is_empty());
        assert_eq!(ops.len(), 3);
    }

    #[test]
    fn test_two_insertions() {
        let ops = align(&[1, 3, 5], &[1, 2, 3, 4, 5]);
        assert_eq!(edits(&ops), vec![Op::Insert(1), Op::Insert(3)]);
    }

    #[test]
    fn test_substitution_is_delete_then_insert() {
        let ops = align(&["a", "b", "c"], &["a", "x", "c"]);
        assert_eq!(edits(&ops), vec![Op::Delete(1), Op::Insert(1)]);
    }

    #[test]
    fn test_empty_sides() {
        assert_eq!(align::<i32>(&[], &[7]), vec![Op::Insert(0)]);
        assert_eq!(align::<i32>(&[7], &[]), vec![Op::Delete(0)]);
        assert!(align::<i32>(&[], &[]).is_empty());
    }

    #[test]
    fn test_every_index_visited_once() {
        let a = [1, 2, 3, 4, 5, 6];
        let b = [6, 1, 3, 9, 5];
        let ops = align(&a, &b);
        let mut seen_a = vec![false; a.len()];
        let mut seen_b = vec![false; b.len()];
        for op in ops {
            match op {
                Op::Equal(i, j) => {
                    seen_a[i] = true;
                    seen_b[j] = true;
                }
                Op::Delete(i) => seen_a[i] = true,
                Op::Insert(j) => seen_b[j] = true,
            }
        }
        assert!(seen_a.iter().all(|s| *s));
        assert!(seen_b.iter().all(|s| *s));
    }
}
