//! Ordered sequence diff based on the longest common subsequence.

use std::cmp::max;

/// Contiguous run of changed positions in a sequence.
///
/// `Remove` offsets are valid against the old sequence after all previously
/// reported removals were applied (runs come highest offset first). `Insert`
/// offsets refer to the new sequence (runs come in ascending order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Remove { offset: usize, len: usize },
    Insert { offset: usize, len: usize },
}

impl Change {
    pub fn positions(&self) -> std::ops::Range<usize> {
        match *self {
            Change::Remove { offset, len } | Change::Insert { offset, len } => offset..offset + len,
        }
    }
}

/// Changes turning `old` into `new`: all removals, then all insertions.
pub fn difference<T: PartialEq>(old: &[T], new: &[T]) -> Vec<Change> {
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let (old_kept, new_kept) = lcs_marks(
        &old[prefix..old.len() - suffix],
        &new[prefix..new.len() - suffix],
    );

    let mut changes: Vec<Change> = runs(&old_kept, prefix)
        .into_iter()
        .rev()
        .map(|(offset, len)| Change::Remove { offset, len })
        .collect();
    changes.extend(
        runs(&new_kept, prefix)
            .into_iter()
            .map(|(offset, len)| Change::Insert { offset, len }),
    );
    changes
}

/// Marks the elements of `old` and `new` that belong to one longest common subsequence.
fn lcs_marks<T: PartialEq>(old: &[T], new: &[T]) -> (Vec<bool>, Vec<bool>) {
    let (n, m) = (old.len(), new.len());
    let mut old_kept = vec![false; n];
    let mut new_kept = vec![false; m];
    if n == 0 || m == 0 {
        return (old_kept, new_kept);
    }

    // table[i][j]: LCS length of old[i..] and new[j..]
    let mut table = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if old[i] == new[j] {
                table[i + 1][j + 1] + 1
            } else {
                max(table[i + 1][j], table[i][j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            old_kept[i] = true;
            new_kept[j] = true;
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    (old_kept, new_kept)
}

/// `(offset, len)` of every maximal run of unmarked positions.
fn runs(kept: &[bool], base: usize) -> Vec<(usize, usize)> {
    let mut result = Vec::new();
    let mut start = None;
    for (i, &k) in kept.iter().enumerate() {
        match (k, start) {
            (false, None) => start = Some(i),
            (true, Some(s)) => {
                result.push((base + s, i - s));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        result.push((base + s, kept.len() - s));
    }
    result
}
