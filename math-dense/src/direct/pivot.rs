//! Pivot selection
//!
//! Pure scans of the unfactored trailing block. Ties keep the first
//! candidate met, so an already-good diagonal entry is never swapped away.

use crate::dense::Matrix;

/// Row in `[k, n)` whose column-`k` entry has the largest magnitude
pub fn partial_pivot(a: &Matrix, k: usize) -> usize {
    let mut max_idx = k;
    let mut max_val = a[[k, k]].abs();
    for i in (k + 1)..a.nrows() {
        let val = a[[i, k]].abs();
        if val > max_val {
            max_val = val;
            max_idx = i;
        }
    }
    max_idx
}

/// Position of the largest-magnitude entry in the block `[k, n) x [k, n)`
pub fn complete_pivot(a: &Matrix, k: usize) -> (usize, usize) {
    let n = a.nrows();
    let mut max_pos = (k, k);
    let mut max_val = a[[k, k]].abs();
    for i in k..n {
        for j in k..n {
            let val = a[[i, j]].abs();
            if val > max_val {
                max_val = val;
                max_pos = (i, j);
            }
        }
    }
    max_pos
}

/// Index in `[k, n)` of the largest diagonal value (signed, not magnitude)
pub fn diagonal_pivot(a: &Matrix, k: usize) -> usize {
    let mut max_idx = k;
    let mut max_val = a[[k, k]];
    for i in (k + 1)..a.nrows() {
        if a[[i, i]] > max_val {
            max_val = a[[i, i]];
            max_idx = i;
        }
    }
    max_idx
}
